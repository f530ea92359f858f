// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and status handling.

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::config::{AuthMethod, PromptsConfig};
use crate::error::PromptsError;

/// HTTP client for prompt settings operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: PromptsConfig,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: PromptsConfig) -> Result<Self, PromptsError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        let mut req = self.client.request(method, url);

        match &self.config.auth {
            AuthMethod::Basic { username, password } => {
                req = req.basic_auth(username, Some(password));
            }
            AuthMethod::Bearer { token } => {
                req = req.bearer_auth(token);
            }
            AuthMethod::None => {}
        }

        req
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// `404` is left to the caller, which knows which site it asked for.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns an error status code.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, PromptsError> {
        let resp = req.send().await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NOT_FOUND => Ok(resp),
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Err(PromptsError::Auth(status.to_string()))
            }
            status => {
                let text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read response".to_string());
                Err(PromptsError::Http(format!("{status}: {text}")))
            }
        }
    }
}
