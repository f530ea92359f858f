// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client for the blogging prompt settings endpoints.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::config::PromptsConfig;
use crate::error::PromptsError;
use crate::http::HttpClient;
use crate::types::{PromptSettings, SiteId};

/// Client for reading and updating the blogging prompt settings of a site.
///
/// # Example
///
/// ```ignore
/// use cadence_prompts::{AuthMethod, PromptsClient, PromptsConfig, SiteId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PromptsConfig {
///     base_url: "https://public-api.wordpress.com".to_string(),
///     auth: AuthMethod::Bearer {
///         token: "token".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = PromptsClient::new(config)?;
/// let settings = client.fetch_settings(&SiteId::from("12345")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PromptsClient {
    http: Arc<HttpClient>,
    config: PromptsConfig,
}

impl PromptsClient {
    /// Creates a new prompt settings client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or HTTP client initialization fails.
    pub fn new(config: PromptsConfig) -> Result<Self, PromptsError> {
        if config.base_url.trim().is_empty() {
            return Err(PromptsError::Config("base_url must not be empty".to_string()));
        }

        let http = HttpClient::new(config.clone())?;
        Ok(Self {
            http: Arc::new(http),
            config,
        })
    }

    /// Fetches the prompt settings of a site.
    ///
    /// # Errors
    ///
    /// Returns an error if the site has no settings or the response is malformed.
    pub async fn fetch_settings(&self, site: &SiteId) -> Result<PromptSettings, PromptsError> {
        let url = self.settings_url(site);
        tracing::debug!(%site, "fetching prompt settings");

        let resp = self
            .http
            .execute(self.http.build_request(Method::GET, &url))
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(PromptsError::NotFound(site.clone()));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Updates the prompt settings of a site.
    ///
    /// Returns the settings as stored by the server, or `None` when the server accepted the
    /// request without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn update_settings(
        &self,
        site: &SiteId,
        settings: &PromptSettings,
    ) -> Result<Option<PromptSettings>, PromptsError> {
        let url = self.settings_url(site);
        tracing::debug!(%site, enabled = settings.enabled, "updating prompt settings");

        let body = serde_json::to_string(settings)?;
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(Method::POST, &url)
                    .header("Content-Type", "application/json")
                    .body(body),
            )
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(PromptsError::NotFound(site.clone()));
        }

        let text = resp.text().await?;
        let resp: UpdateSettingsResponse = serde_json::from_str(&text)
            .map_err(|e| PromptsError::InvalidResponse(format!("{e}: {text}")))?;

        match resp.updated {
            Updated::Settings(settings) => Ok(Some(settings)),
            Updated::Flag(_) => Ok(None),
        }
    }

    fn settings_url(&self, site: &SiteId) -> String {
        format!(
            "{}/wpcom/v2/sites/{}/blogging-prompts/settings",
            self.config.base_url.trim_end_matches('/'),
            site
        )
    }
}

#[derive(Debug, Deserialize)]
struct UpdateSettingsResponse {
    updated: Updated,
}

/// The server answers `"updated": false` when nothing changed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Updated {
    Settings(PromptSettings),
    Flag(bool),
}
