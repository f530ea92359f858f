// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::types::SiteId;

/// Prompt settings client errors.
#[non_exhaustive]
#[derive(Debug)]
pub enum PromptsError {
    /// HTTP layer error.
    Http(String),

    /// JSON encoding/decoding error.
    Json(String),

    /// Authentication error.
    Auth(String),

    /// The site has no prompt settings, or doesn't exist.
    NotFound(SiteId),

    /// Invalid response from server.
    InvalidResponse(String),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for PromptsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Auth(e) => write!(f, "Authentication failed: {e}"),
            Self::NotFound(site) => write!(f, "Prompt settings not found for site: {site}"),
            Self::InvalidResponse(e) => write!(f, "Invalid server response: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for PromptsError {}

impl From<reqwest::Error> for PromptsError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<serde_json::Error> for PromptsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
