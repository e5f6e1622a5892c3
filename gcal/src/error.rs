// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Google Calendar client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GcalError {
    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication or authorization failure (HTTP 401/403, OAuth errors).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API answered with a non-success status.
    #[error("Google Calendar API error ({status}): {message}")]
    Api {
        /// Response status code.
        status: StatusCode,
        /// Message extracted from the error body.
        message: String,
    },

    /// JSON encoding/decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O error, e.g. while reading the token cache.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid response from server.
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GcalError {
    /// Returns `true` if the error means the credential was rejected.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<reqwest::Error> for GcalError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}
