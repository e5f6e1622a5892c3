// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with bearer authentication and error mapping.

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::config::GcalConfig;
use crate::error::GcalError;
use crate::types::AccessToken;

/// HTTP client for Calendar API operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    token: AccessToken,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: &GcalConfig, token: AccessToken) -> Result<Self, GcalError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, token })
    }

    /// Builds a request with the bearer token attached.
    pub fn build_request(&self, method: reqwest::Method, url: reqwest::Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.as_str())
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::Auth`] for 401/403 and [`GcalError::Api`] for any other
    /// non-success status.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, GcalError> {
        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());
        let message = error_message(&text);
        tracing::debug!(%status, message, "request rejected");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(GcalError::Auth(format!("{status}: {message}")))
            }
            status => Err(GcalError::Api { status, message }),
        }
    }
}

/// Extracts `error.message` from a Google API error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|a| a.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
