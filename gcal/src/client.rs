// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Google Calendar client for event operations.

use std::sync::Arc;

use reqwest::{Method, Url};

use crate::config::GcalConfig;
use crate::error::GcalError;
use crate::http::HttpClient;
use crate::types::{AccessToken, CalendarId, CreatedEvent, EventResource};

/// Client for the Google Calendar v3 REST API.
///
/// # Example
///
/// ```ignore
/// use lunarcal_gcal::{AccessToken, CalendarId, GcalClient, GcalConfig};
///
/// # use lunarcal_gcal::EventResource;
/// # async fn example(event: EventResource) -> Result<(), Box<dyn std::error::Error>> {
/// let token = AccessToken::new("ya29...".to_string());
/// let client = GcalClient::new(GcalConfig::default(), token)?;
/// let created = client.insert_event(&CalendarId::default(), &event).await?;
/// println!("{}", created.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GcalClient {
    http: Arc<HttpClient>,
    base_url: Url,
}

impl GcalClient {
    /// Creates a new client authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: GcalConfig, token: AccessToken) -> Result<Self, GcalError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GcalError::Config(format!("Invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(GcalError::Config(format!(
                "Base URL must be a hierarchical http(s) URL: {base_url}"
            )));
        }

        let http = HttpClient::new(&config, token)?;
        Ok(Self {
            http: Arc::new(http),
            base_url,
        })
    }

    /// Creates an event on the given calendar.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::Auth`] if the credential is rejected, or another error if the
    /// request fails or the response cannot be decoded.
    pub async fn insert_event(
        &self,
        calendar_id: &CalendarId,
        event: &EventResource,
    ) -> Result<CreatedEvent, GcalError> {
        let url = self.events_url(calendar_id);
        tracing::debug!(
            %url,
            summary = %event.summary,
            date = %event.start.date,
            "inserting event"
        );

        let resp = self
            .http
            .execute(self.http.build_request(Method::POST, url).json(event))
            .await?;

        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| GcalError::InvalidResponse(format!("Failed to decode created event: {e}")))
    }

    /// `{base}/calendars/{calendarId}/events`, with the id percent-encoded as one segment.
    fn events_url(&self, calendar_id: &CalendarId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["calendars", calendar_id.as_str(), "events"]);
        }
        url
    }
}
