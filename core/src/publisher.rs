// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use lunarcal_gcal::{
    CalendarId, CreatedEvent, EventResource, GcalClient, GcalConfig, ReminderMethod,
    ReminderOverride,
};
use serde::Serialize;

use crate::credential::Credential;
use crate::error::{AuthError, PublishError};
use crate::reminder::{Channel, ReminderEvent};

/// An event created on the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedEvent {
    /// Remote event identifier.
    pub id: String,
    /// Link to the event, if the service returned one.
    pub html_link: Option<String>,
}

impl From<CreatedEvent> for PublishedEvent {
    fn from(event: CreatedEvent) -> Self {
        Self {
            id: event.id,
            html_link: event.html_link,
        }
    }
}

/// Creates reminder events on a remote calendar.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Creates `event` on `calendar_id`. Never retried.
    async fn publish(
        &self,
        calendar_id: &CalendarId,
        event: &ReminderEvent,
    ) -> Result<PublishedEvent, PublishError>;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for &T {
    async fn publish(
        &self,
        calendar_id: &CalendarId,
        event: &ReminderEvent,
    ) -> Result<PublishedEvent, PublishError> {
        (**self).publish(calendar_id, event).await
    }
}

/// [`EventPublisher`] backed by the Google Calendar API.
#[derive(Debug, Clone)]
pub struct GcalPublisher {
    client: GcalClient,
}

impl GcalPublisher {
    /// Publishes through an authenticated client.
    #[must_use]
    pub const fn new(client: GcalClient) -> Self {
        Self { client }
    }

    /// Builds a client for `config` authenticated with `credential`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built, e.g. the base URL is invalid.
    pub fn connect(config: GcalConfig, credential: Credential) -> Result<Self, AuthError> {
        let client = GcalClient::new(config, credential.into_access_token())
            .map_err(|e| AuthError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl EventPublisher for GcalPublisher {
    async fn publish(
        &self,
        calendar_id: &CalendarId,
        event: &ReminderEvent,
    ) -> Result<PublishedEvent, PublishError> {
        let resource = to_resource(event)?;
        let created = self.client.insert_event(calendar_id, &resource).await?;
        Ok(created.into())
    }
}

fn to_resource(event: &ReminderEvent) -> Result<EventResource, PublishError> {
    let overrides = event
        .reminders
        .iter()
        .map(|r| ReminderOverride {
            method: match r.channel {
                Channel::Popup => ReminderMethod::Popup,
                Channel::Email => ReminderMethod::Email,
            },
            minutes: r.minutes_before,
        })
        .collect();

    Ok(EventResource::all_day(
        event.title.clone(),
        Some(event.description.clone()),
        event.date,
        event.time_zone.clone(),
        overrides,
    )?)
}
