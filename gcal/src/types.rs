// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::GcalError;

/// Calendar identifier, e.g. `primary` or `xxx@group.calendar.google.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarId(String);

impl CalendarId {
    /// The authenticated user's primary calendar.
    pub const PRIMARY: &str = "primary";

    /// Creates a new `CalendarId` from a string.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CalendarId {
    fn default() -> Self {
        Self(Self::PRIMARY.to_string())
    }
}

impl Deref for CalendarId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CalendarId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CalendarId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// OAuth access token sent as a bearer credential.
///
/// `Debug` is manually implemented to redact the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new `AccessToken` from a string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Body of an `events.insert` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    /// Title of the event.
    pub summary: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inclusive start.
    pub start: EventDate,
    /// Exclusive end.
    pub end: EventDate,
    /// Reminder settings.
    pub reminders: Reminders,
}

impl EventResource {
    /// Builds an all-day event on `date`.
    ///
    /// The end date is the following day, since all-day end dates are exclusive in the API.
    ///
    /// # Errors
    ///
    /// Returns an error if `date` is the last representable day.
    pub fn all_day(
        summary: String,
        description: Option<String>,
        date: Date,
        time_zone: Option<String>,
        overrides: Vec<ReminderOverride>,
    ) -> Result<Self, GcalError> {
        let end = date
            .tomorrow()
            .map_err(|e| GcalError::Config(format!("No day after {date}: {e}")))?;

        Ok(Self {
            summary,
            description,
            start: EventDate {
                date,
                time_zone: time_zone.clone(),
            },
            end: EventDate {
                date: end,
                time_zone,
            },
            reminders: Reminders {
                use_default: false,
                overrides,
            },
        })
    }
}

/// All-day date of an event boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDate {
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub date: Date,
    /// IANA time zone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Reminder settings of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    /// Whether the calendar's default reminders apply.
    pub use_default: bool,
    /// Event-specific reminders, used when `use_default` is false.
    #[serde(default)]
    pub overrides: Vec<ReminderOverride>,
}

/// A single reminder override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    /// Delivery method.
    pub method: ReminderMethod,
    /// Minutes before the start of the event.
    pub minutes: u32,
}

/// How a reminder is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    /// UI popup.
    Popup,
    /// E-mail.
    Email,
}

/// The part of an inserted event resource we care about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    /// Opaque event identifier.
    pub id: String,
    /// Link to the event in the Google Calendar web UI.
    #[serde(default)]
    pub html_link: Option<String>,
    /// Event status, usually `confirmed`.
    #[serde(default)]
    pub status: Option<String>,
}
