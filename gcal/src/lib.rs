// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Google Calendar v3 client for creating events, with installed-app OAuth credentials.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::similar_names, clippy::single_match_else)]

mod auth;
mod client;
mod config;
mod error;
mod http;
mod types;

pub use crate::auth::{
    AuthorizedUser, CALENDAR_SCOPE, ClientSecrets, InstalledAppFlow, OAuthClient, TokenCache,
    TokenResponse, wait_for_redirect,
};
pub use crate::client::GcalClient;
pub use crate::config::GcalConfig;
pub use crate::error::GcalError;
pub use crate::types::{
    AccessToken, CalendarId, CreatedEvent, EventDate, EventResource, ReminderMethod,
    ReminderOverride, Reminders,
};
