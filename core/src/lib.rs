// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Projects a lunar anniversary onto the solar calendar and publishes a reminder event for
//! every year of it.

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
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod config;
mod credential;
mod error;
mod lunar;
mod orchestrator;
mod publisher;
mod recurrence;
mod reminder;

pub use lunarcal_gcal::CalendarId;

pub use crate::config::{
    APP_NAME, AnniversaryConfig, Config, GoogleConfig, RunConfig, get_config_dir,
};
pub use crate::credential::{Credential, CredentialProvider, InstalledAppAuth};
pub use crate::error::{AuthError, ConversionError, PublishError};
pub use crate::lunar::{LunarDate, LunarSolarConverter, LunisolarTable};
pub use crate::orchestrator::{Orchestrator, Outcome, Phase, PreviewItem, RunPlan, RunSummary};
pub use crate::publisher::{EventPublisher, GcalPublisher, PublishedEvent};
pub use crate::recurrence::{
    Anniversary, Candidate, Candidates, RecurrenceMode, generate, plan,
};
pub use crate::reminder::{
    Channel, EventTemplate, MAX_REMINDER_MINUTES, ReminderEvent, ReminderOffset,
    default_reminders,
};
