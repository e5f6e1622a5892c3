// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use lunarcal_gcal::GcalError;

/// A lunar date that cannot be projected onto the solar calendar.
///
/// Recoverable: the affected year is reported and the run continues.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The year is not covered by the calendar data.
    #[error("lunar year {year} is outside the supported range {min}..={max}")]
    YearOutOfRange {
        /// Requested year.
        year: i32,
        /// First supported year.
        min: i32,
        /// Last supported year.
        max: i32,
    },

    /// Month number outside `1..=12`.
    #[error("lunar month {month} is not in 1..=12")]
    InvalidMonth {
        /// Requested month.
        month: u8,
    },

    /// The leap flag is set but the year has no such leap month.
    #[error("lunar year {year} has no leap month {month}")]
    NoLeapMonth {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u8,
    },

    /// The month is shorter than the requested day.
    #[error(
        "lunar month {year}-{month:02}{} has {days_in_month} days, no day {day}",
        if *.leap_month { " (leap)" } else { "" }
    )]
    DayOutOfRange {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u8,
        /// Whether the leap month was requested.
        leap_month: bool,
        /// Requested day.
        day: u8,
        /// Length of that month.
        days_in_month: u8,
    },

    /// Any other failure reported by a converter.
    #[error("{0}")]
    Other(String),
}

/// Failure to create one event remotely.
///
/// Recoverable: the affected year is reported and the run continues.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// The credential was rejected for this call (HTTP 401/403).
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// Any other remote or transport failure.
    #[error("remote failure: {0}")]
    Remote(String),
}

impl From<GcalError> for PublishError {
    fn from(e: GcalError) -> Self {
        if e.is_auth() {
            Self::Unauthorized(e.to_string())
        } else {
            Self::Remote(e.to_string())
        }
    }
}

/// No usable credential. Fatal: nothing is published.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential could not be loaded, refreshed or granted.
    #[error("cannot obtain credentials: {0}")]
    Credential(String),

    /// The authenticated client could not be built.
    #[error("cannot connect to the calendar service: {0}")]
    Client(String),
}

impl From<GcalError> for AuthError {
    fn from(e: GcalError) -> Self {
        Self::Credential(e.to_string())
    }
}
