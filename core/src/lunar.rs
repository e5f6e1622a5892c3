// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lunar dates and their projection onto the solar calendar.

mod table;

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

pub use crate::lunar::table::LunisolarTable;

/// A date in the lunisolar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LunarDate {
    /// Lunar year, numbered like the Gregorian year in which it starts.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u8,
    /// Day of the month, 1 to 30.
    pub day: u8,
    /// Whether the date falls in the intercalary month that follows `month`.
    #[serde(default)]
    pub leap_month: bool,
}

impl LunarDate {
    /// Creates a date in a regular (non-leap) month.
    #[must_use]
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            leap_month: false,
        }
    }

    /// Returns the same month and day in another year.
    #[must_use]
    pub const fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.leap_month {
            f.write_str(" (leap month)")?;
        }
        Ok(())
    }
}

/// Converts lunar dates to solar (Gregorian) dates.
///
/// Implementations must be deterministic: the same input always yields the same output.
pub trait LunarSolarConverter {
    /// Returns the solar date of `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if `date` is not representable, e.g. its year is out of range or
    /// the leap flag is set for a year without that leap month.
    fn to_solar(&self, date: LunarDate) -> Result<Date, ConversionError>;
}

impl<T: LunarSolarConverter + ?Sized> LunarSolarConverter for &T {
    fn to_solar(&self, date: LunarDate) -> Result<Date, ConversionError> {
        (**self).to_solar(date)
    }
}
