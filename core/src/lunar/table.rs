// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::Span;
use jiff::civil::{Date, date};

use crate::error::ConversionError;
use crate::lunar::{LunarDate, LunarSolarConverter};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Solar date of lunar 1900-01-01.
const EPOCH: Date = date(1900, 1, 31);

/// One word per lunar year from 1900 to 2100.
///
/// - bits 0..4: number of the leap month, 0 if none
/// - bits 4..16: month 12 down to month 1, set if the month has 30 days
/// - bit 16: set if the leap month has 30 days
#[rustfmt::skip]
const YEAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054e5, 0x0d2a0, 0x0e950, 0x16554, 0x056a0, 0x0aad0, 0x055d2, // 1900
    0x04ae0, 0x0a5d6, 0x0a4d0, 0x0d250, 0x0da95, 0x0b550, 0x056a0, 0x0ada2, 0x095d0, 0x04bb7, // 1910
    0x049b0, 0x0a4b0, 0x0b4b5, 0x06a90, 0x0ad40, 0x0bb54, 0x02b60, 0x095b0, 0x05372, 0x04970, // 1920
    0x06566, 0x0e4a0, 0x0ea50, 0x16a95, 0x05b50, 0x02b60, 0x18ae3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b690, 0x056d0, 0x125b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0d557, // 1940
    0x0b4a0, 0x0b550, 0x15555, 0x04db0, 0x025b0, 0x18573, 0x052b0, 0x0a9b8, 0x06950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05270, 0x07263, 0x0d950, 0x06b57, 0x056a0, // 1960
    0x09ad0, 0x04dd5, 0x04ae0, 0x0a4e0, 0x0d4d4, 0x0d250, 0x0d598, 0x0b540, 0x0d6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a9b4, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0b756, 0x02b60, 0x095b0, // 1980
    0x04b75, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06d98, 0x05ad0, 0x02b60, 0x096e5, 0x092e0, // 1990
    0x0c960, 0x0e954, 0x0d4a0, 0x0da50, 0x07552, 0x056c0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x1b4a3, 0x0b550, 0x055d9, 0x04ba0, 0x0a5b0, 0x05575, 0x052b0, 0x0a950, // 2010
    0x0b954, 0x06aa0, 0x0ad50, 0x06b52, 0x04b60, 0x0a6e6, 0x0a570, 0x05270, 0x06a65, 0x0d930, // 2020
    0x05aa0, 0x0b6a3, 0x096d0, 0x04afb, 0x04ae0, 0x0a4d0, 0x1d0d6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b6a0, 0x096d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0b250, 0x1b255, 0x06d40, 0x0ada0, // 2040
    0x18b63, 0x09570, 0x14978, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1aac4, 0x0ab60, // 2050
    0x09370, 0x052e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0aad0, 0x095d4, // 2060
    0x092d0, 0x0c9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b2b3, 0x0a930, 0x07557, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054f4, 0x05260, // 2080
    0x0e968, 0x0d530, 0x05aa0, 0x1aaa6, 0x096d0, 0x04ae0, 0x0aad4, 0x0a4d0, 0x0d260, 0x0f253, // 2090
    0x0d520, // 2100
];

/// Table-driven lunisolar calendar for lunar years 1900 to 2100.
///
/// Month lengths and leap months follow the Korean calendar as published by KASI: new moons
/// and principal solar terms are dated in Korean standard time (UTC+9, with the UTC+8:30
/// periods of 1908 to 1911 and 1954 to 1961, and Seoul mean time before 1908).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LunisolarTable;

impl LunisolarTable {
    /// First supported lunar year.
    pub const MIN_YEAR: i32 = MIN_YEAR;

    /// Last supported lunar year.
    pub const MAX_YEAR: i32 = MAX_YEAR;

    /// Creates the table.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the leap month of `year`, if it has one and the year is supported.
    #[must_use]
    pub fn leap_month(self, year: i32) -> Option<u8> {
        let month = u8::try_from(year_info(year)? & 0xf).ok()?;
        (month != 0).then_some(month)
    }

    /// Returns the length of a month, or `None` if it does not exist.
    #[must_use]
    pub fn days_in_month(self, year: i32, month: u8, leap_month: bool) -> Option<u8> {
        let info = year_info(year)?;
        if !(1..=12).contains(&month) {
            return None;
        }

        if leap_month {
            if self.leap_month(year) != Some(month) {
                return None;
            }
            Some(if info & 0x10000 == 0 { 29 } else { 30 })
        } else {
            Some(if info & (0x10000 >> month) == 0 { 29 } else { 30 })
        }
    }

    /// Returns the length of a lunar year, including its leap month.
    #[must_use]
    pub fn days_in_year(self, year: i32) -> Option<u16> {
        let regular: u16 = (1..=12)
            .filter_map(|m| self.days_in_month(year, m, false))
            .map(u16::from)
            .sum();
        let leap = self
            .leap_month(year)
            .and_then(|m| self.days_in_month(year, m, true))
            .map_or(0, u16::from);
        year_info(year).map(|_| regular + leap)
    }

    fn check(self, date: LunarDate) -> Result<u8, ConversionError> {
        if year_info(date.year).is_none() {
            return Err(ConversionError::YearOutOfRange {
                year: date.year,
                min: MIN_YEAR,
                max: MAX_YEAR,
            });
        }
        if !(1..=12).contains(&date.month) {
            return Err(ConversionError::InvalidMonth { month: date.month });
        }

        let days_in_month = self
            .days_in_month(date.year, date.month, date.leap_month)
            .ok_or(ConversionError::NoLeapMonth {
                year: date.year,
                month: date.month,
            })?;
        if date.day == 0 || date.day > days_in_month {
            return Err(ConversionError::DayOutOfRange {
                year: date.year,
                month: date.month,
                leap_month: date.leap_month,
                day: date.day,
                days_in_month,
            });
        }
        Ok(days_in_month)
    }

    /// Days between lunar 1900-01-01 and `date`, which must have passed [`Self::check`].
    fn offset(self, date: LunarDate) -> i64 {
        let mut days: i64 = (MIN_YEAR..date.year)
            .filter_map(|y| self.days_in_year(y))
            .map(i64::from)
            .sum();

        let leap = self.leap_month(date.year);
        for month in 1..date.month {
            days += self.days_in_month(date.year, month, false).map_or(0, i64::from);
            if leap == Some(month) {
                days += self.days_in_month(date.year, month, true).map_or(0, i64::from);
            }
        }

        // The leap month follows the regular month of the same number.
        if date.leap_month {
            days += self.days_in_month(date.year, date.month, false).map_or(0, i64::from);
        }

        days + i64::from(date.day) - 1
    }
}

impl LunarSolarConverter for LunisolarTable {
    fn to_solar(&self, date: LunarDate) -> Result<Date, ConversionError> {
        self.check(date)?;
        let span = Span::new()
            .try_days(self.offset(date))
            .map_err(|e| ConversionError::Other(e.to_string()))?;
        EPOCH
            .checked_add(span)
            .map_err(|e| ConversionError::Other(e.to_string()))
    }
}

fn year_info(year: i32) -> Option<u32> {
    let index = usize::try_from(year.checked_sub(MIN_YEAR)?).ok()?;
    YEAR_INFO.get(index).copied()
}
