// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Yearly recurrence of a lunar anniversary.
//!
//! Generation and filtering are separate steps: [`generate`] walks a window of candidate
//! lunar years, and [`Candidates::from_year`] drops the years before a lower bound. Dates
//! are converted lazily, so dropped years never reach the converter.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::lunar::{LunarDate, LunarSolarConverter};

/// A lunar month and day observed every year since `start_year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    /// Lunar month, 1 to 12.
    pub month: u8,
    /// Lunar day, 1 to 30.
    pub day: u8,
    /// Whether the anniversary falls in a leap month.
    #[serde(default)]
    pub leap_month: bool,
    /// Lunar year of the first occurrence.
    pub start_year: i32,
}

impl Anniversary {
    /// Creates an anniversary in a regular month.
    #[must_use]
    pub const fn new(month: u8, day: u8, start_year: i32) -> Self {
        Self {
            month,
            day,
            leap_month: false,
            start_year,
        }
    }

    /// The original lunar date, in `start_year`.
    #[must_use]
    pub const fn origin(&self) -> LunarDate {
        self.on(self.start_year)
    }

    /// The anniversary in the given lunar year.
    #[must_use]
    pub const fn on(&self, year: i32) -> LunarDate {
        LunarDate {
            year,
            month: self.month,
            day: self.day,
            leap_month: self.leap_month,
        }
    }

    fn year_at(&self, index: u32) -> i32 {
        self.start_year.saturating_add_unsigned(index)
    }
}

/// One candidate year of an anniversary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Offset of the year from the anniversary's start year.
    pub index: u32,
    /// The anniversary in this lunar year.
    pub lunar: LunarDate,
    /// The solar date, or why it could not be computed.
    pub solar: Result<Date, ConversionError>,
}

impl Candidate {
    /// Lunar year of this candidate.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.lunar.year
    }
}

/// How the window of candidate years is chosen.
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceMode {
    /// Scan `count` years from the start year and drop those before the lower bound.
    ///
    /// The number of events shrinks as the start year recedes into the past.
    #[default]
    ScanWindow,

    /// Always attempt `count` years, starting at the later of the start year and the lower
    /// bound.
    FutureCount,
}

/// Lazy, restartable sequence of candidates in strictly increasing year order.
#[derive(Debug, Clone)]
pub struct Candidates<C> {
    anniversary: Anniversary,
    converter: C,
    next: u32,
    end: u32,
}

impl<C: LunarSolarConverter> Candidates<C> {
    fn window(anniversary: Anniversary, first: u32, count: u32, converter: C) -> Self {
        Self {
            anniversary,
            converter,
            next: first,
            end: first.saturating_add(count),
        }
    }

    /// Drops the candidates whose lunar year is before `lower_bound`.
    ///
    /// Nothing is converted for the dropped years.
    #[must_use]
    pub fn from_year(mut self, lower_bound: i32) -> Self {
        let skip = index_of(&self.anniversary, lower_bound);
        self.next = self.next.max(skip.min(self.end));
        self
    }

    fn candidate(&self, index: u32) -> Candidate {
        let lunar = self.anniversary.on(self.anniversary.year_at(index));
        Candidate {
            index,
            lunar,
            solar: self.converter.to_solar(lunar),
        }
    }
}

impl<C: LunarSolarConverter> Iterator for Candidates<C> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let candidate = self.candidate(self.next);
        self.next += 1;
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (len, Some(len))
    }
}

impl<C: LunarSolarConverter> ExactSizeIterator for Candidates<C> {}

impl<C: LunarSolarConverter> std::iter::FusedIterator for Candidates<C> {}

/// Generates one candidate per lunar year in `start_year .. start_year + count`.
pub fn generate<C: LunarSolarConverter>(
    anniversary: Anniversary,
    count: u32,
    converter: C,
) -> Candidates<C> {
    Candidates::window(anniversary, 0, count, converter)
}

/// Chooses the candidate years according to `mode`, never before `lower_bound`.
///
/// With [`RecurrenceMode::ScanWindow`] this is `generate(..).from_year(lower_bound)`, which
/// yields `count - max(0, lower_bound - start_year)` items, or none once that is negative.
pub fn plan<C: LunarSolarConverter>(
    anniversary: Anniversary,
    count: u32,
    lower_bound: i32,
    mode: RecurrenceMode,
    converter: C,
) -> Candidates<C> {
    match mode {
        RecurrenceMode::ScanWindow => {
            generate(anniversary, count, converter).from_year(lower_bound)
        }
        RecurrenceMode::FutureCount => {
            let first = index_of(&anniversary, lower_bound);
            Candidates::window(anniversary, first, count, converter)
        }
    }
}

/// Index of `year` relative to the start year, clamped at zero.
fn index_of(anniversary: &Anniversary, year: i32) -> u32 {
    let offset = i64::from(year) - i64::from(anniversary.start_year);
    u32::try_from(offset.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use jiff::civil::date;

    use super::*;

    /// Maps lunar year `y` to solar `y-01-01` and records every call.
    #[derive(Default)]
    struct Recording {
        calls: RefCell<Vec<i32>>,
    }

    impl LunarSolarConverter for Recording {
        fn to_solar(&self, lunar: LunarDate) -> Result<Date, ConversionError> {
            self.calls.borrow_mut().push(lunar.year);
            let year =
                i16::try_from(lunar.year).map_err(|e| ConversionError::Other(e.to_string()))?;
            Ok(date(year, 1, 1))
        }
    }

    fn years<C: LunarSolarConverter>(candidates: Candidates<C>) -> Vec<i32> {
        candidates.map(|c| c.year()).collect()
    }

    #[test]
    fn generate_walks_the_window() {
        let converter = Recording::default();
        let items: Vec<_> = generate(Anniversary::new(1, 1, 1960), 3, &converter).collect();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items.iter().map(|c| (c.index, c.year())).collect::<Vec<_>>(),
            [(0, 1960), (1, 1961), (2, 1962)]
        );
        assert_eq!(items[2].solar, Ok(date(1962, 1, 1)));
        assert_eq!(*converter.calls.borrow(), [1960, 1961, 1962]);
    }

    #[test]
    fn from_year_skips_without_converting() {
        let converter = Recording::default();
        let candidates = generate(Anniversary::new(1, 1, 1960), 150, &converter).from_year(2024);

        assert_eq!(candidates.len(), 86);
        let items: Vec<_> = candidates.collect();
        assert_eq!(items.first().map(|c| (c.index, c.year())), Some((64, 2024)));
        assert_eq!(items.last().map(Candidate::year), Some(2109));
        assert_eq!(converter.calls.borrow().first(), Some(&2024));
        assert_eq!(converter.calls.borrow().len(), 86);
    }

    #[test]
    fn from_year_before_start_keeps_everything() {
        let candidates = generate(Anniversary::new(5, 5, 2030), 4, Recording::default());
        assert_eq!(years(candidates.from_year(2024)), [2030, 2031, 2032, 2033]);
    }

    #[test]
    fn from_year_past_the_window_is_empty() {
        let candidates = generate(Anniversary::new(1, 1, 1960), 10, Recording::default());
        assert_eq!(years(candidates.from_year(2024)), Vec::<i32>::new());
    }

    #[test]
    fn from_year_never_moves_backwards() {
        let candidates = generate(Anniversary::new(1, 1, 2000), 10, Recording::default())
            .from_year(2005)
            .from_year(2001);
        assert_eq!(years(candidates), [2005, 2006, 2007, 2008, 2009]);
    }

    #[test]
    fn zero_count_is_empty() {
        let candidates = generate(Anniversary::new(1, 1, 2000), 0, Recording::default());
        assert_eq!(candidates.len(), 0);
    }

    #[test]
    fn candidates_are_restartable() {
        let converter = Recording::default();
        let candidates = generate(Anniversary::new(1, 1, 2000), 5, &converter);
        let first = years(candidates.clone());
        let second = years(candidates);
        assert_eq!(first, second);
    }

    #[test]
    fn leap_flag_is_carried_to_every_year() {
        let anniversary = Anniversary {
            leap_month: true,
            ..Anniversary::new(6, 1, 2017)
        };
        assert!(generate(anniversary, 4, Recording::default()).all(|c| c.lunar.leap_month));
    }

    #[test]
    fn plan_scan_window_matches_generate_then_filter() {
        let anniversary = Anniversary::new(1, 1, 1960);
        let mode = RecurrenceMode::ScanWindow;
        let planned = plan(anniversary, 150, 2024, mode, Recording::default());
        let filtered = generate(anniversary, 150, Recording::default()).from_year(2024);
        assert_eq!(years(planned), years(filtered));
    }

    #[test]
    fn plan_future_count_always_yields_count() {
        let anniversary = Anniversary::new(1, 1, 1960);
        let mode = RecurrenceMode::FutureCount;
        let items: Vec<_> = plan(anniversary, 150, 2024, mode, Recording::default()).collect();

        assert_eq!(items.len(), 150);
        assert_eq!(items.first().map(|c| (c.index, c.year())), Some((64, 2024)));
        assert_eq!(items.last().map(|c| (c.index, c.year())), Some((213, 2173)));
    }

    #[test]
    fn plan_future_count_with_future_start() {
        let anniversary = Anniversary::new(1, 1, 2030);
        let planned = plan(anniversary, 3, 2024, RecurrenceMode::FutureCount, Recording::default());
        assert_eq!(years(planned), [2030, 2031, 2032]);
    }

    #[test]
    fn mode_names() {
        #[derive(Deserialize)]
        struct Run {
            mode: RecurrenceMode,
        }

        let run: Run = toml::from_str(r#"mode = "future-count""#).unwrap();
        assert_eq!(run.mode, RecurrenceMode::FutureCount);
        assert_eq!(RecurrenceMode::default(), RecurrenceMode::ScanWindow);
    }
}
