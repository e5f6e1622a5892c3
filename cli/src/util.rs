// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgMatches, arg, value_parser};
use lunarcal_core::{RecurrenceMode, RunConfig};

/// The output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ArgOutputFormat {
    Json,
    Table,
}

impl ArgOutputFormat {
    pub fn arg() -> Arg {
        arg!(--"output-format" <FORMAT> "Output format")
            .value_parser(value_parser!(ArgOutputFormat))
            .default_value("table")
    }

    pub fn from(matches: &ArgMatches) -> Self {
        matches
            .get_one("output-format")
            .copied()
            .unwrap_or(ArgOutputFormat::Table)
    }
}

/// Overrides of the `[run]` section shared by `publish` and `preview`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub from_year: Option<i32>,
    pub count: Option<u32>,
    pub mode: Option<RecurrenceMode>,
}

impl RunArgs {
    pub fn args() -> [Arg; 3] {
        [
            arg!(--"from-year" <YEAR> "First lunar year to publish, defaults to the current year")
                .value_parser(value_parser!(i32)),
            arg!(--count <COUNT> "Number of candidate years")
                .value_parser(value_parser!(u32).range(1..)),
            arg!(--mode <MODE> "How the candidate years are chosen")
                .value_parser(value_parser!(RecurrenceMode)),
        ]
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            from_year: matches.get_one("from-year").copied(),
            count: matches.get_one("count").copied(),
            mode: matches.get_one("mode").copied(),
        }
    }

    pub fn apply(self, run: &mut RunConfig) {
        if let Some(from_year) = self.from_year {
            run.from_year = Some(from_year);
        }
        if let Some(count) = self.count {
            run.count = count;
        }
        if let Some(mode) = self.mode {
            run.mode = mode;
        }
    }
}

/// The current year in the system time zone.
pub fn current_year() -> i32 {
    i32::from(jiff::Zoned::now().year())
}
