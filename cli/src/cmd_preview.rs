// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use lunarcal_core::{Config, LunisolarTable, Orchestrator, PreviewItem};

use crate::preview_formatter::PreviewFormatter;
use crate::util::{ArgOutputFormat, RunArgs, current_year};

#[derive(Debug, Clone, Copy)]
pub struct CmdPreview {
    pub run_args: RunArgs,
    pub output_format: ArgOutputFormat,
}

impl CmdPreview {
    pub const NAME: &str = "preview";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("List the events that would be created, without contacting Google")
            .args(RunArgs::args())
            .arg(ArgOutputFormat::arg())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            run_args: RunArgs::from(matches),
            output_format: ArgOutputFormat::from(matches),
        }
    }

    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "previewing events...");
        let items = self.items(config, current_year());
        let formatter = PreviewFormatter::new().with_output_format(self.output_format);
        print!("{}", formatter.format(&items));
        Ok(())
    }

    fn items(self, config: &Config, current_year: i32) -> Vec<PreviewItem> {
        let mut config = config.clone();
        self.run_args.apply(&mut config.run);

        let orchestrator = Orchestrator::new(LunisolarTable::new(), config.plan(current_year));
        orchestrator.preview().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use lunarcal_core::ConversionError;

    fn parse(args: &[&str]) -> CmdPreview {
        let matches = Command::new("test")
            .subcommand(CmdPreview::command())
            .try_get_matches_from(args)
            .unwrap();
        CmdPreview::from(matches.subcommand_matches(CmdPreview::NAME).unwrap())
    }

    #[test]
    fn default_config_covers_2024_to_2109() {
        let items = parse(&["test", "preview"]).items(&Config::default(), 2024);

        assert_eq!(items.len(), 86);
        assert_eq!(items[0].index, 64);
        assert_eq!(items[0].lunar.year, 2024);
        let first = items[0].event.as_ref().unwrap();
        assert_eq!(first.date, date(2024, 2, 10));

        let created = items.iter().filter(|item| item.event.is_ok()).count();
        assert_eq!(created, 77);
        assert!(matches!(
            items.last().unwrap().event,
            Err(ConversionError::YearOutOfRange { year: 2109, .. })
        ));
    }

    #[test]
    fn arguments_override_the_run_section() {
        let cmd = parse(&["test", "preview", "--from-year", "2030", "--count", "3"]);

        let items = cmd.items(&Config::default(), 2024);

        let years: Vec<_> = items.iter().map(|item| item.lunar.year).collect();
        assert!(years.is_empty(), "scan window of 3 years from 1960 ends before 2030");

        let cmd = parse(&[
            "test",
            "preview",
            "--from-year",
            "2030",
            "--count",
            "3",
            "--mode",
            "future-count",
        ]);
        let items = cmd.items(&Config::default(), 2024);
        let years: Vec<_> = items.iter().map(|item| item.lunar.year).collect();
        assert_eq!(years, [2030, 2031, 2032]);
    }
}
