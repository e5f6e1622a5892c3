// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use lunarcal_core::{
    CalendarId, Config, GcalPublisher, InstalledAppAuth, LunisolarTable, Orchestrator, Outcome,
    RunSummary,
};

use crate::util::{RunArgs, current_year};

#[derive(Debug, Clone, Default)]
pub struct CmdPublish {
    pub run_args: RunArgs,
    pub calendar: Option<String>,
}

impl CmdPublish {
    pub const NAME: &str = "publish";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Create the reminder events on Google Calendar (default)")
            .args(RunArgs::args())
            .arg(arg!(--calendar <ID> "Target calendar, overrides google.calendar_id"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            run_args: RunArgs::from(matches),
            calendar: matches.get_one("calendar").cloned(),
        }
    }

    pub async fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "publishing events...");
        let config = self.resolve(config);

        let (Some(credentials_path), Some(token_path)) = (
            config.google.credentials_path.clone(),
            config.google.token_path.clone(),
        ) else {
            return Err("credential paths are not configured".into());
        };
        let auth = InstalledAppAuth::new(credentials_path, token_path);

        let api = config.google.api.clone();
        let orchestrator = Orchestrator::new(LunisolarTable::new(), config.plan(current_year()));
        let summary = orchestrator
            .run(&auth, |c| GcalPublisher::connect(api, c), print_outcome)
            .await?;

        println!("{}", format_summary(&summary));
        Ok(())
    }

    fn resolve(&self, config: &Config) -> Config {
        let mut config = config.clone();
        self.run_args.apply(&mut config.run);
        if let Some(calendar) = &self.calendar {
            config.google.calendar_id = CalendarId::from(calendar.as_str());
        }
        config
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Created { .. } => println!("{outcome}"),
        Outcome::ConversionFailed { .. } => println!("{}", outcome.to_string().yellow()),
        Outcome::PublishFailed { .. } => println!("{}", outcome.to_string().red()),
    }
}

fn format_summary(summary: &RunSummary) -> String {
    let mut line = format!("{} events created", summary.created());
    let failures = [
        (summary.conversion_failures(), "not convertible"),
        (summary.publish_failures(), "not published"),
    ];
    for (n, what) in failures {
        if n > 0 {
            line.push_str(&format!(", {n} {what}"));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_flag_overrides_config() {
        let cmd = CmdPublish {
            calendar: Some("family@group.calendar.google.com".to_string()),
            ..CmdPublish::default()
        };

        let config = cmd.resolve(&Config::default());

        assert_eq!(
            config.google.calendar_id.as_str(),
            "family@group.calendar.google.com"
        );
    }

    #[test]
    fn config_calendar_is_kept_without_flag() {
        let config = CmdPublish::default().resolve(&Config::default());
        assert_eq!(config.google.calendar_id, CalendarId::default());
    }

    #[test]
    fn summary_mentions_failures_only_when_present() {
        assert_eq!(format_summary(&RunSummary::default()), "0 events created");
    }
}
