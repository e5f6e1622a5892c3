// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lunarcal_gcal::{CalendarId, GcalConfig};

use crate::lunar::LunisolarTable;
use crate::orchestrator::RunPlan;
use crate::recurrence::{Anniversary, RecurrenceMode};
use crate::reminder::{EventTemplate, MAX_REMINDER_MINUTES};

/// The name of the application.
pub const APP_NAME: &str = "lunarcal";

/// Configuration of a run.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// The lunar anniversary.
    pub anniversary: AnniversaryConfig,

    /// Title, description and reminders of the events.
    pub event: EventTemplate,

    /// Google Calendar access.
    pub google: GoogleConfig,

    /// Recurrence and pacing.
    pub run: RunConfig,
}

/// The `[anniversary]` section.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct AnniversaryConfig {
    /// Lunar month, 1 to 12.
    pub month: u8,
    /// Lunar day, 1 to 30.
    pub day: u8,
    /// Whether the anniversary falls in a leap month.
    pub leap_month: bool,
    /// Lunar year of the first occurrence.
    pub start_year: i32,
}

impl Default for AnniversaryConfig {
    fn default() -> Self {
        Self {
            month: 1,
            day: 1,
            leap_month: false,
            start_year: 1960,
        }
    }
}

impl From<AnniversaryConfig> for Anniversary {
    fn from(config: AnniversaryConfig) -> Self {
        Self {
            month: config.month,
            day: config.day,
            leap_month: config.leap_month,
            start_year: config.start_year,
        }
    }
}

/// The `[google]` section.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct GoogleConfig {
    /// API endpoint, timeout and user agent.
    #[serde(flatten)]
    pub api: GcalConfig,

    /// Calendar that receives the events.
    #[serde(default)]
    pub calendar_id: CalendarId,

    /// OAuth client secrets downloaded from the Google Cloud console.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Where access and refresh tokens are cached.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

/// The `[run]` section.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of candidate years.
    pub count: u32,

    /// How the candidate years are chosen.
    pub mode: RecurrenceMode,

    /// Pause after every remote call, in milliseconds.
    pub pacing_ms: u64,

    /// First lunar year to publish. Defaults to the current year.
    pub from_year: Option<i32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: 150,
            mode: RecurrenceMode::default(),
            pacing_ms: 100,
            from_year: None,
        }
    }
}

impl Config {
    /// Normalize the configuration.
    ///
    /// Expands `~`, `$HOME` and `$XDG_CONFIG_HOME` in paths, fills in the default
    /// credential locations and validates the values.
    ///
    /// # Errors
    ///
    /// Returns an error if a path cannot be expanded or a value is out of range.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        // Normalize client secrets path
        self.google.credentials_path = Some(match &self.google.credentials_path {
            Some(a) => expand_path(a)
                .map_err(|e| format!("Failed to expand credentials path: {e}"))?,
            None => get_config_dir()?.join(APP_NAME).join("credentials.json"),
        });

        // Normalize token cache path
        self.google.token_path = Some(match &self.google.token_path {
            Some(a) => expand_path(a).map_err(|e| format!("Failed to expand token path: {e}"))?,
            None => get_state_dir()?.join(APP_NAME).join("token.json"),
        });

        self.validate()
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        let a = &self.anniversary;
        if !(1..=12).contains(&a.month) {
            return Err(format!("anniversary.month must be in 1..=12, got {}", a.month).into());
        }
        if !(1..=30).contains(&a.day) {
            return Err(format!("anniversary.day must be in 1..=30, got {}", a.day).into());
        }
        if a.leap_month {
            let range = LunisolarTable::MIN_YEAR..=LunisolarTable::MAX_YEAR;
            let table = LunisolarTable::new();
            if range.contains(&a.start_year) && table.leap_month(a.start_year) != Some(a.month) {
                tracing::warn!(
                    year = a.start_year,
                    month = a.month,
                    "the start year has no such leap month"
                );
            }
        }

        if let Some(r) = self
            .event
            .reminders
            .iter()
            .find(|r| r.minutes_before > MAX_REMINDER_MINUTES)
        {
            return Err(format!(
                "reminder of {} minutes exceeds the maximum of {MAX_REMINDER_MINUTES}",
                r.minutes_before
            )
            .into());
        }
        if self.event.reminders.len() > 5 {
            return Err("at most 5 reminders are allowed per event".into());
        }
        Ok(())
    }

    /// Builds the plan of a run starting at `current_year`, unless `run.from_year` is set.
    #[must_use]
    pub fn plan(&self, current_year: i32) -> RunPlan {
        RunPlan {
            anniversary: self.anniversary.into(),
            count: self.run.count,
            lower_bound: self.run.from_year.unwrap_or(current_year),
            mode: self.run.mode,
            calendar_id: self.google.calendar_id.clone(),
            template: self.event.clone(),
            pacing: Duration::from_millis(self.run.pacing_ms),
        }
    }
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or_else(|| "User-specific home directory not found".into())
}

/// Returns the user-specific configuration directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir.ok_or_else(|| "User-specific state directory not found".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::{Channel, ReminderOffset, default_reminders};

    #[test]
    fn defaults_describe_new_year_birthday() {
        let config = Config::default();
        let plan = config.plan(2024);

        assert_eq!(plan.anniversary, Anniversary::new(1, 1, 1960));
        assert_eq!(plan.count, 150);
        assert_eq!(plan.lower_bound, 2024);
        assert_eq!(plan.mode, RecurrenceMode::ScanWindow);
        assert_eq!(plan.calendar_id.as_str(), "primary");
        assert_eq!(plan.template.time_zone.as_deref(), Some("Asia/Seoul"));
        assert_eq!(plan.template.reminders, default_reminders());
        assert_eq!(plan.pacing, Duration::from_millis(100));
    }

    #[test]
    fn parse_full_config() {
        let config: Config = toml::from_str(
            r#"
[anniversary]
month = 8
day = 15
start_year = 1990

[event]
title = "Mom's birthday"
description = "{index}th birthday"
time_zone = "America/New_York"
reminders = [{ channel = "email", minutes_before = 2880 }]

[google]
calendar_id = "family@group.calendar.google.com"
credentials_path = "/etc/lunarcal/credentials.json"
timeout_secs = 10

[run]
count = 20
mode = "future-count"
pacing_ms = 0
from_year = 2030
"#,
        )
        .unwrap();

        assert_eq!(config.anniversary.month, 8);
        assert!(!config.anniversary.leap_month);
        assert_eq!(config.event.title, "Mom's birthday");
        assert_eq!(
            config.event.reminders,
            [ReminderOffset::days_before(Channel::Email, 2)]
        );
        assert_eq!(
            config.google.calendar_id.as_str(),
            "family@group.calendar.google.com"
        );
        assert_eq!(config.google.api.timeout_secs, 10);
        assert_eq!(
            config.google.api.base_url,
            "https://www.googleapis.com/calendar/v3"
        );

        let plan = config.plan(2024);
        assert_eq!(plan.lower_bound, 2030);
        assert_eq!(plan.mode, RecurrenceMode::FutureCount);
        assert!(plan.pacing.is_zero());
    }

    #[test]
    fn partial_event_section_keeps_defaults() {
        let config: Config = toml::from_str("[event]\ntitle = \"Birthday\"\n").unwrap();
        assert_eq!(config.event.title, "Birthday");
        assert_eq!(config.event.reminders, default_reminders());
        assert_eq!(config.event.time_zone.as_deref(), Some("Asia/Seoul"));
    }

    #[test]
    fn normalize_fills_credential_paths() {
        let mut config = Config::default();
        config.normalize().unwrap();

        let credentials = config.google.credentials_path.unwrap();
        assert!(credentials.ends_with("lunarcal/credentials.json"));
        let token = config.google.token_path.unwrap();
        assert!(token.ends_with("lunarcal/token.json"));
    }

    #[test]
    fn normalize_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.anniversary.month = 13;
        assert!(config.normalize().is_err());

        let mut config = Config::default();
        config.anniversary.day = 31;
        assert!(config.normalize().is_err());

        let mut config = Config::default();
        config.event.reminders = vec![ReminderOffset::days_before(Channel::Popup, 29)];
        assert!(config.normalize().is_err());
    }

    #[test]
    fn test_expand_path_home_env() {
        let home = get_home_dir().unwrap();
        let home_prefixes: &[&str] = if cfg!(unix) {
            &["~", "$HOME", "${HOME}"]
        } else {
            &[r"~", r"%UserProfile%"]
        };
        for prefix in home_prefixes {
            let result = expand_path(&PathBuf::from(format!("{prefix}/token.json"))).unwrap();
            assert_eq!(result, home.join("token.json"));
            assert!(result.is_absolute());
        }
    }

    #[test]
    fn test_expand_path_config() {
        let config_dir = get_config_dir().unwrap();
        let config_prefixes: &[&str] = if cfg!(unix) {
            &["$XDG_CONFIG_HOME", "${XDG_CONFIG_HOME}"]
        } else {
            &[r"%LOCALAPPDATA%"]
        };
        for prefix in config_prefixes {
            let result =
                expand_path(&PathBuf::from(format!("{prefix}/lunarcal/credentials.json"))).unwrap();
            assert_eq!(result, config_dir.join("lunarcal/credentials.json"));
        }
    }

    #[test]
    fn test_expand_path_absolute_and_relative() {
        let absolute = PathBuf::from("/etc/lunarcal/credentials.json");
        assert_eq!(expand_path(&absolute).unwrap(), absolute);

        let relative = PathBuf::from("secrets/credentials.json");
        assert_eq!(expand_path(&relative).unwrap(), relative);
    }
}
