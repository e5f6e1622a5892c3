// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::lunar::LunarDate;

/// Longest reminder lead time the calendar service accepts, four weeks.
pub const MAX_REMINDER_MINUTES: u32 = 4 * 7 * 24 * 60;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// How a reminder reaches the user.
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Notification in the calendar UI.
    #[default]
    Popup,
    /// E-mail to the calendar owner.
    Email,
}

/// A reminder some time before an all-day event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOffset {
    /// Delivery channel.
    #[serde(default, alias = "method")]
    pub channel: Channel,
    /// Lead time in minutes.
    #[serde(alias = "minutes")]
    pub minutes_before: u32,
}

impl ReminderOffset {
    /// A reminder `days` days ahead.
    #[must_use]
    pub const fn days_before(channel: Channel, days: u32) -> Self {
        Self {
            channel,
            minutes_before: days * MINUTES_PER_DAY,
        }
    }
}

/// One week and one day ahead, as popups.
#[must_use]
pub fn default_reminders() -> Vec<ReminderOffset> {
    vec![
        ReminderOffset::days_before(Channel::Popup, 7),
        ReminderOffset::days_before(Channel::Popup, 1),
    ]
}

/// An all-day reminder event, ready to be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderEvent {
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Solar date of the event.
    pub date: Date,
    /// IANA time zone of the event, if any.
    pub time_zone: Option<String>,
    /// Reminders, in the configured order.
    pub reminders: Vec<ReminderOffset>,
}

/// Title, description and reminders shared by every occurrence.
///
/// The title and description may contain placeholders:
///
/// - `{index}`: years since the first occurrence
/// - `{year}`: lunar year of this occurrence
/// - `{start_year}`, `{month}`, `{day}`: the original lunar date
/// - `{leap}`: `윤` if the original date is in a leap month, empty otherwise
/// - `{date}`: solar date of this occurrence, `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTemplate {
    /// Title template.
    pub title: String,
    /// Description template.
    pub description: String,
    /// IANA time zone of the events.
    pub time_zone: Option<String>,
    /// Reminders attached to every event.
    pub reminders: Vec<ReminderOffset>,
}

impl Default for EventTemplate {
    fn default() -> Self {
        Self {
            title: "아빠 생신".to_string(),
            description: "{index}번 째 생신(음력 {start_year}년 {leap}{month}월 {day}일)"
                .to_string(),
            time_zone: Some("Asia/Seoul".to_string()),
            reminders: default_reminders(),
        }
    }
}

impl EventTemplate {
    /// Builds the event of one occurrence.
    #[must_use]
    pub fn render(
        &self,
        index: u32,
        origin: LunarDate,
        lunar: LunarDate,
        date: Date,
    ) -> ReminderEvent {
        let leap = if origin.leap_month { "윤" } else { "" };
        let fill = |template: &str| {
            template
                .replace("{index}", &index.to_string())
                .replace("{year}", &lunar.year.to_string())
                .replace("{start_year}", &origin.year.to_string())
                .replace("{month}", &origin.month.to_string())
                .replace("{day}", &origin.day.to_string())
                .replace("{leap}", leap)
                .replace("{date}", &date.to_string())
        };

        ReminderEvent {
            title: fill(&self.title),
            description: fill(&self.description),
            date,
            time_zone: self.time_zone.clone(),
            reminders: self.reminders.clone(),
        }
    }
}
