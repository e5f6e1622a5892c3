// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::Color;
use lunarcal_core::{LunarDate, PreviewItem, ReminderEvent};
use serde::Serialize;

use crate::{
    table::{PaddingDirection, Table, TableColumn},
    util::ArgOutputFormat,
};

#[derive(Debug)]
pub struct PreviewFormatter {
    columns: Vec<PreviewColumn>,
    format: ArgOutputFormat,
}

impl PreviewFormatter {
    pub fn new() -> Self {
        Self {
            columns: vec![
                PreviewColumn::Index,
                PreviewColumn::Lunar,
                PreviewColumn::Date,
                PreviewColumn::Title,
            ],
            format: ArgOutputFormat::Table,
        }
    }

    pub fn with_output_format(mut self, format: ArgOutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format<'a>(&'a self, items: &'a [PreviewItem]) -> Display<'a> {
        Display {
            items,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    items: &'a [PreviewItem],
    formatter: &'a PreviewFormatter,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatter.format {
            ArgOutputFormat::Json => {
                let rows: Vec<_> = self.items.iter().map(JsonRow::from).collect();
                let json = serde_json::to_string_pretty(&rows).map_err(|_| fmt::Error)?;
                writeln!(f, "{json}")
            }
            ArgOutputFormat::Table => {
                write!(f, "{}", Table::new(&self.formatter.columns, self.items))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    index: u32,
    lunar: &'a LunarDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a ReminderEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a PreviewItem> for JsonRow<'a> {
    fn from(item: &'a PreviewItem) -> Self {
        let (event, error) = match &item.event {
            Ok(event) => (Some(event), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            index: item.index,
            lunar: &item.lunar,
            event,
            error,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PreviewColumn {
    Index,
    Lunar,
    Date,
    Title,
}

impl TableColumn<PreviewItem> for PreviewColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            PreviewColumn::Index => "#",
            PreviewColumn::Lunar => "Lunar",
            PreviewColumn::Date => "Date",
            PreviewColumn::Title => "Title",
        }
        .into()
    }

    fn format<'a>(&self, item: &'a PreviewItem) -> Cow<'a, str> {
        match (self, &item.event) {
            (PreviewColumn::Index, _) => item.index.to_string().into(),
            (PreviewColumn::Lunar, _) => item.lunar.to_string().into(),
            (PreviewColumn::Date, Ok(event)) => event.date.to_string().into(),
            (PreviewColumn::Date, Err(_)) => "-".into(),
            (PreviewColumn::Title, Ok(event)) => event.title.as_str().into(),
            (PreviewColumn::Title, Err(e)) => e.to_string().into(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            PreviewColumn::Index => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn color(&self, item: &PreviewItem) -> Option<Color> {
        match (self, &item.event) {
            (PreviewColumn::Title, Err(_)) => Some(Color::Red),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use lunarcal_core::{ConversionError, EventTemplate};

    fn items() -> Vec<PreviewItem> {
        let template = EventTemplate::default();
        let origin = LunarDate::new(1960, 1, 1);
        vec![
            PreviewItem {
                index: 64,
                lunar: origin.with_year(2024),
                event: Ok(template.render(64, origin, origin.with_year(2024), date(2024, 2, 10))),
            },
            PreviewItem {
                index: 141,
                lunar: origin.with_year(2101),
                event: Err(ConversionError::YearOutOfRange {
                    year: 2101,
                    min: 1900,
                    max: 2100,
                }),
            },
        ]
    }

    #[test]
    fn table_lists_dates_and_failures() {
        colored::control::set_override(false);
        let items = items();

        let out = PreviewFormatter::new().format(&items).to_string();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  #  Lunar"));
        assert!(lines[1].contains("2024-01-01"));
        assert!(lines[1].contains("2024-02-10"));
        assert!(lines[1].ends_with("아빠 생신"));
        assert!(lines[2].starts_with("141"));
        assert!(lines[2].contains(" - "));
        assert!(lines[2].contains("2101"));
    }

    #[test]
    fn json_carries_events_and_errors() {
        let items = items();

        let out = PreviewFormatter::new()
            .with_output_format(ArgOutputFormat::Json)
            .format(&items)
            .to_string();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["index"], 64);
        assert_eq!(rows[0]["event"]["date"], "2024-02-10");
        assert_eq!(
            rows[0]["event"]["description"],
            "64번 째 생신(음력 1960년 1월 1일)"
        );
        assert!(rows[0].get("error").is_none());
        assert!(rows[1].get("event").is_none());
        assert!(rows[1]["error"].as_str().unwrap().contains("2101"));
    }
}
