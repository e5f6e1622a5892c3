// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jiff::civil::{Date, date};
use lunarcal_core::{
    Anniversary, AuthError, CalendarId, ConversionError, Credential, CredentialProvider,
    EventPublisher, EventTemplate, LunarDate, LunarSolarConverter, PublishError, PublishedEvent,
    RecurrenceMode, ReminderEvent, RunPlan,
};
use lunarcal_gcal::AccessToken;

/// Maps lunar `y-m-d` to solar `y-02-01`, failing for the configured years.
#[derive(Debug, Default)]
pub struct FakeConverter {
    failing: HashSet<i32>,
    calls: AtomicUsize,
}

impl FakeConverter {
    pub fn failing(years: impl IntoIterator<Item = i32>) -> Self {
        Self {
            failing: years.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LunarSolarConverter for FakeConverter {
    fn to_solar(&self, lunar: LunarDate) -> Result<Date, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&lunar.year) {
            return Err(ConversionError::Other(format!(
                "simulated invalid date in {}",
                lunar.year
            )));
        }
        let year = i16::try_from(lunar.year).map_err(|e| ConversionError::Other(e.to_string()))?;
        Ok(date(year, 2, 1))
    }
}

/// Records published events and fails for the configured solar years.
#[derive(Debug, Default)]
pub struct FakePublisher {
    failing: HashSet<i16>,
    unauthorized: bool,
    published: Mutex<Vec<(CalendarId, ReminderEvent)>>,
}

impl FakePublisher {
    pub fn failing(years: impl IntoIterator<Item = i16>) -> Self {
        Self {
            failing: years.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            unauthorized: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(CalendarId, ReminderEvent)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for FakePublisher {
    async fn publish(
        &self,
        calendar_id: &CalendarId,
        event: &ReminderEvent,
    ) -> Result<PublishedEvent, PublishError> {
        self.published
            .lock()
            .unwrap()
            .push((calendar_id.clone(), event.clone()));

        let year = event.date.year();
        if self.unauthorized {
            return Err(PublishError::Unauthorized("401: Invalid Credentials".into()));
        }
        if self.failing.contains(&year) {
            return Err(PublishError::Remote(format!("500: backend error in {year}")));
        }
        Ok(PublishedEvent {
            id: format!("evt{year}"),
            html_link: Some(format!("https://calendar.example/event?eid=evt{year}")),
        })
    }
}

/// Always hands out the same token.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    requests: AtomicUsize,
}

impl StaticCredentials {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn valid_credential(&self) -> Result<Credential, AuthError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(Credential::new(AccessToken::new("ya29.static".to_string())))
    }
}

/// Never yields a credential.
#[derive(Debug, Default)]
pub struct RevokedCredentials;

#[async_trait]
impl CredentialProvider for RevokedCredentials {
    async fn valid_credential(&self) -> Result<Credential, AuthError> {
        Err(AuthError::Credential(
            "invalid_grant: Token has been expired or revoked.".into(),
        ))
    }
}

/// The birthday run: lunar 1/1 since 1960, 150 years, from 2024, no pacing.
pub fn birthday_plan() -> RunPlan {
    RunPlan {
        anniversary: Anniversary::new(1, 1, 1960),
        count: 150,
        lower_bound: 2024,
        mode: RecurrenceMode::ScanWindow,
        calendar_id: CalendarId::default(),
        template: EventTemplate::default(),
        pacing: Duration::ZERO,
    }
}
