// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Drives a run: authenticate once, then publish one event per candidate year.

use std::fmt;
use std::time::Duration;

use jiff::civil::Date;
use lunarcal_gcal::CalendarId;

use crate::credential::{Credential, CredentialProvider};
use crate::error::{AuthError, ConversionError, PublishError};
use crate::lunar::{LunarDate, LunarSolarConverter};
use crate::publisher::{EventPublisher, PublishedEvent};
use crate::recurrence::{Anniversary, Candidate, Candidates, RecurrenceMode, plan};
use crate::reminder::{EventTemplate, ReminderEvent};

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Obtaining a credential.
    Authenticating,
    /// Publishing events.
    Iterating,
    /// Finished.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Authenticating => "authenticating",
            Phase::Iterating => "iterating",
            Phase::Done => "done",
        })
    }
}

/// What happened to one candidate year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event was created.
    Created {
        /// Years since the first occurrence.
        index: u32,
        /// The anniversary in this year.
        lunar: LunarDate,
        /// Solar date of the event.
        date: Date,
        /// The remote event.
        event: PublishedEvent,
    },

    /// The lunar date has no solar counterpart; nothing was sent.
    ConversionFailed {
        /// Years since the first occurrence.
        index: u32,
        /// The anniversary in this year.
        lunar: LunarDate,
        /// Why the conversion failed.
        error: ConversionError,
    },

    /// The remote calendar refused or failed to create the event.
    PublishFailed {
        /// Years since the first occurrence.
        index: u32,
        /// The anniversary in this year.
        lunar: LunarDate,
        /// Solar date of the event.
        date: Date,
        /// Why publishing failed.
        error: PublishError,
    },
}

impl Outcome {
    /// Lunar year this outcome is about.
    #[must_use]
    pub const fn year(&self) -> i32 {
        match self {
            Outcome::Created { lunar, .. }
            | Outcome::ConversionFailed { lunar, .. }
            | Outcome::PublishFailed { lunar, .. } => lunar.year,
        }
    }

    /// Whether the event was created.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Outcome::Created { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created {
                lunar, date, event, ..
            } => {
                let link = event.html_link.as_deref().unwrap_or(&event.id);
                write!(f, "{}: created {date} ({link})", lunar.year)
            }
            Outcome::ConversionFailed { lunar, error, .. } => {
                write!(f, "{}: cannot convert lunar {lunar}: {error}", lunar.year)
            }
            Outcome::PublishFailed {
                lunar, date, error, ..
            } => write!(f, "{}: cannot publish {date}: {error}", lunar.year),
        }
    }
}

/// Outcomes of a run, in year order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One outcome per attempted year.
    pub outcomes: Vec<Outcome>,
}

impl RunSummary {
    /// Number of events created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_created()).count()
    }

    /// Number of years whose date could not be converted.
    #[must_use]
    pub fn conversion_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::ConversionFailed { .. }))
            .count()
    }

    /// Number of events the remote calendar did not create.
    #[must_use]
    pub fn publish_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::PublishFailed { .. }))
            .count()
    }
}

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// The anniversary to project.
    pub anniversary: Anniversary,
    /// Number of candidate years.
    pub count: u32,
    /// No event is created for lunar years before this one.
    pub lower_bound: i32,
    /// How the candidate years are chosen.
    pub mode: RecurrenceMode,
    /// Target calendar.
    pub calendar_id: CalendarId,
    /// Event title, description and reminders.
    pub template: EventTemplate,
    /// Pause after every publish attempt.
    pub pacing: Duration,
}

/// One entry of a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    /// Years since the first occurrence.
    pub index: u32,
    /// The anniversary in this year.
    pub lunar: LunarDate,
    /// The event that would be published, or why there is none.
    pub event: Result<ReminderEvent, ConversionError>,
}

/// Runs a [`RunPlan`] with a lunar converter.
#[derive(Debug, Clone)]
pub struct Orchestrator<C> {
    converter: C,
    plan: RunPlan,
}

impl<C: LunarSolarConverter> Orchestrator<C> {
    /// Creates an orchestrator.
    pub const fn new(converter: C, plan: RunPlan) -> Self {
        Self { converter, plan }
    }

    /// The plan being run.
    pub const fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// The candidate years of this run, converted lazily.
    pub fn candidates(&self) -> Candidates<&C> {
        plan(
            self.plan.anniversary,
            self.plan.count,
            self.plan.lower_bound,
            self.plan.mode,
            &self.converter,
        )
    }

    /// Lists the events a run would publish, without authenticating.
    pub fn preview(&self) -> impl Iterator<Item = PreviewItem> + '_ {
        self.candidates().map(|candidate| PreviewItem {
            index: candidate.index,
            lunar: candidate.lunar,
            event: candidate
                .solar
                .map(|date| self.render(candidate.index, candidate.lunar, date)),
        })
    }

    /// Authenticates, connects and publishes every candidate.
    ///
    /// `connect` builds the publisher from the credential. `on_outcome` sees every outcome
    /// as soon as it is known.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is available or the publisher cannot be built.
    /// Nothing is published in that case. Failures of single years are reported in the
    /// summary instead.
    pub async fn run<P, F>(
        &self,
        credentials: &dyn CredentialProvider,
        connect: F,
        on_outcome: impl FnMut(&Outcome),
    ) -> Result<RunSummary, AuthError>
    where
        P: EventPublisher,
        F: FnOnce(Credential) -> Result<P, AuthError>,
    {
        tracing::info!(phase = %Phase::Authenticating, "starting run");
        let credential = credentials.valid_credential().await.inspect_err(|e| {
            tracing::error!(phase = %Phase::Authenticating, error = %e, "authentication failed");
        })?;
        let publisher = connect(credential)?;

        Ok(self.publish_all(&publisher, on_outcome).await)
    }

    /// Publishes every candidate with an already connected publisher.
    pub async fn publish_all<P: EventPublisher + ?Sized>(
        &self,
        publisher: &P,
        mut on_outcome: impl FnMut(&Outcome),
    ) -> RunSummary {
        tracing::info!(
            phase = %Phase::Iterating,
            calendar = %self.plan.calendar_id,
            candidates = self.candidates().len(),
            "publishing events"
        );

        let mut summary = RunSummary::default();
        for candidate in self.candidates() {
            let outcome = self.attempt(publisher, candidate).await;
            match &outcome {
                Outcome::Created { date, event, .. } => {
                    tracing::info!(year = outcome.year(), %date, id = %event.id, "event created");
                }
                Outcome::ConversionFailed { error, .. } => {
                    tracing::warn!(year = outcome.year(), %error, "conversion failed");
                }
                Outcome::PublishFailed { date, error, .. } => {
                    tracing::warn!(year = outcome.year(), %date, %error, "publish failed");
                }
            }
            on_outcome(&outcome);
            summary.outcomes.push(outcome);
        }

        tracing::info!(
            phase = %Phase::Done,
            created = summary.created(),
            conversion_failures = summary.conversion_failures(),
            publish_failures = summary.publish_failures(),
            "run finished"
        );
        summary
    }

    async fn attempt<P: EventPublisher + ?Sized>(
        &self,
        publisher: &P,
        candidate: Candidate,
    ) -> Outcome {
        let Candidate {
            index,
            lunar,
            solar,
        } = candidate;

        let date = match solar {
            Ok(date) => date,
            Err(error) => {
                return Outcome::ConversionFailed {
                    index,
                    lunar,
                    error,
                };
            }
        };

        let event = self.render(index, lunar, date);
        let result = publisher.publish(&self.plan.calendar_id, &event).await;
        if !self.plan.pacing.is_zero() {
            tokio::time::sleep(self.plan.pacing).await;
        }

        match result {
            Ok(event) => Outcome::Created {
                index,
                lunar,
                date,
                event,
            },
            Err(error) => Outcome::PublishFailed {
                index,
                lunar,
                date,
                error,
            },
        }
    }

    fn render(&self, index: u32, lunar: LunarDate, date: Date) -> ReminderEvent {
        let origin = self.plan.anniversary.origin();
        self.plan.template.render(index, origin, lunar, date)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn outcome_lines() {
        let lunar = LunarDate::new(2030, 1, 1);
        let created = Outcome::Created {
            index: 70,
            lunar,
            date: date(2030, 2, 3),
            event: PublishedEvent {
                id: "evt".to_string(),
                html_link: Some("https://calendar.example/evt".to_string()),
            },
        };
        assert_eq!(
            created.to_string(),
            "2030: created 2030-02-03 (https://calendar.example/evt)"
        );

        let failed = Outcome::PublishFailed {
            index: 70,
            lunar,
            date: date(2030, 2, 3),
            error: PublishError::Remote("boom".to_string()),
        };
        assert_eq!(
            failed.to_string(),
            "2030: cannot publish 2030-02-03: remote failure: boom"
        );

        let unconverted = Outcome::ConversionFailed {
            index: 141,
            lunar: lunar.with_year(2101),
            error: ConversionError::YearOutOfRange {
                year: 2101,
                min: 1900,
                max: 2100,
            },
        };
        assert_eq!(unconverted.year(), 2101);
        assert!(unconverted.to_string().starts_with("2101: cannot convert lunar 2101-01-01:"));
    }

    #[test]
    fn created_without_link_shows_id() {
        let outcome = Outcome::Created {
            index: 0,
            lunar: LunarDate::new(2024, 1, 1),
            date: date(2024, 2, 10),
            event: PublishedEvent {
                id: "evt".to_string(),
                html_link: None,
            },
        };
        assert_eq!(outcome.to_string(), "2024: created 2024-02-10 (evt)");
    }

    #[test]
    fn phase_names() {
        let phases = [Phase::Authenticating, Phase::Iterating, Phase::Done];
        let names: Vec<_> = phases.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["authenticating", "iterating", "done"]);
    }
}
