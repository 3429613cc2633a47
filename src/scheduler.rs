// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The review state machine.
//!
//! A [`Scheduler`] owns one [`ParameterSet`] and one [`SessionConfig`] and
//! turns `(state, rating, time)` into a new state. Transitions never mutate
//! their input; the caller decides whether to persist the result.
//!
//! ```text
//!   New ──Again/Hard──▶ Learning ──Good/Easy──▶ Review ──Again──▶ Relearning
//!    │                                          ▲    ▲                  │
//!    └────────────────Good/Easy─────────────────┘    └───Good/Easy──────┘
//! ```

use std::collections::BTreeMap;

use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::MAX_DIFFICULTY;
use crate::fsrs::MIN_DIFFICULTY;
use crate::fsrs::R;
use crate::fsrs::Rating;
use crate::fsrs::T;
use crate::fsrs::apply_fuzz;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::fsrs::next_difficulty;
use crate::fsrs::optimal_interval;
use crate::fsrs::retrievability;
use crate::fsrs::stability_after_failure;
use crate::fsrs::stability_after_success;
use crate::params::ParameterSet;
use crate::params::SessionConfig;
use crate::rng::RandomSource;
use crate::types::card::CardLifecycleState;
use crate::types::card::CardMemoryState;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewLogEntry;
use crate::types::timestamp::Timestamp;

/// Multiplier applied to the current step when a learning card is rated
/// `Hard`.
const HARD_STEP_MULTIPLIER: f64 = 1.2;

pub struct Scheduler {
    params: ParameterSet,
    config: SessionConfig,
}

/// The result of answering a card.
#[derive(Clone, PartialEq, Debug)]
pub struct ReviewOutcome {
    pub state: CardMemoryState,
    pub log: ReviewLogEntry,
}

/// A hypothetical outcome shown before the learner answers.
#[derive(Clone, PartialEq, Debug)]
pub struct PreviewOutcome {
    pub state: CardMemoryState,
    pub interval_days: T,
    pub label: String,
}

pub type SchedulePreview = BTreeMap<Rating, PreviewOutcome>;

impl Scheduler {
    pub fn new(params: ParameterSet, config: SessionConfig) -> Fallible<Self> {
        params.validate()?;
        config.validate()?;
        Ok(Self { params, config })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Apply a learner's answer. The random source is only consulted when
    /// fuzzing is enabled.
    pub fn process_review(
        &self,
        state: &CardMemoryState,
        event: &ReviewEvent,
        rng: &mut dyn RandomSource,
    ) -> Fallible<ReviewOutcome> {
        let rng = if self.params.enable_fuzz {
            Some(rng)
        } else {
            None
        };
        let next = self.transition(state, event.rating, event.reviewed_at, rng)?;
        let diff_percent = ((next.difficulty - 1.0) / 9.0) * 100.0;
        log::debug!(
            "{} {} S={:.2}d D={:.2}% due={}",
            event.card_id,
            event.rating,
            next.stability,
            diff_percent,
            next.next_due_at
        );
        let log = ReviewLogEntry::new(
            event,
            state.lifecycle,
            next.lifecycle,
            next.scheduled_interval_days,
            next.elapsed_days,
        );
        Ok(ReviewOutcome { state: next, log })
    }

    /// The outcome of each rating, without fuzz. The input is not modified.
    pub fn preview_schedule(
        &self,
        state: &CardMemoryState,
        now: Timestamp,
    ) -> Fallible<SchedulePreview> {
        let mut preview = BTreeMap::new();
        for rating in Rating::ALL {
            let next = self.transition(state, rating, now, None)?;
            let interval_days = next.scheduled_interval_days;
            preview.insert(
                rating,
                PreviewOutcome {
                    state: next,
                    interval_days,
                    label: format_interval(interval_days),
                },
            );
        }
        Ok(preview)
    }

    fn transition(
        &self,
        state: &CardMemoryState,
        rating: Rating,
        now: Timestamp,
        rng: Option<&mut dyn RandomSource>,
    ) -> Fallible<CardMemoryState> {
        validate_state(state)?;
        let elapsed = elapsed_days(state, now)?;
        let w = &self.params.weights;
        let mut next = state.clone();
        next.elapsed_days = elapsed;
        next.last_reviewed_at = Some(now);
        next.retrievability = retrievability(elapsed, state.stability);

        let interval: T = match state.lifecycle {
            CardLifecycleState::New => {
                next.difficulty = initial_difficulty(w, rating);
                next.stability = initial_stability(w, rating);
                next.repetition_count = 1;
                match rating {
                    Rating::Again => {
                        next.lifecycle = CardLifecycleState::Learning;
                        self.config.first_learning_step()
                    }
                    Rating::Hard => {
                        next.lifecycle = CardLifecycleState::Learning;
                        self.config.second_learning_step()
                    }
                    Rating::Good => {
                        next.lifecycle = CardLifecycleState::Review;
                        self.config.graduating_interval
                    }
                    Rating::Easy => {
                        next.lifecycle = CardLifecycleState::Review;
                        self.config.easy_interval
                    }
                }
            }
            CardLifecycleState::Learning | CardLifecycleState::Relearning => {
                let first_step = if state.lifecycle == CardLifecycleState::Learning {
                    self.config.first_learning_step()
                } else {
                    self.config.first_relearning_step()
                };
                match rating {
                    Rating::Again => first_step,
                    Rating::Hard => {
                        if state.scheduled_interval_days > 0.0 {
                            state.scheduled_interval_days * HARD_STEP_MULTIPLIER
                        } else {
                            first_step
                        }
                    }
                    Rating::Good | Rating::Easy => {
                        next.repetition_count += 1;
                        next.difficulty = next_difficulty(w, state.difficulty, rating);
                        next.lifecycle = CardLifecycleState::Review;
                        if rating == Rating::Good {
                            self.config.graduating_interval
                        } else {
                            self.config.easy_interval
                        }
                    }
                }
            }
            CardLifecycleState::Review => {
                let r: R = next.retrievability;
                next.difficulty = next_difficulty(w, state.difficulty, rating);
                match rating {
                    Rating::Again => {
                        next.lapse_count += 1;
                        next.lifecycle = CardLifecycleState::Relearning;
                        next.stability =
                            stability_after_failure(w, state.difficulty, state.stability, r);
                        self.config.first_relearning_step()
                    }
                    Rating::Hard | Rating::Good | Rating::Easy => {
                        next.repetition_count += 1;
                        next.stability = stability_after_success(
                            w,
                            state.difficulty,
                            state.stability,
                            r,
                            rating,
                        );
                        optimal_interval(
                            next.stability,
                            self.params.target_retention,
                            self.params.maximum_interval,
                        )
                    }
                }
            }
        };

        if !interval.is_finite() {
            return fail(format!("computed interval is not finite: {interval}"));
        }
        let max_interval = self.params.maximum_interval;
        let interval = apply_fuzz(interval.min(max_interval), max_interval, rng);
        next.scheduled_interval_days = interval;
        next.next_due_at = now.plus_days(interval);
        Ok(next)
    }
}

/// Rejects a reviewed card whose memory state is outside its domain.
fn validate_state(state: &CardMemoryState) -> Fallible<()> {
    if state.lifecycle == CardLifecycleState::New {
        return Ok(());
    }
    if !(state.stability.is_finite() && state.stability > 0.0) {
        return fail(format!(
            "invalid card state: stability must be positive, got {}",
            state.stability
        ));
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&state.difficulty) {
        return fail(format!(
            "invalid card state: difficulty must be in [1, 10], got {}",
            state.difficulty
        ));
    }
    if !(state.scheduled_interval_days.is_finite() && state.scheduled_interval_days >= 0.0) {
        return fail(format!(
            "invalid card state: scheduled interval must be non-negative, got {}",
            state.scheduled_interval_days
        ));
    }
    Ok(())
}

/// Days since the previous review, or zero for a card never reviewed.
fn elapsed_days(state: &CardMemoryState, now: Timestamp) -> Fallible<T> {
    match state.last_reviewed_at {
        None => Ok(0.0),
        Some(last) => {
            let elapsed = now.days_since(last);
            if elapsed < 0.0 {
                return fail(format!(
                    "review time {now} precedes last review at {last}"
                ));
            }
            Ok(elapsed)
        }
    }
}

/// A short human-readable interval: minutes or hours below a day, then days,
/// months and years.
pub fn format_interval(days: T) -> String {
    let minutes = (days * 1440.0).round();
    if minutes < 60.0 {
        format!("{}m", minutes as i64)
    } else if days < 1.0 {
        format!("{}h", (minutes / 60.0).round() as i64)
    } else if days < 30.0 {
        format!("{}d", days.round() as i64)
    } else if days < 365.0 {
        format!("{}mo", (days / 30.0).round() as i64)
    } else {
        format!("{:.1}y", days / 365.0)
    }
}
