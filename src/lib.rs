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

//! recall: an FSRS review scheduler.
//!
//! This library provides:
//! - The FSRS memory model (difficulty, stability, retrievability)
//! - A review state machine over new, learning, review and relearning cards
//! - Session queue construction with daily caps
//! - Review statistics and workload forecasts
//!
//! Everything is a pure function of its inputs apart from interval fuzzing,
//! which draws from an injected [`rng::RandomSource`].

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod error;
pub mod fsrs;
pub mod params;
pub mod queue;
pub mod rng;
pub mod scheduler;
pub mod stats;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use fsrs::Rating;
pub use params::{Config, ParameterSet, SessionConfig};
pub use queue::{ReviewQueueItem, build_session_queue};
pub use rng::{RandomSource, SeededSource};
pub use scheduler::{
    PreviewOutcome, ReviewOutcome, SchedulePreview, Scheduler, format_interval,
};
pub use stats::{
    AggregateStats, DailyStats, DayForecast, aggregate_stats, daily_history, daily_stats,
    forecast_workload,
};
pub use types::card::{Card, CardLifecycleState, CardMemoryState};
pub use types::card_id::CardId;
pub use types::date::Date;
pub use types::review::{ReviewEvent, ReviewLogEntry};
pub use types::timestamp::Timestamp;
