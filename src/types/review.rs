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

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::fsrs::Rating;
use crate::fsrs::T;
use crate::types::card::CardLifecycleState;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// A learner's answer to a card.
#[derive(Clone, PartialEq, Debug)]
pub struct ReviewEvent {
    pub card_id: CardId,
    pub rating: Rating,
    pub reviewed_at: Timestamp,
    /// How long the learner took to answer.
    pub time_spent: Duration,
}

/// An immutable record of one answered card.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLogEntry {
    card_id: CardId,
    reviewed_at: Timestamp,
    rating: Rating,
    lifecycle_before: CardLifecycleState,
    lifecycle_after: CardLifecycleState,
    scheduled_interval_days: T,
    elapsed_days: T,
    time_spent_ms: u64,
}

impl ReviewLogEntry {
    pub fn new(
        event: &ReviewEvent,
        lifecycle_before: CardLifecycleState,
        lifecycle_after: CardLifecycleState,
        scheduled_interval_days: T,
        elapsed_days: T,
    ) -> Self {
        Self {
            card_id: event.card_id.clone(),
            reviewed_at: event.reviewed_at,
            rating: event.rating,
            lifecycle_before,
            lifecycle_after,
            scheduled_interval_days,
            elapsed_days,
            time_spent_ms: u64::try_from(event.time_spent.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn reviewed_at(&self) -> Timestamp {
        self.reviewed_at
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn lifecycle_before(&self) -> CardLifecycleState {
        self.lifecycle_before
    }

    pub fn lifecycle_after(&self) -> CardLifecycleState {
        self.lifecycle_after
    }

    pub fn elapsed_days(&self) -> T {
        self.elapsed_days
    }

    pub fn time_spent(&self) -> Duration {
        Duration::from_millis(self.time_spent_ms)
    }
}
