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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::fsrs::D;
use crate::fsrs::R;
use crate::fsrs::S;
use crate::fsrs::T;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardLifecycleState {
    /// Never reviewed.
    New,
    /// Short-horizon steps before first graduation, measured in minutes.
    Learning,
    /// Long-horizon state, measured in days.
    Review,
    /// Short-horizon steps after a lapse.
    Relearning,
}

impl CardLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardLifecycleState::New => "new",
            CardLifecycleState::Learning => "learning",
            CardLifecycleState::Review => "review",
            CardLifecycleState::Relearning => "relearning",
        }
    }

    /// Learning and relearning cards run on minute-scale steps.
    pub fn is_short_term(&self) -> bool {
        matches!(
            self,
            CardLifecycleState::Learning | CardLifecycleState::Relearning
        )
    }
}

impl Display for CardLifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The scheduling state of a card.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMemoryState {
    pub lifecycle: CardLifecycleState,
    /// In [1, 10] once reviewed; 0 before.
    pub difficulty: D,
    /// In days; positive once reviewed, 0 before.
    pub stability: S,
    /// The probability of recall computed at the last review.
    pub retrievability: R,
    /// Successful exposures.
    pub repetition_count: u32,
    /// Times the card was rated `Again` while in review.
    pub lapse_count: u32,
    pub last_reviewed_at: Option<Timestamp>,
    pub next_due_at: Timestamp,
    pub scheduled_interval_days: T,
    /// Days between the last two reviews.
    pub elapsed_days: T,
}

impl CardMemoryState {
    /// The state of a card that has never been reviewed. It is due as soon as
    /// it exists.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            lifecycle: CardLifecycleState::New,
            difficulty: 0.0,
            stability: 0.0,
            retrievability: 0.0,
            repetition_count: 0,
            lapse_count: 0,
            last_reviewed_at: None,
            next_due_at: created_at,
            scheduled_interval_days: 0.0,
            elapsed_days: 0.0,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_due_at <= now
    }
}

/// A card record as handed to the scheduler by its owner.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub created_at: Timestamp,
    pub state: CardMemoryState,
}

impl Card {
    pub fn new(id: CardId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            state: CardMemoryState::new(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_new_card() -> Fallible<()> {
        let created_at = Timestamp::parse("2025-03-01T09:00:00Z")?;
        let card = Card::new(CardId::new("c1")?, created_at);
        assert_eq!(card.state.lifecycle, CardLifecycleState::New);
        assert_eq!(card.state.last_reviewed_at, None);
        assert!(card.state.is_due(created_at));
        Ok(())
    }

    #[test]
    fn test_json_shape() -> Fallible<()> {
        let created_at = Timestamp::parse("2025-03-01T09:00:00Z")?;
        let card = Card::new(CardId::new("c1")?, created_at);
        let json = serde_json::to_value(&card)?;
        assert_eq!(json["id"], "c1");
        assert_eq!(json["state"]["lifecycle"], "new");
        assert_eq!(json["state"]["lapseCount"], 0);
        let back: Card = serde_json::from_value(json)?;
        assert_eq!(back, card);
        Ok(())
    }
}
