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

//! Session queue construction.

use serde::Serialize;

use crate::params::SessionConfig;
use crate::types::card::Card;
use crate::types::card::CardLifecycleState;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// How many review cards are shown between two new cards.
const REVIEWS_PER_NEW_CARD: usize = 10;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueItem {
    pub card_id: CardId,
    pub due: Timestamp,
    pub lifecycle: CardLifecycleState,
    /// Position in the session; lower is sooner.
    pub priority: usize,
}

fn bucket(lifecycle: CardLifecycleState) -> u8 {
    match lifecycle {
        CardLifecycleState::Learning | CardLifecycleState::Relearning => 0,
        CardLifecycleState::Review => 1,
        CardLifecycleState::New => 2,
    }
}

/// Build the ordered work queue for a study session: learning cards first,
/// then reviews with a new card after every batch of ten.
pub fn build_session_queue(
    cards: &[Card],
    now: Timestamp,
    config: &SessionConfig,
) -> Vec<ReviewQueueItem> {
    let mut due: Vec<&Card> = cards
        .iter()
        .filter(|card| card.state.lifecycle != CardLifecycleState::New)
        .filter(|card| card.state.is_due(now))
        .collect();
    due.sort_by(|a, b| {
        bucket(a.state.lifecycle)
            .cmp(&bucket(b.state.lifecycle))
            .then(a.state.next_due_at.cmp(&b.state.next_due_at))
            .then(a.id.cmp(&b.id))
    });

    let learning: Vec<&Card> = due
        .iter()
        .copied()
        .filter(|card| card.state.lifecycle.is_short_term())
        .collect();

    let review_cap = match config.max_reviews_per_day {
        0 => usize::MAX,
        cap => cap,
    };
    let reviews: Vec<&Card> = due
        .iter()
        .copied()
        .filter(|card| card.state.lifecycle == CardLifecycleState::Review)
        .take(review_cap)
        .collect();

    let mut new: Vec<&Card> = cards
        .iter()
        .filter(|card| card.state.lifecycle == CardLifecycleState::New)
        .collect();
    new.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    new.truncate(config.new_cards_per_day);

    log::debug!(
        "Session queue: {} learning, {} review, {} new.",
        learning.len(),
        reviews.len(),
        new.len()
    );

    let mut ordered: Vec<&Card> = Vec::with_capacity(learning.len() + reviews.len() + new.len());
    ordered.extend(learning);
    let mut reviews = reviews.into_iter();
    let mut new = new.into_iter();
    loop {
        let before = ordered.len();
        ordered.extend(reviews.by_ref().take(REVIEWS_PER_NEW_CARD));
        ordered.extend(new.next());
        if ordered.len() == before {
            break;
        }
    }

    ordered
        .into_iter()
        .enumerate()
        .map(|(priority, card)| ReviewQueueItem {
            card_id: card.id.clone(),
            due: card.state.next_due_at,
            lifecycle: card.state.lifecycle,
            priority,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn now() -> Timestamp {
        Timestamp::parse("2025-03-10T12:00:00Z").unwrap()
    }

    fn card(id: &str, lifecycle: CardLifecycleState, due_offset_days: f64) -> Card {
        let created_at = Timestamp::parse("2025-01-01T00:00:00Z").unwrap();
        let mut card = Card::new(CardId::new(id).unwrap(), created_at);
        card.state.lifecycle = lifecycle;
        card.state.next_due_at = now().plus_days(due_offset_days);
        card
    }

    fn new_card(id: &str, created_offset_days: f64) -> Card {
        let created_at = now().plus_days(-created_offset_days);
        Card::new(CardId::new(id).unwrap(), created_at)
    }

    fn ids(queue: &[ReviewQueueItem]) -> Vec<&str> {
        queue.iter().map(|item| item.card_id.as_str()).collect()
    }

    #[test]
    fn test_empty() {
        let queue = build_session_queue(&[], now(), &SessionConfig::default());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_learning_first() {
        let cards = vec![
            card("r1", CardLifecycleState::Review, -2.0),
            card("l1", CardLifecycleState::Learning, -0.01),
            new_card("n1", 1.0),
            card("rl1", CardLifecycleState::Relearning, -0.5),
        ];
        let queue = build_session_queue(&cards, now(), &SessionConfig::default());
        assert_eq!(ids(&queue), vec!["rl1", "l1", "r1", "n1"]);
        let priorities: Vec<usize> = queue.iter().map(|item| item.priority).collect();
        assert_eq!(priorities, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_not_due_excluded() {
        let cards = vec![
            card("r1", CardLifecycleState::Review, 1.0),
            card("l1", CardLifecycleState::Learning, 0.01),
            card("r2", CardLifecycleState::Review, 0.0),
        ];
        let queue = build_session_queue(&cards, now(), &SessionConfig::default());
        assert_eq!(ids(&queue), vec!["r2"]);
    }

    #[test]
    fn test_interleaving() {
        let mut cards: Vec<Card> = (0..25)
            .map(|i| card(&format!("r{i:02}"), CardLifecycleState::Review, -30.0 + i as f64))
            .collect();
        for i in 0..3 {
            cards.push(new_card(&format!("n{i}"), 10.0 - i as f64));
        }
        let queue = build_session_queue(&cards, now(), &SessionConfig::default());
        assert_eq!(queue.len(), 28);
        assert_eq!(queue[10].card_id.as_str(), "n0");
        assert_eq!(queue[21].card_id.as_str(), "n1");
        assert_eq!(queue[27].card_id.as_str(), "n2");
        assert_eq!(queue[0].card_id.as_str(), "r00");
        assert_eq!(queue[11].card_id.as_str(), "r10");
    }

    #[test]
    fn test_new_cards_after_reviews_run_out() {
        let mut cards = vec![card("r0", CardLifecycleState::Review, -1.0)];
        for i in 0..3 {
            cards.push(new_card(&format!("n{i}"), 10.0 - i as f64));
        }
        let queue = build_session_queue(&cards, now(), &SessionConfig::default());
        assert_eq!(ids(&queue), vec!["r0", "n0", "n1", "n2"]);
    }

    #[test]
    fn test_caps() -> Fallible<()> {
        let mut cards: Vec<Card> = (0..30)
            .map(|i| card(&format!("r{i:02}"), CardLifecycleState::Review, -1.0))
            .collect();
        for i in 0..30 {
            cards.push(new_card(&format!("n{i:02}"), 30.0 - i as f64));
        }
        for i in 0..30 {
            cards.push(card(&format!("l{i:02}"), CardLifecycleState::Learning, -0.001));
        }
        let config = SessionConfig {
            new_cards_per_day: 4,
            max_reviews_per_day: 12,
            ..SessionConfig::default()
        };
        let queue = build_session_queue(&cards, now(), &config);
        let count = |lifecycle: CardLifecycleState| queue.iter().filter(|i| i.lifecycle == lifecycle).count();
        assert_eq!(count(CardLifecycleState::New), 4);
        assert_eq!(count(CardLifecycleState::Review), 12);
        assert_eq!(count(CardLifecycleState::Learning), 30);

        let unlimited = SessionConfig {
            max_reviews_per_day: 0,
            ..config
        };
        let queue = build_session_queue(&cards, now(), &unlimited);
        let reviews = queue
            .iter()
            .filter(|i| i.lifecycle == CardLifecycleState::Review)
            .count();
        assert_eq!(reviews, 30);
        Ok(())
    }

    #[test]
    fn test_short_term_before_everything_else() {
        let mut cards: Vec<Card> = (0..15)
            .map(|i| card(&format!("r{i:02}"), CardLifecycleState::Review, -5.0))
            .collect();
        cards.push(new_card("n0", 1.0));
        cards.push(card("l0", CardLifecycleState::Learning, -0.001));
        cards.push(card("rl0", CardLifecycleState::Relearning, -0.002));
        let queue = build_session_queue(&cards, now(), &SessionConfig::default());
        let last_short = queue
            .iter()
            .rposition(|i| i.lifecycle.is_short_term())
            .unwrap();
        let first_other = queue
            .iter()
            .position(|i| !i.lifecycle.is_short_term())
            .unwrap();
        assert!(last_short < first_other);
    }

    #[test]
    fn test_new_cards_ordered_by_creation() {
        let cards = vec![new_card("b", 1.0), new_card("a", 3.0), new_card("c", 2.0)];
        let config = SessionConfig {
            new_cards_per_day: 2,
            ..SessionConfig::default()
        };
        let queue = build_session_queue(&cards, now(), &config);
        assert_eq!(ids(&queue), vec!["a", "c"]);
    }
}
