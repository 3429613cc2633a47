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

use std::path::Path;
use std::time::Duration;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::fsrs::Rating;
use crate::rng::SeededSource;
use crate::types::card_id::CardId;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewLogEntry;
use crate::types::timestamp::Timestamp;

pub fn review_card(
    path: &Path,
    card_id: &str,
    rating: Rating,
    seconds: u64,
    now: Timestamp,
) -> Fallible<()> {
    let entry = apply_review(path, card_id, rating, seconds, now)?;
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

fn apply_review(
    path: &Path,
    card_id: &str,
    rating: Rating,
    seconds: u64,
    now: Timestamp,
) -> Fallible<ReviewLogEntry> {
    let mut coll = Collection::open(path)?;
    let scheduler = coll.scheduler()?;
    let card_id = CardId::new(card_id)?;
    let event = ReviewEvent {
        card_id: card_id.clone(),
        rating,
        reviewed_at: now,
        time_spent: Duration::from_secs(seconds),
    };
    let mut rng = SeededSource::from_entropy();
    let outcome = {
        let card = coll.card(&card_id)?;
        scheduler.process_review(&card.state, &event, &mut rng)?
    };
    coll.card_mut(&card_id)?.state = outcome.state;
    coll.snapshot.logs.push(outcome.log.clone());
    coll.save()?;
    Ok(outcome.log)
}
