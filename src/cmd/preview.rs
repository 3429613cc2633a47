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

use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::fsrs::Rating;
use crate::types::card::CardLifecycleState;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewExport {
    rating: Rating,
    lifecycle: CardLifecycleState,
    interval_days: f64,
    label: String,
    due: Timestamp,
}

pub fn preview_card(path: &Path, card_id: &str, now: Timestamp) -> Fallible<()> {
    let coll = Collection::open(path)?;
    let scheduler = coll.scheduler()?;
    let card = coll.card(&CardId::new(card_id)?)?;
    let preview = scheduler.preview_schedule(&card.state, now)?;
    let export: Vec<PreviewExport> = preview
        .into_iter()
        .map(|(rating, outcome)| PreviewExport {
            rating,
            lifecycle: outcome.state.lifecycle,
            interval_days: outcome.interval_days,
            label: outcome.label,
            due: outcome.state.next_due_at,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
