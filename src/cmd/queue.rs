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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::queue::build_session_queue;
use crate::types::timestamp::Timestamp;

pub fn print_queue(path: &Path, now: Timestamp) -> Fallible<()> {
    let coll = Collection::open(path)?;
    let queue = build_session_queue(&coll.snapshot.cards, now, &coll.config.session);
    if queue.is_empty() {
        eprintln!("No cards due.");
    }
    println!("{}", serde_json::to_string_pretty(&queue)?);
    Ok(())
}
