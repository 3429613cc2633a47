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

use std::collections::HashSet;
use std::fs::read_to_string;
use std::fs::rename;
use std::fs::write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::params::Config;
use crate::scheduler::Scheduler;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::review::ReviewLogEntry;

/// Name of the settings file, looked up next to the snapshot.
pub const CONFIG_FILE: &str = "recall.toml";

/// The cards and review log, as stored on disk by the command line tool.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub cards: Vec<Card>,
    pub logs: Vec<ReviewLogEntry>,
}

pub struct Collection {
    pub path: PathBuf,
    pub snapshot: Snapshot,
    pub config: Config,
}

impl Collection {
    pub fn open(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail("snapshot does not exist.");
        }
        let snapshot: Snapshot = {
            log::debug!("Loading snapshot...");
            let start = Instant::now();
            let content = read_to_string(path)?;
            let snapshot: Snapshot = serde_json::from_str(&content)?;
            let duration = start.elapsed().as_millis();
            log::debug!(
                "Loaded {} cards and {} log entries in {duration}ms.",
                snapshot.cards.len(),
                snapshot.logs.len()
            );
            snapshot
        };

        let mut seen: HashSet<&CardId> = HashSet::new();
        for card in &snapshot.cards {
            if !seen.insert(&card.id) {
                return fail(format!("duplicate card identifier: {}", card.id));
            }
        }

        let config_path = match path.parent() {
            Some(dir) => dir.join(CONFIG_FILE),
            None => PathBuf::from(CONFIG_FILE),
        };
        let config = Config::load(&config_path)?;

        Ok(Self {
            path: path.to_path_buf(),
            snapshot,
            config,
        })
    }

    pub fn scheduler(&self) -> Fallible<Scheduler> {
        Scheduler::new(self.config.parameters.clone(), self.config.session.clone())
    }

    pub fn card(&self, id: &CardId) -> Fallible<&Card> {
        match self.snapshot.cards.iter().find(|card| &card.id == id) {
            Some(card) => Ok(card),
            None => fail(format!("no such card: {id}")),
        }
    }

    pub fn card_mut(&mut self, id: &CardId) -> Fallible<&mut Card> {
        match self.snapshot.cards.iter_mut().find(|card| &card.id == id) {
            Some(card) => Ok(card),
            None => fail(format!("no such card: {id}")),
        }
    }

    /// Write the snapshot back. The file is replaced atomically.
    pub fn save(&self) -> Fallible<()> {
        let json = serde_json::to_string_pretty(&self.snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        write(&tmp, json)?;
        rename(&tmp, &self.path)?;
        log::debug!("Snapshot written to {}.", self.path.display());
        Ok(())
    }
}
