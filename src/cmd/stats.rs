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
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::stats::AggregateStats;
use crate::stats::DailyStats;
use crate::stats::aggregate_stats;
use crate::stats::daily_history;
use crate::stats::daily_stats;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    today: DailyStats,
    overall: AggregateStats,
}

pub fn print_stats(path: &Path, format: StatsFormat, now: Timestamp) -> Fallible<()> {
    let coll = Collection::open(path)?;
    let stats = collect_stats(&coll, now);
    match format {
        StatsFormat::Text => {
            println!("{}", render_text(&stats));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

fn collect_stats(coll: &Collection, now: Timestamp) -> Stats {
    let logs = &coll.snapshot.logs;
    let today = now.date();
    let first_day = logs
        .iter()
        .map(|log| log.reviewed_at().date())
        .min()
        .unwrap_or(today)
        .min(today);
    let history = daily_history(logs, first_day, today);
    Stats {
        today: daily_stats(logs, today),
        overall: aggregate_stats(&coll.snapshot.cards, logs, &history, now),
    }
}

fn render_text(stats: &Stats) -> String {
    let o = &stats.overall;
    let t = &stats.today;
    let lines = [
        format!(
            "Cards: {} ({} new, {} learning, {} review, {} relearning)",
            o.total_cards, o.new_cards, o.learning_cards, o.review_cards, o.relearning_cards
        ),
        format!("Due: {} ({} overdue)", o.due_cards, o.overdue_cards),
        format!(
            "Today: {} reviewed, {} new, {} failed, {:.0}% accuracy",
            t.reviewed,
            t.new_learned,
            t.failed,
            t.average_accuracy * 100.0
        ),
        format!("Retention (30d): {:.1}%", o.retention_rate * 100.0),
        format!("Predicted retention: {:.1}%", o.predicted_retention * 100.0),
        format!("Average daily reviews (30d): {:.1}", o.average_daily_reviews),
        format!("Streak: {} days (best {})", o.streak, o.best_streak),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::*;
    use crate::collection::Snapshot;
    use crate::types::card::Card;
    use crate::types::card_id::CardId;

    #[test]
    fn test_non_existent_snapshot() {
        let path = PathBuf::from("./derpherp.json");
        assert!(print_stats(&path, StatsFormat::Json, Timestamp::now()).is_err());
    }

    #[test]
    fn test_collect_stats() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("deck.json");
        let created_at = Timestamp::parse("2025-03-01T00:00:00Z")?;
        let snapshot = Snapshot {
            cards: vec![
                Card::new(CardId::new("a")?, created_at),
                Card::new(CardId::new("b")?, created_at),
            ],
            logs: vec![],
        };
        write(&path, serde_json::to_string(&snapshot)?)?;
        let coll = Collection::open(&path)?;
        let now = Timestamp::parse("2025-03-02T00:00:00Z")?;
        let stats = collect_stats(&coll, now);
        assert_eq!(stats.overall.total_cards, 2);
        assert_eq!(stats.overall.new_cards, 2);
        assert_eq!(stats.overall.due_cards, 2);
        assert_eq!(stats.today.reviewed, 0);
        let text = render_text(&stats);
        assert!(text.contains("Cards: 2 (2 new"));
        assert!(text.contains("Streak: 0 days (best 0)"));
        Ok(())
    }
}
