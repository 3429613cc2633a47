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

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::cmd::forecast::print_forecast;
use crate::cmd::preview::preview_card;
use crate::cmd::queue::print_queue;
use crate::cmd::review::review_card;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::fsrs::Rating;
use crate::types::timestamp::Timestamp;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Evaluate as of this RFC 3339 timestamp instead of the current time.
    #[arg(long, global = true)]
    now: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a card and record the review.
    Review {
        /// Path to the snapshot file.
        snapshot: PathBuf,
        /// The card identifier.
        card: String,
        /// The rating: again, hard, good, easy, or 1-4.
        rating: Rating,
        /// Seconds spent answering.
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
    /// Show the outcome of each rating for a card.
    Preview {
        /// Path to the snapshot file.
        snapshot: PathBuf,
        /// The card identifier.
        card: String,
    },
    /// Print the study queue for a session.
    Queue {
        /// Path to the snapshot file.
        snapshot: PathBuf,
    },
    /// Print review statistics.
    Stats {
        /// Path to the snapshot file.
        snapshot: PathBuf,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Print the number of cards due on each upcoming day.
    Forecast {
        /// Path to the snapshot file.
        snapshot: PathBuf,
        /// How many days to forecast.
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let now = match cli.now {
        Some(ts) => Timestamp::parse(&ts)?,
        None => Timestamp::now(),
    };
    match cli.command {
        Command::Review {
            snapshot,
            card,
            rating,
            seconds,
        } => review_card(&snapshot, &card, rating, seconds, now),
        Command::Preview { snapshot, card } => preview_card(&snapshot, &card, now),
        Command::Queue { snapshot } => print_queue(&snapshot, now),
        Command::Stats { snapshot, format } => print_stats(&snapshot, format, now),
        Command::Forecast { snapshot, days } => print_forecast(&snapshot, days, now),
    }
}
