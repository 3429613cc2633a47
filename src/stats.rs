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

//! Review statistics and workload forecasts.

use serde::Serialize;

use crate::fsrs::retrievability;
use crate::types::card::Card;
use crate::types::card::CardLifecycleState;
use crate::types::date::Date;
use crate::types::review::ReviewLogEntry;
use crate::types::timestamp::Timestamp;

/// The trailing window for retention and average daily reviews.
const TRAILING_WINDOW_DAYS: f64 = 30.0;

/// Cards due for longer than this are overdue.
const OVERDUE_AFTER_DAYS: f64 = 1.0;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: Date,
    pub reviewed: usize,
    /// Reviews of cards that were new at the time.
    pub new_learned: usize,
    /// Reviews rated `Again`.
    pub failed: usize,
    pub time_spent_ms: u64,
    /// Fraction of reviews rated `Hard` or better.
    pub average_accuracy: f64,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub relearning_cards: usize,
    pub due_cards: usize,
    pub overdue_cards: usize,
    pub retention_rate: f64,
    pub streak: usize,
    pub best_streak: usize,
    pub average_daily_reviews: f64,
    pub predicted_retention: f64,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayForecast {
    pub date: Date,
    pub due: usize,
}

pub fn daily_stats(logs: &[ReviewLogEntry], date: Date) -> DailyStats {
    let mut stats = DailyStats {
        date,
        reviewed: 0,
        new_learned: 0,
        failed: 0,
        time_spent_ms: 0,
        average_accuracy: 0.0,
    };
    let mut passed = 0;
    for log in logs.iter().filter(|log| date.contains(log.reviewed_at())) {
        stats.reviewed += 1;
        if log.lifecycle_before() == CardLifecycleState::New {
            stats.new_learned += 1;
        }
        if log.rating().is_pass() {
            passed += 1;
        } else {
            stats.failed += 1;
        }
        let millis = u64::try_from(log.time_spent().as_millis()).unwrap_or(u64::MAX);
        stats.time_spent_ms = stats.time_spent_ms.saturating_add(millis);
    }
    if stats.reviewed > 0 {
        stats.average_accuracy = passed as f64 / stats.reviewed as f64;
    }
    stats
}

/// Daily stats for every day from `first` through `last`, inclusive.
pub fn daily_history(logs: &[ReviewLogEntry], first: Date, last: Date) -> Vec<DailyStats> {
    first
        .range_inclusive(last)
        .map(|date| daily_stats(logs, date))
        .collect()
}

pub fn aggregate_stats(
    cards: &[Card],
    logs: &[ReviewLogEntry],
    history: &[DailyStats],
    now: Timestamp,
) -> AggregateStats {
    let count = |lifecycle: CardLifecycleState| {
        cards
            .iter()
            .filter(|card| card.state.lifecycle == lifecycle)
            .count()
    };
    let due: Vec<&Card> = cards.iter().filter(|card| card.state.is_due(now)).collect();
    let overdue_cards = due
        .iter()
        .filter(|card| now.days_since(card.state.next_due_at) > OVERDUE_AFTER_DAYS)
        .count();

    let window_start = now.plus_days(-TRAILING_WINDOW_DAYS);
    let recent: Vec<&ReviewLogEntry> = logs
        .iter()
        .filter(|log| log.reviewed_at() > window_start && log.reviewed_at() <= now)
        .collect();
    let retention_rate = if recent.is_empty() {
        0.0
    } else {
        let passed = recent.iter().filter(|log| log.rating().is_pass()).count();
        passed as f64 / recent.len() as f64
    };
    let average_daily_reviews = recent.len() as f64 / TRAILING_WINDOW_DAYS;

    AggregateStats {
        total_cards: cards.len(),
        new_cards: count(CardLifecycleState::New),
        learning_cards: count(CardLifecycleState::Learning),
        review_cards: count(CardLifecycleState::Review),
        relearning_cards: count(CardLifecycleState::Relearning),
        due_cards: due.len(),
        overdue_cards,
        retention_rate,
        streak: current_streak(history),
        best_streak: best_streak(history),
        average_daily_reviews,
        predicted_retention: predicted_retention(cards, now),
    }
}

fn sorted_days(history: &[DailyStats]) -> Vec<&DailyStats> {
    let mut days: Vec<&DailyStats> = history.iter().collect();
    days.sort_by_key(|day| day.date);
    days
}

/// Consecutive days with reviews, counting back from the most recent day in
/// the history. A day without reviews, or a missing day, ends the streak.
fn current_streak(history: &[DailyStats]) -> usize {
    let mut streak = 0;
    let mut expected: Option<Date> = None;
    for day in sorted_days(history).into_iter().rev() {
        if let Some(expected) = expected {
            if day.date != expected {
                break;
            }
        }
        if day.reviewed == 0 {
            break;
        }
        streak += 1;
        expected = Some(day.date.pred());
    }
    streak
}

/// The longest run of consecutive days with reviews.
fn best_streak(history: &[DailyStats]) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<Date> = None;
    for day in sorted_days(history) {
        let consecutive = previous.is_some_and(|prev| prev.succ() == day.date);
        if day.reviewed == 0 {
            run = 0;
        } else if consecutive {
            run += 1;
        } else {
            run = 1;
        }
        best = best.max(run);
        previous = Some(day.date);
    }
    best
}

/// Mean modeled recall probability over cards in review.
fn predicted_retention(cards: &[Card], now: Timestamp) -> f64 {
    let probabilities: Vec<f64> = cards
        .iter()
        .filter(|card| card.state.lifecycle == CardLifecycleState::Review)
        .map(|card| {
            let elapsed = card
                .state
                .last_reviewed_at
                .map(|last| now.days_since(last).max(0.0))
                .unwrap_or(0.0);
            retrievability(elapsed, card.state.stability)
        })
        .collect();
    if probabilities.is_empty() {
        return 0.0;
    }
    probabilities.iter().sum::<f64>() / probabilities.len() as f64
}

/// Due counts for each of the next `days_ahead` calendar days, starting with
/// the day containing `now`. Cards due before that day are not counted.
pub fn forecast_workload(cards: &[Card], now: Timestamp, days_ahead: usize) -> Vec<DayForecast> {
    let today = now.date();
    let mut forecast: Vec<DayForecast> = (0..days_ahead)
        .map(|offset| DayForecast {
            date: today.add_days(offset as u64),
            due: 0,
        })
        .collect();
    let window_start = today.start();
    for card in cards {
        let offset = card.state.next_due_at.days_since(window_start);
        if offset < 0.0 {
            continue;
        }
        let index = offset.floor() as usize;
        if let Some(day) = forecast.get_mut(index) {
            day.due += 1;
        }
    }
    forecast
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::fsrs::Rating;
    use crate::types::card_id::CardId;
    use crate::types::review::ReviewEvent;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn log(at: &str, rating: Rating, before: CardLifecycleState, secs: u64) -> ReviewLogEntry {
        let event = ReviewEvent {
            card_id: CardId::new("c").unwrap(),
            rating,
            reviewed_at: ts(at),
            time_spent: Duration::from_secs(secs),
        };
        ReviewLogEntry::new(&event, before, CardLifecycleState::Review, 1.0, 0.0)
    }

    fn day(d: Date, reviewed: usize) -> DailyStats {
        DailyStats {
            date: d,
            reviewed,
            new_learned: 0,
            failed: 0,
            time_spent_ms: 0,
            average_accuracy: 0.0,
        }
    }

    fn card_due(id: &str, lifecycle: CardLifecycleState, due: &str) -> Card {
        let mut card = Card::new(CardId::new(id).unwrap(), ts("2025-01-01T00:00:00Z"));
        card.state.lifecycle = lifecycle;
        card.state.next_due_at = ts(due);
        card
    }

    #[test]
    fn test_daily_stats() {
        let logs = vec![
            log("2025-03-01T08:00:00Z", Rating::Good, CardLifecycleState::New, 5),
            log("2025-03-01T09:00:00Z", Rating::Again, CardLifecycleState::Review, 7),
            log("2025-03-01T23:00:00Z", Rating::Hard, CardLifecycleState::Review, 3),
            log("2025-03-01T23:30:00Z", Rating::Easy, CardLifecycleState::New, 2),
            log("2025-03-02T00:00:00Z", Rating::Again, CardLifecycleState::Review, 9),
        ];
        let stats = daily_stats(&logs, date(2025, 3, 1));
        assert_eq!(stats.reviewed, 4);
        assert_eq!(stats.new_learned, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.time_spent_ms, 17_000);
        assert_eq!(stats.average_accuracy, 0.75);
    }

    #[test]
    fn test_daily_stats_empty_day() {
        let stats = daily_stats(&[], date(2025, 3, 1));
        assert_eq!(stats.reviewed, 0);
        assert_eq!(stats.average_accuracy, 0.0);
    }

    #[test]
    fn test_daily_history() {
        let logs = vec![
            log("2025-03-01T08:00:00Z", Rating::Good, CardLifecycleState::New, 5),
            log("2025-03-03T08:00:00Z", Rating::Good, CardLifecycleState::Review, 5),
        ];
        let history = daily_history(&logs, date(2025, 3, 1), date(2025, 3, 3));
        let reviewed: Vec<usize> = history.iter().map(|d| d.reviewed).collect();
        assert_eq!(reviewed, vec![1, 0, 1]);
    }

    #[test]
    fn test_streak_broken_by_today() {
        let mut history: Vec<DailyStats> = (1..=5).map(|d| day(date(2025, 3, d), 10)).collect();
        history.push(day(date(2025, 3, 6), 0));
        assert_eq!(current_streak(&history), 0);
        assert_eq!(best_streak(&history), 5);
    }

    #[test]
    fn test_streak() {
        let history = vec![
            day(date(2025, 3, 1), 3),
            day(date(2025, 3, 2), 3),
            day(date(2025, 3, 3), 0),
            day(date(2025, 3, 4), 1),
            day(date(2025, 3, 5), 2),
            day(date(2025, 3, 6), 4),
        ];
        assert_eq!(current_streak(&history), 3);
        assert_eq!(best_streak(&history), 3);
        // Order of the input does not matter.
        let reversed: Vec<DailyStats> = history.into_iter().rev().collect();
        assert_eq!(current_streak(&reversed), 3);
    }

    #[test]
    fn test_streak_gap() {
        let history = vec![
            day(date(2025, 3, 1), 3),
            day(date(2025, 3, 2), 3),
            day(date(2025, 3, 4), 1),
        ];
        assert_eq!(current_streak(&history), 1);
        assert_eq!(best_streak(&history), 2);
        assert_eq!(current_streak(&[]), 0);
        assert_eq!(best_streak(&[]), 0);
    }

    #[test]
    fn test_aggregate_stats() {
        let now = ts("2025-03-10T12:00:00Z");
        let mut reviewed = card_due("r1", CardLifecycleState::Review, "2025-03-12T00:00:00Z");
        reviewed.state.stability = 10.0;
        reviewed.state.last_reviewed_at = Some(ts("2025-03-05T12:00:00Z"));
        let cards = vec![
            Card::new(CardId::new("n1").unwrap(), ts("2025-03-09T00:00:00Z")),
            card_due("l1", CardLifecycleState::Learning, "2025-03-10T11:00:00Z"),
            card_due("r2", CardLifecycleState::Review, "2025-03-07T00:00:00Z"),
            card_due("rl1", CardLifecycleState::Relearning, "2025-03-10T13:00:00Z"),
            reviewed.clone(),
        ];
        let logs = vec![
            log("2025-03-09T08:00:00Z", Rating::Good, CardLifecycleState::New, 5),
            log("2025-03-09T09:00:00Z", Rating::Again, CardLifecycleState::Review, 5),
            log("2025-03-10T08:00:00Z", Rating::Hard, CardLifecycleState::Review, 5),
            log("2025-03-10T09:00:00Z", Rating::Easy, CardLifecycleState::Review, 5),
            // Outside the trailing window.
            log("2025-01-01T09:00:00Z", Rating::Again, CardLifecycleState::Review, 5),
        ];
        let history = daily_history(&logs, date(2025, 3, 1), date(2025, 3, 10));
        let stats = aggregate_stats(&cards, &logs, &history, now);
        assert_eq!(stats.total_cards, 5);
        assert_eq!(stats.new_cards, 1);
        assert_eq!(stats.learning_cards, 1);
        assert_eq!(stats.review_cards, 2);
        assert_eq!(stats.relearning_cards, 1);
        // n1, l1 and r2.
        assert_eq!(stats.due_cards, 3);
        // n1 and r2 are more than a day late.
        assert_eq!(stats.overdue_cards, 2);
        assert_eq!(stats.retention_rate, 0.75);
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.best_streak, 2);
        assert!((stats.average_daily_reviews - 4.0 / 30.0).abs() < 1e-12);
        // r2 was never reviewed, so its retrievability is zero.
        let expected = (retrievability(5.0, 10.0) + 0.0) / 2.0;
        assert!((stats.predicted_retention - expected).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_stats_empty() {
        let now = ts("2025-03-10T12:00:00Z");
        let stats = aggregate_stats(&[], &[], &[], now);
        assert_eq!(stats.total_cards, 0);
        assert_eq!(stats.retention_rate, 0.0);
        assert_eq!(stats.predicted_retention, 0.0);
        assert_eq!(stats.streak, 0);
    }

    #[test]
    fn test_forecast_workload() {
        let now = ts("2025-03-10T12:00:00Z");
        let cards = vec![
            card_due("a", CardLifecycleState::Review, "2025-03-10T13:00:00Z"),
            // Due earlier today: still part of today's workload.
            card_due("b", CardLifecycleState::Review, "2025-03-10T01:00:00Z"),
            card_due("c", CardLifecycleState::Review, "2025-03-11T00:00:00Z"),
            card_due("d", CardLifecycleState::Review, "2025-03-11T23:59:00Z"),
            card_due("e", CardLifecycleState::Review, "2025-03-13T00:00:00Z"),
            card_due("f", CardLifecycleState::Review, "2025-04-30T00:00:00Z"),
            // Due before today: not counted.
            card_due("g", CardLifecycleState::Review, "2025-03-09T23:59:00Z"),
        ];
        let forecast = forecast_workload(&cards, now, 4);
        let due: Vec<usize> = forecast.iter().map(|d| d.due).collect();
        assert_eq!(due, vec![2, 2, 0, 1]);
        assert_eq!(forecast[0].date, date(2025, 3, 10));
        assert_eq!(forecast[3].date, date(2025, 3, 13));
        assert!(forecast_workload(&cards, now, 0).is_empty());
    }
}
