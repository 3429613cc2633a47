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

use chrono::Days;
use chrono::NaiveDate;
use chrono::NaiveTime;
use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// A calendar day. Day boundaries are UTC midnights.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The first instant of the day.
    pub fn start(self) -> Timestamp {
        Timestamp::new(self.0.and_time(NaiveTime::MIN).and_utc())
    }

    /// The first instant of the following day.
    pub fn end(self) -> Timestamp {
        self.succ().start()
    }

    pub fn contains(self, ts: Timestamp) -> bool {
        self.start() <= ts && ts < self.end()
    }

    pub fn succ(self) -> Self {
        self.add_days(1)
    }

    pub fn pred(self) -> Self {
        Self(self.0 - Days::new(1))
    }

    pub fn add_days(self, days: u64) -> Self {
        Self(self.0 + Days::new(days))
    }

    /// Every day from `self` through `last`, inclusive.
    pub fn range_inclusive(self, last: Date) -> impl Iterator<Item = Date> {
        let mut current = self;
        std::iter::from_fn(move || {
            if current > last {
                return None;
            }
            let day = current;
            current = current.succ();
            Some(day)
        })
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_window() -> Fallible<()> {
        let day = date(2025, 3, 1);
        assert!(day.contains(Timestamp::parse("2025-03-01T00:00:00Z")?));
        assert!(day.contains(Timestamp::parse("2025-03-01T23:59:59Z")?));
        assert!(!day.contains(Timestamp::parse("2025-03-02T00:00:00Z")?));
        assert!(!day.contains(Timestamp::parse("2025-02-28T23:59:59Z")?));
        Ok(())
    }

    #[test]
    fn test_range() {
        let days: Vec<Date> = date(2025, 2, 27).range_inclusive(date(2025, 3, 2)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], date(2025, 3, 1));
        assert_eq!(days[3].pred(), days[2]);
        assert_eq!(date(2025, 3, 2).range_inclusive(date(2025, 3, 1)).count(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(date(2025, 3, 1).to_string(), "2025-03-01");
    }
}
