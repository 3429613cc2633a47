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

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::fsrs::T;
use crate::types::date::Date;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse an RFC 3339 timestamp.
    pub fn parse(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(ts.with_timezone(&Utc)))
    }

    /// The UTC calendar date of this timestamp.
    pub fn date(self) -> Date {
        Date::new(self.0.date_naive())
    }

    /// Shift forward by a (possibly fractional) number of days.
    pub fn plus_days(self, days: T) -> Self {
        let millis = (days * MILLIS_PER_DAY).round() as i64;
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Fractional days elapsed from `earlier` to `self`. Negative when
    /// `earlier` is in the future.
    pub fn days_since(self, earlier: Timestamp) -> T {
        (self.0 - earlier.0).num_milliseconds() as f64 / MILLIS_PER_DAY
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
