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

//! The FSRS memory model: difficulty, stability and retrievability.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::rng::RandomSource;

/// Retrievability, a probability in [0, 1].
pub type R = f64;
/// Stability, in days.
pub type S = f64;
/// Difficulty, in [1, 10].
pub type D = f64;
/// Time, in days.
pub type T = f64;

pub const WEIGHT_COUNT: usize = 19;

pub type Weights = [f64; WEIGHT_COUNT];

/// The FSRS-5 default weights.
pub const DEFAULT_WEIGHTS: Weights = [
    0.4072, 1.1829, 3.1262, 15.4722, 7.2102, 0.5316, 1.0651, 0.0234, 1.616, 0.1544, 1.0824,
    1.9813, 0.0953, 0.2975, 2.2042, 0.2407, 2.9466, 0.5034, 0.6567,
];

pub const MIN_DIFFICULTY: D = 1.0;
pub const MAX_DIFFICULTY: D = 10.0;

/// Floor for the post-lapse stability.
pub const MIN_FAILURE_STABILITY: S = 0.1;

/// Intervals shorter than this are never fuzzed.
const FUZZ_THRESHOLD: T = 2.5;

/// The largest relative perturbation applied by the fuzz step.
const FUZZ_RATIO: f64 = 0.05;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }

    fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    /// Whether the rating counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self >= Rating::Hard
    }
}

impl TryFrom<u8> for Rating {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            _ => fail(format!("invalid rating: {value}")),
        }
    }
}

impl FromStr for Rating {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            other => match other.parse::<u8>() {
                Ok(n) => Rating::try_from(n),
                Err(_) => fail(format!("invalid rating: {s}")),
            },
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checks that a weight vector has exactly [`WEIGHT_COUNT`] finite entries.
pub fn parse_weights(weights: &[f64]) -> Fallible<Weights> {
    let weights: Weights = match weights.try_into() {
        Ok(w) => w,
        Err(_) => {
            return fail(format!(
                "expected {WEIGHT_COUNT} weights, got {}",
                weights.len()
            ));
        }
    };
    if let Some(idx) = weights.iter().position(|w| !w.is_finite()) {
        return fail(format!("weight w{idx} is not a finite number"));
    }
    Ok(weights)
}

pub fn retrievability(t: T, s: S) -> R {
    if s <= 0.0 {
        return 0.0;
    }
    (0.9_f64.ln() * t / s).exp().clamp(0.0, 1.0)
}

pub fn initial_stability(w: &Weights, rating: Rating) -> S {
    match rating {
        Rating::Again => w[0],
        Rating::Hard => w[1],
        Rating::Good => w[2],
        Rating::Easy => w[3],
    }
}

fn raw_initial_difficulty(w: &Weights, rating: Rating) -> D {
    w[4] - f64::exp(w[5] * (rating.as_f64() - 1.0)) + 1.0
}

pub fn initial_difficulty(w: &Weights, rating: Rating) -> D {
    clamp_difficulty(raw_initial_difficulty(w, rating))
}

/// Mean-reverting update toward the initial difficulty of a `Good` rating.
pub fn next_difficulty(w: &Weights, d: D, rating: Rating) -> D {
    let target = raw_initial_difficulty(w, Rating::Good);
    let shifted = d - w[7] * (rating.as_f64() - 3.0);
    clamp_difficulty(w[6] * target + (1.0 - w[6]) * shifted)
}

fn clamp_difficulty(d: D) -> D {
    if d.is_nan() {
        return MAX_DIFFICULTY;
    }
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

pub fn stability_after_success(w: &Weights, d: D, s: S, r: R, rating: Rating) -> S {
    let penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
    let bonus = if rating == Rating::Easy { w[16] } else { 1.0 };
    let growth = f64::exp(w[8])
        * (11.0 - d)
        * s.powf(-w[9])
        * (f64::exp(w[10] * (1.0 - r)) - 1.0)
        * penalty
        * bonus;
    let s_r = s * (growth + 1.0);
    if s_r.is_nan() {
        return s;
    }
    s_r
}

pub fn stability_after_failure(w: &Weights, d: D, s: S, r: R) -> S {
    let s_f = w[11] * d.powf(-w[12]) * ((s + 1.0).powf(w[13]) - 1.0) * f64::exp(w[14] * (1.0 - r));
    if s_f.is_nan() {
        return MIN_FAILURE_STABILITY;
    }
    f64::max(MIN_FAILURE_STABILITY, s_f)
}

/// The interval, in whole days, at which recall probability decays to the
/// target retention.
pub fn optimal_interval(s: S, target_retention: R, max_interval: T) -> T {
    let interval = s * target_retention.ln() / 0.9_f64.ln();
    interval.round().clamp(1.0, max_interval)
}

/// Perturbs an interval to spread out due dates. Passing `None` disables
/// fuzzing. Sub-threshold intervals (including fractional learning steps) are
/// returned unchanged.
pub fn apply_fuzz(interval: T, max_interval: T, rng: Option<&mut dyn RandomSource>) -> T {
    let rng = match rng {
        Some(rng) => rng,
        None => return interval,
    };
    if interval < FUZZ_THRESHOLD {
        return interval;
    }
    let scale = ((interval - FUZZ_THRESHOLD) / 27.5).clamp(0.5, 1.0);
    let delta = interval * FUZZ_RATIO * scale;
    let offset = delta * (2.0 * rng.unit() - 1.0);
    (interval + offset).round().clamp(1.0, max_interval.max(1.0))
}
