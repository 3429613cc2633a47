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

//! Tunable scheduler parameters and session settings.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::DEFAULT_WEIGHTS;
use crate::fsrs::R;
use crate::fsrs::T;
use crate::fsrs::Weights;
use crate::fsrs::parse_weights;

/// Minutes in a day, for converting step durations.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// The longest interval any setting may ask for: one hundred years.
pub const INTERVAL_LIMIT: T = 36500.0;

/// The constants that drive every memory-model formula. Replaced wholesale,
/// never mutated by the scheduler.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawParameterSet")]
pub struct ParameterSet {
    pub target_retention: R,
    /// In days.
    pub maximum_interval: T,
    pub weights: Weights,
    pub enable_fuzz: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            target_retention: 0.9,
            maximum_interval: 36500.0,
            weights: DEFAULT_WEIGHTS,
            enable_fuzz: true,
        }
    }
}

impl ParameterSet {
    pub fn validate(&self) -> Fallible<()> {
        let retention = self.target_retention;
        if retention.is_nan() || retention <= 0.0 || retention >= 1.0 {
            return fail(format!(
                "target retention must be between 0 and 1, got {}",
                self.target_retention
            ));
        }
        if !(1.0..=INTERVAL_LIMIT).contains(&self.maximum_interval) {
            return fail(format!(
                "maximum interval must be between 1 and {INTERVAL_LIMIT} days, got {}",
                self.maximum_interval
            ));
        }
        parse_weights(&self.weights)?;
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawParameterSet {
    target_retention: R,
    maximum_interval: T,
    weights: Vec<f64>,
    enable_fuzz: bool,
}

impl Default for RawParameterSet {
    fn default() -> Self {
        let params = ParameterSet::default();
        Self {
            target_retention: params.target_retention,
            maximum_interval: params.maximum_interval,
            weights: params.weights.to_vec(),
            enable_fuzz: params.enable_fuzz,
        }
    }
}

impl TryFrom<RawParameterSet> for ParameterSet {
    type Error = ErrorReport;

    fn try_from(raw: RawParameterSet) -> Result<Self, Self::Error> {
        let params = ParameterSet {
            target_retention: raw.target_retention,
            maximum_interval: raw.maximum_interval,
            weights: parse_weights(&raw.weights)?,
            enable_fuzz: raw.enable_fuzz,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Per-session study settings.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawSessionConfig")]
pub struct SessionConfig {
    pub new_cards_per_day: usize,
    /// Zero means unlimited.
    pub max_reviews_per_day: usize,
    /// In minutes.
    pub learning_steps: Vec<f64>,
    /// In minutes.
    pub relearning_steps: Vec<f64>,
    /// In days.
    pub graduating_interval: T,
    /// In days.
    pub easy_interval: T,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            new_cards_per_day: 20,
            max_reviews_per_day: 200,
            learning_steps: vec![1.0, 10.0],
            relearning_steps: vec![10.0],
            graduating_interval: 1.0,
            easy_interval: 4.0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Fallible<()> {
        validate_steps("learning", &self.learning_steps)?;
        validate_steps("relearning", &self.relearning_steps)?;
        if !is_bounded_interval(self.graduating_interval) {
            return fail(format!(
                "graduating interval must be positive and at most {INTERVAL_LIMIT} days"
            ));
        }
        if !is_bounded_interval(self.easy_interval) {
            return fail(format!(
                "easy interval must be positive and at most {INTERVAL_LIMIT} days"
            ));
        }
        Ok(())
    }

    /// The first learning step, in days.
    pub fn first_learning_step(&self) -> T {
        self.learning_steps[0] / MINUTES_PER_DAY
    }

    /// The second learning step if there is one, else the first, in days.
    pub fn second_learning_step(&self) -> T {
        self.learning_steps.get(1).unwrap_or(&self.learning_steps[0]) / MINUTES_PER_DAY
    }

    /// The first relearning step, in days.
    pub fn first_relearning_step(&self) -> T {
        self.relearning_steps[0] / MINUTES_PER_DAY
    }
}

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn is_bounded_interval(days: T) -> bool {
    is_positive(days) && days <= INTERVAL_LIMIT
}

fn validate_steps(name: &str, steps: &[f64]) -> Fallible<()> {
    if steps.is_empty() {
        return fail(format!("{name} steps must not be empty"));
    }
    if !steps
        .iter()
        .all(|step| is_bounded_interval(*step / MINUTES_PER_DAY))
    {
        return fail(format!(
            "{name} steps must be positive durations of at most {INTERVAL_LIMIT} days"
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(default)]
struct RawSessionConfig {
    new_cards_per_day: usize,
    max_reviews_per_day: usize,
    learning_steps: Vec<f64>,
    relearning_steps: Vec<f64>,
    graduating_interval: T,
    easy_interval: T,
}

impl Default for RawSessionConfig {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            new_cards_per_day: config.new_cards_per_day,
            max_reviews_per_day: config.max_reviews_per_day,
            learning_steps: config.learning_steps,
            relearning_steps: config.relearning_steps,
            graduating_interval: config.graduating_interval,
            easy_interval: config.easy_interval,
        }
    }
}

impl TryFrom<RawSessionConfig> for SessionConfig {
    type Error = ErrorReport;

    fn try_from(raw: RawSessionConfig) -> Result<Self, Self::Error> {
        let config = SessionConfig {
            new_cards_per_day: raw.new_cards_per_day,
            max_reviews_per_day: raw.max_reviews_per_day,
            learning_steps: raw.learning_steps,
            relearning_steps: raw.relearning_steps,
            graduating_interval: raw.graduating_interval,
            easy_interval: raw.easy_interval,
        };
        config.validate()?;
        Ok(config)
    }
}

/// The settings file: a `[parameters]` table and a `[session]` table.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parameters: ParameterSet,
    pub session: SessionConfig,
}

impl Config {
    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults.", path.display());
            return Ok(Config::default());
        }
        let content = read_to_string(path)?;
        Config::parse(&content)
    }
}
