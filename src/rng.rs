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

//! Random sources for interval fuzzing.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn unit(&mut self) -> f64;
}

/// A deterministic source, for replays and tests.
pub struct SeededSource {
    inner: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn unit(&mut self) -> f64 {
        self.inner.gen_range(0.0..1.0)
    }
}
