// Copyright 2024 Saptak Santra
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

//! Simulation clock: tracks the `sim_time` carried in the world-level
//! snapshot and the fixed-step accumulator a host uses to turn wall-clock
//! deltas into scheduler ticks.

use std::time::Duration;

/// Monotonic simulation time, advanced explicitly by the host. Not tied to
/// wall-clock `Instant`s, so it can be replayed deterministically from a
/// snapshot's `sim_time` field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    sim_time: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(sim_time: f64) -> Self {
        Self { sim_time }
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Advance by `delta` seconds, returning the new `sim_time`.
    pub fn advance(&mut self, delta_seconds: f64) -> f64 {
        self.sim_time += delta_seconds;
        self.sim_time
    }
}

/// Accumulates wall-clock deltas into a whole number of fixed-size
/// scheduler ticks, independent of host frame rate.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub fn new(hz: u32) -> Self {
        Self {
            step: Duration::from_secs_f64(1.0 / hz as f64),
            accumulator: Duration::ZERO,
        }
    }

    pub fn from_duration(step: Duration) -> Self {
        Self { step, accumulator: Duration::ZERO }
    }

    /// Feed a wall-clock delta; returns how many whole steps are now ready.
    pub fn accumulate(&mut self, delta: Duration) -> usize {
        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    pub fn step_seconds(&self) -> f64 {
        self.step.as_secs_f64()
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(60)
    }
}
