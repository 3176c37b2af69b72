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

//! The three system kinds the scheduler advances, all sharing a common
//! `process_events` entry point.

use crate::entity::Entity;
use crate::error::Result;
use crate::priority_queue::PriorityQueue;
use crate::world::World;

/// Index of a scheduled system within [`crate::scheduler::Scheduler`]'s
/// scheduled-system list, used to express dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub u32);

/// Runs only in response to events; never owns a deadline queue. Reads the
/// world's event bus via `world.events` (events were already published by
/// the scheduler's `swap_buffers()` before this is called).
pub trait PassiveSystem: Send + Sync {
    fn name(&self) -> &'static str;
    fn process_events(&mut self, world: &mut World) -> Result<()>;
}

/// Owns a priority queue of `(entity, deadline)` pairs and advances entities
/// whose deadline has arrived.
pub trait ScheduledSystem: Send + Sync {
    fn name(&self) -> &'static str;

    fn process_events(&mut self, _world: &mut World) -> Result<()> {
        Ok(())
    }

    /// Advance `entity`'s simulation to `time`; may reschedule it (push a
    /// new deadline back onto its own queue) or emit events.
    fn update_entity(&mut self, world: &mut World, entity: Entity, time: f64) -> Result<()>;

    fn queue(&mut self) -> &mut PriorityQueue<Entity>;
    fn queue_ref(&self) -> &PriorityQueue<Entity>;

    /// Other scheduled systems (by index into the scheduler's list) this
    /// system's listeners depend on, per the event dependency inference
    /// done at `initialize()`.
    fn depends_on(&self) -> &[SystemId] {
        &[]
    }
}

/// Called once per host tick, independent of any deadline queue.
pub trait FrameSystem: Send + Sync {
    fn name(&self) -> &'static str;
    fn update_frame(&mut self, world: &mut World, time: f64) -> Result<()>;
    fn complete_update(&mut self, world: &mut World) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingPassive {
        calls: u32,
    }
    impl PassiveSystem for CountingPassive {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn process_events(&mut self, _world: &mut World) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
    }

    #[test]
    fn passive_system_runs_process_events() {
        let mut world = World::new(Default::default());
        let mut sys = CountingPassive { calls: 0 };
        sys.process_events(&mut world).unwrap();
        assert_eq!(sys.calls, 1);
    }
}
