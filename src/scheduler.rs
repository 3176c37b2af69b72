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

//! Priority-queue-backed scheduler: advances scheduled systems in
//! dependency order, bracketed by passive systems' event processing and
//! frame systems' per-tick hooks.

use crate::error::{EcsError, Result};
use crate::system::{FrameSystem, PassiveSystem, ScheduledSystem, SystemId};
use crate::world::World;

#[cfg(feature = "profiling")]
use tracing::warn;

/// Scheduler-side timing stats for one scheduled system, kept for ambient
/// observability (mirrors the teacher crate's `SystemProfiler` idiom).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTiming {
    pub last_duration: std::time::Duration,
    pub total_duration: std::time::Duration,
    pub invocations: u64,
}

pub struct Scheduler {
    passive: Vec<Box<dyn PassiveSystem>>,
    scheduled: Vec<Box<dyn ScheduledSystem>>,
    frame: Vec<Box<dyn FrameSystem>>,
    timings: Vec<SystemTiming>,
    iteration_guard: u32,
}

impl Scheduler {
    pub fn new(iteration_guard: u32) -> Self {
        Self {
            passive: Vec::new(),
            scheduled: Vec::new(),
            frame: Vec::new(),
            timings: Vec::new(),
            iteration_guard,
        }
    }

    pub fn add_passive(&mut self, system: Box<dyn PassiveSystem>) {
        self.passive.push(system);
    }

    pub fn add_scheduled(&mut self, system: Box<dyn ScheduledSystem>) -> SystemId {
        self.scheduled.push(system);
        self.timings.push(SystemTiming::default());
        SystemId((self.scheduled.len() - 1) as u32)
    }

    pub fn add_frame(&mut self, system: Box<dyn FrameSystem>) {
        self.frame.push(system);
    }

    pub fn timing(&self, id: SystemId) -> Option<SystemTiming> {
        self.timings.get(id.0 as usize).copied()
    }

    fn next_deadline(&self, id: SystemId) -> f64 {
        self.scheduled[id.0 as usize]
            .queue_ref()
            .top_priority()
            .unwrap_or(f64::INFINITY)
    }

    /// Repeatedly pop the head of `id`'s queue while its priority is `<=
    /// max_time`, invoking `update_entity`. Guards against runaway feedback
    /// loops with a bounded iteration count.
    fn update_to(&mut self, world: &mut World, id: SystemId, max_time: f64) -> Result<usize> {
        let mut iterations = 0u32;
        let mut produced = 0usize;
        loop {
            let system = &mut self.scheduled[id.0 as usize];
            if system.queue_ref().is_empty() {
                break;
            }
            if system.queue_ref().top_priority().unwrap() > max_time {
                break;
            }
            let entity = system.queue().pop()?;
            let started = std::time::Instant::now();
            system.update_entity(world, entity, max_time)?;
            let elapsed = started.elapsed();
            let timing = &mut self.timings[id.0 as usize];
            timing.last_duration = elapsed;
            timing.total_duration += elapsed;
            timing.invocations += 1;
            produced += 1;
            iterations += 1;
            if iterations >= self.iteration_guard {
                #[cfg(feature = "profiling")]
                warn!(system = self.scheduled[id.0 as usize].name(), iterations, "update_to guard tripped");
                return Err(EcsError::RunawayScheduler {
                    system: self.scheduled[id.0 as usize].name(),
                    limit: self.iteration_guard,
                });
            }
        }
        Ok(produced)
    }

    /// Advance one host tick at simulation time `t`.
    pub fn tick(&mut self, world: &mut World, t: f64) -> Result<()> {
        loop {
            world.events.swap_buffers();
            world.process_component_changes()?;
            for sys in &mut self.passive {
                sys.process_events(world)?;
            }
            for sys in &mut self.scheduled {
                sys.process_events(world)?;
            }

            let mut any_produced = false;
            loop {
                let ready = (0..self.scheduled.len())
                    .map(|i| SystemId(i as u32))
                    .filter(|&id| self.next_deadline(id) <= t)
                    .min_by(|&a, &b| {
                        self.next_deadline(a)
                            .partial_cmp(&self.next_deadline(b))
                            .unwrap()
                    });
                let Some(id) = ready else { break };

                let deps = self.scheduled[id.0 as usize].depends_on().to_vec();
                let mut max_time = t;
                for dep in deps {
                    max_time = max_time.min(self.next_deadline(dep));
                }

                let produced = self.update_to(world, id, max_time)?;
                if produced > 0 {
                    any_produced = true;
                }
            }

            if !any_produced {
                break;
            }
        }

        for sys in &mut self.frame {
            sys.update_frame(world, t)?;
        }
        for sys in &mut self.frame {
            sys.complete_update(world)?;
        }

        world.events.swap_buffers();
        world.process_component_changes()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    struct CountToTen {
        queue: crate::priority_queue::PriorityQueue<Entity>,
        runs: u32,
    }
    impl ScheduledSystem for CountToTen {
        fn name(&self) -> &'static str {
            "count_to_ten"
        }
        fn update_entity(&mut self, _world: &mut World, entity: Entity, time: f64) -> Result<()> {
            self.runs += 1;
            if self.runs < 10 {
                self.queue.push(entity, time + 1.0);
            }
            Ok(())
        }
        fn queue(&mut self) -> &mut crate::priority_queue::PriorityQueue<Entity> {
            &mut self.queue
        }
        fn queue_ref(&self) -> &crate::priority_queue::PriorityQueue<Entity> {
            &self.queue
        }
    }

    #[test]
    fn drains_ready_scheduled_work_within_a_tick() {
        let mut world = World::new(Default::default());
        world.initialize().unwrap();
        let e = world.create_entity(false).unwrap();
        let mut sched = Scheduler::new(10_000);
        let mut queue = crate::priority_queue::PriorityQueue::new();
        queue.push(e, 0.0);
        sched.add_scheduled(Box::new(CountToTen { queue, runs: 0 }));
        sched.tick(&mut world, 100.0).unwrap();
        assert!(sched.scheduled[0].queue_ref().is_empty());
        let timing = sched.timing(SystemId(0)).unwrap();
        assert_eq!(timing.invocations, 10);
    }

    struct Runaway {
        queue: crate::priority_queue::PriorityQueue<Entity>,
    }
    impl ScheduledSystem for Runaway {
        fn name(&self) -> &'static str {
            "runaway"
        }
        fn update_entity(&mut self, _world: &mut World, entity: Entity, time: f64) -> Result<()> {
            self.queue.push(entity, time);
            Ok(())
        }
        fn queue(&mut self) -> &mut crate::priority_queue::PriorityQueue<Entity> {
            &mut self.queue
        }
        fn queue_ref(&self) -> &crate::priority_queue::PriorityQueue<Entity> {
            &self.queue
        }
    }

    #[test]
    fn runaway_loop_is_caught_by_the_guard() {
        let mut world = World::new(Default::default());
        world.initialize().unwrap();
        let e = world.create_entity(false).unwrap();
        let mut sched = Scheduler::new(100);
        let mut queue = crate::priority_queue::PriorityQueue::new();
        queue.push(e, 0.0);
        sched.add_scheduled(Box::new(Runaway { queue }));
        let result = sched.tick(&mut world, 100.0);
        assert!(matches!(result, Err(EcsError::RunawayScheduler { .. })));
    }
}
