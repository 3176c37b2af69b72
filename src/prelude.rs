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

//! Convenient re-exports of commonly used types.
//!
//! ```
//! use taxon_ecs::prelude::*;
//! ```

pub use crate::archetype::{Archetype, ArchetypeIndex, TaxonId};
pub use crate::component::{Component, ComponentKind, ComponentTypeId};
pub use crate::data_pool::DataPool;
pub use crate::entity::Entity;
pub use crate::error::{EcsError, Result};
pub use crate::event::{ComponentCreated, ComponentDestroyed, DestroyEntityEvent};
pub use crate::event_bus::EventBus;
pub use crate::filter_pool::FilterPool;
pub use crate::list_pool::ListPool;
pub use crate::query::Query;
pub use crate::registry::{Registry, RegistryIndex};
pub use crate::scheduler::Scheduler;
pub use crate::system::{FrameSystem, PassiveSystem, ScheduledSystem, SystemId};
pub use crate::time::{FixedTimestep, SimClock};
pub use crate::world::{World, WorldConfig};
