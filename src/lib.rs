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

//! Taxon ECS - archetype/filter-combination storage engine with a
//! dependency-ordered scheduler.
//!
//! Entities are not grouped by raw component-type signature. They are
//! grouped by taxon: a `(meta-archetype, filter-combination)` pair, where a
//! meta-archetype is the union-closure of every user-declared archetype
//! that shares a component type with it. Component storage lives in one of
//! three pool kinds ([`data_pool::DataPool`], [`list_pool::ListPool`],
//! [`filter_pool::FilterPool`]) addressed by a packed [`component::ComponentIndex`].

pub mod accessor;
pub mod archetype;
pub mod bitset;
pub mod component;
pub mod data_pool;
pub mod entity;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod filter_pool;
pub mod list_pool;
pub mod nested_list;
pub mod pool;
pub mod prelude;
pub mod priority_queue;
pub mod query;
pub mod registry;
pub mod scheduler;
pub mod serialization;
pub mod system;
pub mod time;
pub mod world;

pub use archetype::{Archetype, ArchetypeIndex, MetaArchetype, TaxonId};
pub use component::{Component, ComponentKind, ComponentTypeId};
pub use entity::Entity;
pub use error::{EcsError, Result};
pub use event::{ComponentCreated, ComponentDestroyed, DestroyEntityEvent, Event};
pub use event_bus::EventBus;
pub use query::Query;
pub use scheduler::Scheduler;
pub use system::{FrameSystem, PassiveSystem, ScheduledSystem, SystemId};
pub use world::{World, WorldConfig};
