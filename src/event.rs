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

//! Event types carried on the [`crate::event_bus::EventBus`].

use crate::entity::Entity;
use std::marker::PhantomData;

/// Marker trait for event payloads. Flat value types, same constraint as
/// components.
pub trait Event: Send + Sync + Clone + 'static {}
impl<T: Send + Sync + Clone + 'static> Event for T {}

/// Emitted by a [`crate::data_pool::DataPool`]/[`crate::list_pool::ListPool`]/
/// [`crate::filter_pool::FilterPool`] on `add`, when that pool's creation
/// events are enabled.
pub struct ComponentCreated<T> {
    pub entity: Entity,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ComponentCreated<T> {
    pub fn new(entity: Entity) -> Self {
        Self { entity, _marker: PhantomData }
    }
}

impl<T> Clone for ComponentCreated<T> {
    fn clone(&self) -> Self {
        Self::new(self.entity)
    }
}

impl<T> std::fmt::Debug for ComponentCreated<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCreated").field("entity", &self.entity).finish()
    }
}

/// Emitted on `destroy`, when that pool's destruction events are enabled.
#[derive(Debug, Clone)]
pub struct ComponentDestroyed<T> {
    pub entity: Entity,
    pub value_just_before: T,
}

impl<T> ComponentDestroyed<T> {
    pub fn new(entity: Entity, value_just_before: T) -> Self {
        Self { entity, value_just_before }
    }
}

/// Routes entity destruction through the event bus so listeners observe a
/// component's destruction event strictly before the entity itself vanishes.
#[derive(Debug, Clone, Copy)]
pub struct DestroyEntityEvent {
    pub entity: Entity,
}
