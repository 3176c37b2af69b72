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

//! Entity identifiers and the recycling allocator that hands them out.
//!
//! An [`Entity`] packs a 31-bit id and a 1-bit prototype flag into a single
//! `u32`. Id 0 is reserved for [`Entity::NULL`]. The allocator hands out ids
//! monotonically and recycles destroyed ones through an embedded free-list:
//! each freed slot stores the id of the next free slot, so no side table is
//! needed to track recycled ids.

use crate::error::{EcsError, Result};

const PROTOTYPE_BIT: u32 = 1 << 31;
const ID_MASK: u32 = PROTOTYPE_BIT - 1;

/// A packed entity identifier: 31-bit id plus a prototype flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    /// Reserved null entity: id 0, not a prototype.
    pub const NULL: Entity = Entity(0);

    fn new(id: u32, prototype: bool) -> Self {
        debug_assert!(id & PROTOTYPE_BIT == 0, "entity id overflowed 31 bits");
        Entity(id | if prototype { PROTOTYPE_BIT } else { 0 })
    }

    /// The 31-bit id, independent of the prototype flag.
    pub fn id(self) -> u32 {
        self.0 & ID_MASK
    }

    /// True if this entity was created with the prototype flag set.
    pub fn is_prototype(self) -> bool {
        self.0 & PROTOTYPE_BIT != 0
    }

    /// Raw packed 32-bit representation, as used for equality and hashing.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Construct an `Entity` from a raw id, bypassing the allocator.
    /// Used by pools to address test fixtures and by the allocator itself.
    pub(crate) fn from_raw_id(id: u32, prototype: bool) -> Self {
        Entity::new(id, prototype)
    }

    /// Reconstruct an `Entity` from its packed [`Entity::raw`] representation,
    /// as produced by the serialization snapshot hooks.
    pub(crate) fn from_packed(raw: u32) -> Self {
        Entity(raw)
    }

    pub fn is_null(self) -> bool {
        self == Entity::NULL
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

/// A free-list slot: either occupied by the live entity at that id, or
/// holding the id of the next free slot (`FREE_TAIL` if it is the last).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Occupied(Entity),
    Free { next: u32 },
}

const FREE_TAIL: u32 = u32::MAX;

/// Allocates and recycles [`Entity`] ids.
///
/// `slot[id] == e` together with `id < next_free` is the existence
/// predicate for entity `e`.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    next_free: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            next_free: 1, // id 0 reserved for NULL
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut alloc = Self::new();
        alloc.slots.reserve(capacity);
        alloc
    }

    /// Allocate a fresh or recycled id.
    pub fn allocate(&mut self, prototype: bool) -> Result<Entity> {
        if let Some(free_id) = self.free_head {
            let Slot::Free { next } = self.slots[free_id as usize] else {
                unreachable!("free_head did not point at a free slot");
            };
            self.free_head = if next == FREE_TAIL { None } else { Some(next) };
            let entity = Entity::new(free_id, prototype);
            self.slots[free_id as usize] = Slot::Occupied(entity);
            return Ok(entity);
        }

        if self.next_free & ID_MASK == 0 && self.next_free != 0 {
            return Err(EcsError::EntityCapacityExhausted);
        }
        let id = self.next_free;
        self.next_free += 1;
        let entity = Entity::new(id, prototype);
        self.slots.push(Slot::Occupied(entity));
        Ok(entity)
    }

    /// Recycle `entity`'s id for future allocation.
    pub fn free(&mut self, entity: Entity) {
        let idx = entity.id() as usize;
        debug_assert!(self.is_alive(entity), "freeing an entity that is not alive");
        let next = self.free_head.unwrap_or(FREE_TAIL);
        self.slots[idx] = Slot::Free { next };
        self.free_head = Some(entity.id());
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        let idx = entity.id() as usize;
        idx < self.slots.len() && matches!(self.slots[idx], Slot::Occupied(e) if e == entity)
    }

    /// Number of currently-live entities (not counting recycled, not-yet-reused slots).
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(_)))
            .count()
    }
}
