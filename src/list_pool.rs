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

//! Per-taxon storage for list-valued components: each entity's record is an
//! independently growable inner list, moved (not reallocated) on taxon
//! migration via [`crate::nested_list::NestedList`].

use crate::archetype::TaxonId;
use crate::component::{Component, ComponentIndex};
use crate::entity::Entity;
use crate::nested_list::NestedList;
use crate::pool::{Pool, PoolState};

#[derive(Debug)]
pub struct ListPool<T: Component> {
    state: PoolState,
    lists: NestedList<T>,
}

impl<T: Component> Default for ListPool<T> {
    fn default() -> Self {
        Self {
            state: PoolState::default(),
            lists: NestedList::default(),
        }
    }
}

impl<T: Component + Clone> ListPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: Entity, taxon: TaxonId, initial_capacity: usize) {
        debug_assert!(!self.state.has(entity), "entity already has a list record in this pool");
        self.state.ensure_taxon_exists(taxon);
        let entry = self.state.push_entity(taxon, entity);
        let inner = self.lists.push_list(taxon.0 as usize, initial_capacity);
        debug_assert_eq!(inner as u32, entry, "inner list index must track entity_map position");
        self.state.place(entity, taxon, entry);
    }

    pub fn destroy(&mut self, entity: Entity) {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return;
        }
        let (taxon, entry) = (idx.taxon_id() as usize, idx.entry());
        self.lists.take_swap_back(taxon, entry as usize);
        if let Some(moved) = self.state.swap_remove_entity(TaxonId(taxon as u16), entry) {
            self.state.rewrite_index(moved, TaxonId(taxon as u16), entry);
        }
        self.state.clear_entity(entity);
    }

    fn entry_of(&self, entity: Entity) -> Option<(usize, usize)> {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            None
        } else {
            Some((idx.taxon_id() as usize, idx.entry() as usize))
        }
    }

    pub fn length(&self, entity: Entity) -> usize {
        self.entry_of(entity).map_or(0, |(o, i)| self.lists.len(o, i))
    }

    pub fn read(&self, entity: Entity, i: usize) -> &T {
        let (o, inner) = self.entry_of(entity).expect("entity has no list record");
        self.lists.get(o, inner, i)
    }

    pub fn write(&mut self, entity: Entity, i: usize) -> &mut T {
        let (o, inner) = self.entry_of(entity).expect("entity has no list record");
        self.lists.get_mut(o, inner, i)
    }

    pub fn append(&mut self, entity: Entity, value: T) {
        let (o, inner) = self.entry_of(entity).expect("entity has no list record");
        self.lists.append(o, inner, value);
    }

    pub fn remove_at_swap_back(&mut self, entity: Entity, i: usize) {
        let (o, inner) = self.entry_of(entity).expect("entity has no list record");
        self.lists.remove_at_swap_back(o, inner, i);
    }

    pub fn clear(&mut self, entity: Entity) {
        let (o, inner) = self.entry_of(entity).expect("entity has no list record");
        self.lists.clear(o, inner);
    }

    pub fn iter(&self, entity: Entity) -> std::slice::Iter<'_, T> {
        let (o, inner) = self.entry_of(entity).expect("entity has no list record");
        self.lists.iter(o, inner)
    }

    pub fn entities_in(&self, taxon: TaxonId) -> &[Entity] {
        self.state.entities_in(taxon)
    }

    pub fn taxa(&self) -> &[TaxonId] {
        self.state.taxa()
    }

    /// Move `entity`'s owning inner-list pointer from its current taxon to
    /// `new_taxon` without touching its elements.
    pub fn move_taxon(&mut self, entity: Entity, new_taxon: TaxonId) {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL || idx.taxon_id() == new_taxon.0 {
            return;
        }
        let (old_taxon, old_entry) = (idx.taxon_id() as usize, idx.entry());
        let owned = self.lists.take_swap_back(old_taxon, old_entry as usize);
        if let Some(moved) = self.state.swap_remove_entity(TaxonId(old_taxon as u16), old_entry) {
            self.state.rewrite_index(moved, TaxonId(old_taxon as u16), old_entry);
        }
        self.state.ensure_taxon_exists(new_taxon);
        let new_entry = self.state.push_entity(new_taxon, entity);
        self.lists.put(new_taxon.0 as usize, owned);
        self.state.place(entity, new_taxon, new_entry);
    }

    /// Copy a prototype's list element-by-element into a fresh entity's
    /// record (instantiation never shares owning storage with the source).
    pub fn instantiate_from(&mut self, source: Entity, target: Entity, taxon: TaxonId) {
        let len = self.length(source);
        self.add(target, taxon, len);
        for i in 0..len {
            let value = self.read(source, i).clone();
            self.append(target, value);
        }
    }
}

impl<T: Component + Clone> Pool for ListPool<T> {
    fn update_taxon(&mut self, entity: Entity, new_taxon: TaxonId) {
        self.move_taxon(entity, new_taxon);
    }

    fn destroy(&mut self, entity: Entity) {
        ListPool::destroy(self, entity);
    }

    fn has(&self, entity: Entity) -> bool {
        self.state.has(entity)
    }

    fn clone_into(&mut self, source: Entity, target: Entity, taxon: TaxonId) {
        if self.state.has(source) {
            self.instantiate_from(source, target, taxon);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read() {
        let mut pool: ListPool<u32> = ListPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), 0);
        pool.append(e, 1);
        pool.append(e, 2);
        assert_eq!(pool.length(e), 2);
        assert_eq!(*pool.read(e, 0), 1);
    }

    #[test]
    fn move_taxon_preserves_elements_without_realloc() {
        let mut pool: ListPool<u32> = ListPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), 0);
        pool.append(e, 9);
        pool.move_taxon(e, TaxonId(6));
        assert_eq!(pool.length(e), 1);
        assert_eq!(*pool.read(e, 0), 9);
    }

    #[test]
    fn instantiate_copies_elements() {
        let mut pool: ListPool<u32> = ListPool::new();
        let proto = Entity::from_raw_id(1, true);
        pool.add(proto, TaxonId(1), 0);
        pool.append(proto, 5);
        pool.append(proto, 6);
        let target = Entity::from_raw_id(2, false);
        pool.instantiate_from(proto, target, TaxonId(2));
        assert_eq!(pool.length(target), 2);
        assert_eq!(*pool.read(target, 1), 6);
    }
}
