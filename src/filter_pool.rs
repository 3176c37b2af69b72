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

//! Interning storage for exact-match discriminator components.
//!
//! Each distinct value ever observed for a filter component type is
//! interned once into a global, monotonically-growing table; per-taxon
//! storage holds only the small integer id, which is what lets the
//! taxonizer build filter combinations out of cheap integer sets.

use crate::archetype::TaxonId;
use crate::component::{Component, ComponentIndex};
use crate::entity::Entity;
use crate::pool::{Pool, PoolState};
use rustc_hash::FxHashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct FilterPool<T: Component + Eq + Hash + Clone> {
    state: PoolState,
    unique_by_id: Vec<T>,
    unique_reverse: FxHashMap<T, u16>,
    refcounts: Vec<u32>,
    filter_ids: Vec<Vec<u16>>,
}

impl<T: Component + Eq + Hash + Clone> Default for FilterPool<T> {
    fn default() -> Self {
        Self {
            state: PoolState::default(),
            unique_by_id: Vec::new(),
            unique_reverse: FxHashMap::default(),
            refcounts: Vec::new(),
            filter_ids: Vec::new(),
        }
    }
}

impl<T: Component + Eq + Hash + Clone> FilterPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, value: T) -> u16 {
        if let Some(&id) = self.unique_reverse.get(&value) {
            self.refcounts[id as usize] += 1;
            return id;
        }
        let id = self.unique_by_id.len() as u16;
        self.unique_by_id.push(value.clone());
        self.unique_reverse.insert(value, id);
        self.refcounts.push(1);
        id
    }

    /// Decrement the refcount of `id`. The unique-value table never shrinks
    /// even once a refcount reaches zero: this is preserved behavior (see
    /// DESIGN.md), not an oversight.
    fn release(&mut self, id: u16) {
        if let Some(c) = self.refcounts.get_mut(id as usize) {
            *c = c.saturating_sub(1);
        }
    }

    fn ensure_taxon_storage(&mut self, taxon: TaxonId) {
        let idx = taxon.0 as usize;
        if idx >= self.filter_ids.len() {
            self.filter_ids.resize_with(idx + 1, Vec::new);
        }
    }

    pub fn add(&mut self, entity: Entity, taxon: TaxonId, value: T) {
        debug_assert!(!self.state.has(entity), "entity already has a filter value in this pool");
        let id = self.intern(value);
        self.ensure_taxon_storage(taxon);
        let entry = self.state.push_entity(taxon, entity);
        self.filter_ids[taxon.0 as usize].push(id);
        self.state.place(entity, taxon, entry);
    }

    /// Replace `entity`'s value. Internally a remove followed by an add;
    /// callers must still mark the entity dirty so the taxonizer rebuilds
    /// its filter combination.
    pub fn set(&mut self, entity: Entity, value: T) {
        let idx = self.state.component_index(entity);
        debug_assert!(idx != ComponentIndex::NULL, "set() requires an existing filter value");
        let taxon = TaxonId(idx.taxon_id());
        self.remove_internal(entity);
        self.add(entity, taxon, value);
    }

    fn remove_internal(&mut self, entity: Entity) {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return;
        }
        let (taxon, entry) = (idx.taxon_id(), idx.entry());
        let id = self.filter_ids[taxon as usize].swap_remove(entry as usize);
        self.release(id);
        if let Some(moved) = self.state.swap_remove_entity(TaxonId(taxon), entry) {
            self.state.rewrite_index(moved, TaxonId(taxon), entry);
        }
        self.state.clear_entity(entity);
    }

    pub fn destroy(&mut self, entity: Entity) {
        self.remove_internal(entity);
    }

    pub fn read(&self, entity: Entity) -> Option<&T> {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return None;
        }
        let id = self.filter_ids[idx.taxon_id() as usize][idx.entry() as usize];
        self.unique_by_id.get(id as usize)
    }

    /// The local id of `entity`'s current value, used by the taxonizer when
    /// recomputing filter combinations.
    pub fn local_id(&self, entity: Entity) -> Option<u16> {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return None;
        }
        self.filter_ids[idx.taxon_id() as usize]
            .get(idx.entry() as usize)
            .copied()
    }

    pub fn slice(&self, taxon: TaxonId) -> (&[u16], &[T]) {
        let ids = self
            .filter_ids
            .get(taxon.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        (ids, &self.unique_by_id)
    }

    pub fn entities_in(&self, taxon: TaxonId) -> &[Entity] {
        self.state.entities_in(taxon)
    }

    pub fn taxa(&self) -> &[TaxonId] {
        self.state.taxa()
    }

    pub fn move_taxon(&mut self, entity: Entity, new_taxon: TaxonId) {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL || idx.taxon_id() == new_taxon.0 {
            return;
        }
        let (old_taxon, old_entry) = (idx.taxon_id(), idx.entry());
        let id = self.filter_ids[old_taxon as usize].swap_remove(old_entry as usize);
        if let Some(moved) = self.state.swap_remove_entity(TaxonId(old_taxon), old_entry) {
            self.state.rewrite_index(moved, TaxonId(old_taxon), old_entry);
        }
        self.ensure_taxon_storage(new_taxon);
        let new_entry = self.state.push_entity(new_taxon, entity);
        self.filter_ids[new_taxon.0 as usize].push(id);
        self.state.place(entity, new_taxon, new_entry);
    }
}

impl<T: Component + Eq + Hash + Clone> Pool for FilterPool<T> {
    fn update_taxon(&mut self, entity: Entity, new_taxon: TaxonId) {
        self.move_taxon(entity, new_taxon);
    }

    fn destroy(&mut self, entity: Entity) {
        FilterPool::destroy(self, entity);
    }

    fn has(&self, entity: Entity) -> bool {
        self.state.has(entity)
    }

    fn filter_local_id(&self, entity: Entity) -> Option<u16> {
        self.local_id(entity)
    }

    fn clone_into(&mut self, source: Entity, target: Entity, taxon: TaxonId) {
        if let Some(value) = self.read(source).cloned() {
            self.add(target, taxon, value);
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
    fn interns_equal_values_to_same_id() {
        let mut pool: FilterPool<&'static str> = FilterPool::new();
        let a = Entity::from_raw_id(1, false);
        let b = Entity::from_raw_id(2, false);
        pool.add(a, TaxonId(2), "red");
        pool.add(b, TaxonId(2), "red");
        assert_eq!(pool.local_id(a), pool.local_id(b));
    }

    #[test]
    fn set_changes_value_but_not_identity() {
        let mut pool: FilterPool<&'static str> = FilterPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), "red");
        pool.set(e, "blue");
        assert_eq!(pool.read(e), Some(&"blue"));
    }

    #[test]
    fn unique_table_never_shrinks_on_destroy() {
        let mut pool: FilterPool<&'static str> = FilterPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), "red");
        pool.destroy(e);
        assert_eq!(pool.unique_by_id.len(), 1);
    }
}
