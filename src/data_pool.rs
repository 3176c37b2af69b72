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

//! Dense per-taxon storage for plain-value components.
//!
//! Grounded in the teacher crate's type-erased `ComponentColumn` (a raw byte
//! buffer plus a `drop_fn`), but monomorphized to `Vec<T>` since this
//! engine's pools are always typed per `T` rather than fully type-erased.

use crate::archetype::TaxonId;
use crate::component::{Component, ComponentIndex};
use crate::entity::Entity;
use crate::pool::{Pool, PoolState};
use crate::query::Query;

#[derive(Debug)]
pub struct DataPool<T: Component> {
    state: PoolState,
    components: Vec<Vec<T>>,
    creation_events: bool,
    destruction_events: bool,
}

impl<T: Component> Default for DataPool<T> {
    fn default() -> Self {
        Self {
            state: PoolState::new(),
            components: Vec::new(),
            creation_events: false,
            destruction_events: false,
        }
    }
}

impl<T: Component + Clone> DataPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_creation_events(&mut self) {
        self.creation_events = true;
    }

    pub fn enable_destruction_events(&mut self) {
        self.destruction_events = true;
    }

    pub fn creation_events_enabled(&self) -> bool {
        self.creation_events
    }

    pub fn destruction_events_enabled(&self) -> bool {
        self.destruction_events
    }

    fn ensure_taxon_storage(&mut self, taxon: TaxonId) {
        let idx = taxon.0 as usize;
        if idx >= self.components.len() {
            self.components.resize_with(idx + 1, Vec::new);
        }
    }

    /// Attach `value` to `entity` in `taxon`. Fails the debug contract if
    /// `entity` already has a record (callers reconcile taxon placement
    /// exactly once per component attach).
    pub fn add(&mut self, entity: Entity, taxon: TaxonId, value: T) {
        debug_assert!(!self.state.has(entity), "entity already has a record in this pool");
        self.ensure_taxon_storage(taxon);
        let entry = self.state.push_entity(taxon, entity);
        self.components[taxon.0 as usize].push(value);
        self.state.place(entity, taxon, entry);
    }

    pub fn destroy(&mut self, entity: Entity) -> Option<T> {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return None;
        }
        let taxon = idx.taxon_id();
        let entry = idx.entry();
        let value = self.components[taxon as usize].swap_remove(entry as usize);
        if let Some(moved) = self.state.swap_remove_entity(TaxonId(taxon), entry) {
            self.state.rewrite_index(moved, TaxonId(taxon), entry);
        }
        self.state.clear_entity(entity);
        Some(value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return None;
        }
        self.components[idx.taxon_id() as usize].get(idx.entry() as usize)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL {
            return None;
        }
        self.components[idx.taxon_id() as usize].get_mut(idx.entry() as usize)
    }

    pub fn slice(&self, taxon: TaxonId) -> &[T] {
        self.components
            .get(taxon.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn slice_mut(&mut self, taxon: TaxonId) -> &mut [T] {
        if (taxon.0 as usize) >= self.components.len() {
            return &mut [];
        }
        &mut self.components[taxon.0 as usize]
    }

    pub fn entities_in(&self, taxon: TaxonId) -> &[Entity] {
        self.state.entities_in(taxon)
    }

    pub fn taxa(&self) -> &[TaxonId] {
        self.state.taxa()
    }

    /// Move `entity`'s record from its current taxon into `new_taxon`.
    /// No-op for entities with no record.
    pub fn move_taxon(&mut self, entity: Entity, new_taxon: TaxonId) {
        let idx = self.state.component_index(entity);
        if idx == ComponentIndex::NULL || idx.taxon_id() == new_taxon.0 {
            return;
        }
        let old_taxon = idx.taxon_id();
        let old_entry = idx.entry();
        let value = self.components[old_taxon as usize].swap_remove(old_entry as usize);
        if let Some(moved) = self.state.swap_remove_entity(TaxonId(old_taxon), old_entry) {
            self.state.rewrite_index(moved, TaxonId(old_taxon), old_entry);
        }
        self.ensure_taxon_storage(new_taxon);
        let new_entry = self.state.push_entity(new_taxon, entity);
        self.components[new_taxon.0 as usize].push(value);
        self.state.place(entity, new_taxon, new_entry);
    }

    /// Every entity across every taxon `query` matched, in taxon order.
    pub fn entities_in_query<'a>(&'a self, query: &'a Query) -> impl Iterator<Item = Entity> + 'a {
        query.taxa().iter().flat_map(move |&taxon| self.entities_in(taxon).iter().copied())
    }

    /// Every value across every taxon `query` matched, in the same order as
    /// [`DataPool::entities_in_query`].
    pub fn values_in<'a>(&'a self, query: &'a Query) -> impl Iterator<Item = &'a T> + 'a {
        query.taxa().iter().flat_map(move |&taxon| self.slice(taxon).iter())
    }

    /// Run `f` over every `(entity, value)` pair in every taxon `query`
    /// matched.
    pub fn for_each(&self, query: &Query, mut f: impl FnMut(Entity, &T)) {
        for &taxon in query.taxa() {
            let entities = self.entities_in(taxon);
            let values = self.slice(taxon);
            for (entity, value) in entities.iter().zip(values.iter()) {
                f(*entity, value);
            }
        }
    }
}

impl<T: Component + Clone> Pool for DataPool<T> {
    fn update_taxon(&mut self, entity: Entity, new_taxon: TaxonId) {
        self.move_taxon(entity, new_taxon);
    }

    fn destroy(&mut self, entity: Entity) {
        DataPool::destroy(self, entity);
    }

    fn has(&self, entity: Entity) -> bool {
        self.state.has(entity)
    }

    fn clone_into(&mut self, source: Entity, target: Entity, taxon: TaxonId) {
        if let Some(value) = self.get(source).cloned() {
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
    fn add_and_get() {
        let mut pool: DataPool<u32> = DataPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), 42);
        assert_eq!(pool.get(e), Some(&42));
    }

    #[test]
    fn destroy_swaps_back_neighbour() {
        let mut pool: DataPool<u32> = DataPool::new();
        let a = Entity::from_raw_id(1, false);
        let b = Entity::from_raw_id(2, false);
        pool.add(a, TaxonId(2), 1);
        pool.add(b, TaxonId(2), 2);
        pool.destroy(a);
        assert_eq!(pool.get(b), Some(&2));
        assert_eq!(pool.slice(TaxonId(2)), &[2]);
    }

    #[test]
    fn move_taxon_preserves_value() {
        let mut pool: DataPool<u32> = DataPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), 7);
        pool.move_taxon(e, TaxonId(5));
        assert_eq!(pool.get(e), Some(&7));
        assert!(pool.slice(TaxonId(2)).is_empty());
        assert_eq!(pool.slice(TaxonId(5)), &[7]);
    }

    #[test]
    fn taxon_slices_stay_position_parallel_with_entities() {
        let mut pool: DataPool<u32> = DataPool::new();
        let a = Entity::from_raw_id(1, false);
        let b = Entity::from_raw_id(2, false);
        pool.add(a, TaxonId(3), 10);
        pool.add(b, TaxonId(3), 20);
        assert_eq!(pool.entities_in(TaxonId(3)), &[a, b]);
        assert_eq!(pool.slice(TaxonId(3)), &[10, 20]);
    }

    #[test]
    fn query_level_accessors_walk_every_matched_taxon() {
        use crate::query::Query;

        let mut pool: DataPool<u32> = DataPool::new();
        let a = Entity::from_raw_id(1, false);
        let b = Entity::from_raw_id(2, false);
        let c = Entity::from_raw_id(3, false);
        pool.add(a, TaxonId(1), 10);
        pool.add(b, TaxonId(1), 20);
        pool.add(c, TaxonId(4), 30);

        let query = Query::new(vec![TaxonId(1), TaxonId(4)]);

        let entities: Vec<Entity> = pool.entities_in_query(&query).collect();
        assert_eq!(entities, vec![a, b, c]);

        let values: Vec<u32> = pool.values_in(&query).copied().collect();
        assert_eq!(values, vec![10, 20, 30]);

        let mut seen = Vec::new();
        pool.for_each(&query, |entity, value| seen.push((entity, *value)));
        assert_eq!(seen, vec![(a, 10), (b, 20), (c, 30)]);
    }
}
