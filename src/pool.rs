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

//! Shared bookkeeping contract for the three pool kinds ([`crate::data_pool`],
//! [`crate::list_pool`], [`crate::filter_pool`]) and the type-erased handle
//! the taxonizer uses to drive migration without knowing a pool's payload
//! type.

use crate::archetype::TaxonId;
use crate::component::ComponentIndex;
use crate::entity::Entity;
use smallvec::SmallVec;

/// Bookkeeping shared by every pool kind: the entity-id-indexed map to a
/// [`ComponentIndex`], the per-taxon canonical entity order, and the dense
/// list of taxa currently in use.
#[derive(Debug, Default, Clone)]
pub struct PoolState {
    index_map: Vec<ComponentIndex>,
    entity_map: Vec<Vec<Entity>>,
    taxa: SmallVec<[TaxonId; 8]>,
}

impl PoolState {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_entity_slot(&mut self, id: u32) {
        let idx = id as usize;
        if idx >= self.index_map.len() {
            self.index_map.resize(idx + 1, ComponentIndex::NULL);
        }
    }

    fn ensure_taxon(&mut self, taxon: TaxonId) {
        let idx = taxon.0 as usize;
        if idx >= self.entity_map.len() {
            self.entity_map.resize_with(idx + 1, Vec::new);
        }
        if !self.taxa.contains(&taxon) {
            self.taxa.push(taxon);
        }
    }

    pub fn component_index(&self, entity: Entity) -> ComponentIndex {
        self.index_map
            .get(entity.id() as usize)
            .copied()
            .unwrap_or(ComponentIndex::NULL)
    }

    pub fn has(&self, entity: Entity) -> bool {
        self.component_index(entity) != ComponentIndex::NULL
    }

    pub fn entities_in(&self, taxon: TaxonId) -> &[Entity] {
        self.entity_map
            .get(taxon.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn taxa(&self) -> &[TaxonId] {
        &self.taxa
    }

    /// Record that `entity` now occupies `entry` within `taxon`. Caller owns
    /// placing the payload at the matching position.
    pub fn place(&mut self, entity: Entity, taxon: TaxonId, entry: u32) {
        self.ensure_entity_slot(entity.id());
        self.index_map[entity.id() as usize] = ComponentIndex::new(taxon.0, entry);
    }

    pub fn ensure_taxon_exists(&mut self, taxon: TaxonId) {
        self.ensure_taxon(taxon);
    }

    pub fn push_entity(&mut self, taxon: TaxonId, entity: Entity) -> u32 {
        self.ensure_taxon(taxon);
        let vec = &mut self.entity_map[taxon.0 as usize];
        vec.push(entity);
        (vec.len() - 1) as u32
    }

    /// Swap-remove `entry` from `taxon`'s entity order, returning the entity
    /// that now occupies `entry` (if any neighbour was moved).
    pub fn swap_remove_entity(&mut self, taxon: TaxonId, entry: u32) -> Option<Entity> {
        let vec = &mut self.entity_map[taxon.0 as usize];
        vec.swap_remove(entry as usize);
        vec.get(entry as usize).copied()
    }

    pub fn clear_entity(&mut self, entity: Entity) {
        if let Some(slot) = self.index_map.get_mut(entity.id() as usize) {
            *slot = ComponentIndex::NULL;
        }
    }

    pub fn rewrite_index(&mut self, entity: Entity, taxon: TaxonId, entry: u32) {
        self.place(entity, taxon, entry);
    }
}

/// Type-erased pool handle the taxonizer uses to migrate or destroy a
/// component record without depending on the payload type `T`.
pub trait Pool: Send + Sync {
    /// Move `entity`'s record (if it has one) into `new_taxon`.
    fn update_taxon(&mut self, entity: Entity, new_taxon: TaxonId);

    /// Remove `entity`'s record entirely, if present.
    fn destroy(&mut self, entity: Entity);

    fn has(&self, entity: Entity) -> bool;

    /// For filter pools only: the local 16-bit id of the value currently
    /// held for `entity`, used by the taxonizer to build filter
    /// combinations. Non-filter pools never override this.
    fn filter_local_id(&self, _entity: Entity) -> Option<u16> {
        None
    }

    /// Copy `source`'s record (if any) into `target` at `taxon`. Used by
    /// `World::instantiate` to seed a new entity from a prototype. No-op if
    /// `source` has no record in this pool.
    fn clone_into(&mut self, source: Entity, target: Entity, taxon: TaxonId);

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
