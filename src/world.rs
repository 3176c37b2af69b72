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

//! The taxonizer: owns the entity id space, the archetype/meta-archetype/
//! filter-combination registries, per-entity bookkeeping, and the dirty
//! set. Drives reconciliation and compiles queries.

use crate::archetype::{
    derive_meta_archetypes, Archetype, ArchetypeIndex, FilterInstanceIndex, MetaArchetype,
    MetaArchetypeIndex, Taxon, TaxonId, DEFAULT_FILTER_COMBINATION, DEFAULT_META_ARCHETYPE,
};
use crate::archetype::FilterCombinationIndex;
use crate::bitset::BitSet;
use crate::component::{Component, ComponentKind, ComponentTypeId};
use crate::data_pool::DataPool;
use crate::entity::{Entity, EntityAllocator};
use crate::error::{EcsError, Result};
use crate::event::{ComponentCreated, ComponentDestroyed, DestroyEntityEvent};
use crate::event_bus::EventBus;
use crate::filter_pool::FilterPool;
use crate::list_pool::ListPool;
use crate::pool::Pool;
use crate::query::Query;
use crate::registry::Registry;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::any::TypeId;
use std::hash::Hash;

#[cfg(feature = "profiling")]
use tracing::{debug, trace};

/// World construction knobs, with defaults matching the literal constants
/// named throughout the spec.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    pub initial_entity_capacity: usize,
    pub scheduler_iteration_guard: u32,
    pub event_queue_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_entity_capacity: 1024,
            scheduler_iteration_guard: 10_000,
            event_queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct EntityRecord {
    component_types: BitSet,
    archetypes: SmallVec<[ArchetypeIndex; 4]>,
    meta_map: SmallVec<[(ComponentTypeId, MetaArchetypeIndex); 4]>,
    filter_combination: FilterCombinationIndex,
}

pub struct World {
    config: WorldConfig,
    initialized: bool,

    entities: EntityAllocator,
    records: Vec<EntityRecord>,
    dirty: Vec<Entity>,

    component_type_ids: FxHashMap<TypeId, ComponentTypeId>,
    component_kinds: Vec<ComponentKind>,
    pools: Vec<Option<Box<dyn Pool>>>,

    archetypes: Vec<Archetype>,
    meta_archetypes: Vec<MetaArchetype>,
    super_archetypes: Vec<SmallVec<[MetaArchetypeIndex; 4]>>,

    filter_combo_values: Vec<Vec<FilterInstanceIndex>>,
    filter_combo_reverse: FxHashMap<Vec<FilterInstanceIndex>, FilterCombinationIndex>,
    super_filters: FxHashMap<FilterCombinationIndex, Vec<FilterCombinationIndex>>,

    taxa: Vec<Taxon>,
    taxon_lookup: FxHashMap<(MetaArchetypeIndex, FilterCombinationIndex), TaxonId>,
    taxa_by_meta: FxHashMap<MetaArchetypeIndex, Vec<TaxonId>>,

    named_prototypes: Registry<Entity>,

    pub events: EventBus,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let mut world = Self {
            config,
            initialized: false,
            entities: EntityAllocator::with_capacity(config.initial_entity_capacity),
            records: vec![EntityRecord::default()], // index 0 unused (NULL)
            dirty: Vec::new(),
            component_type_ids: FxHashMap::default(),
            component_kinds: Vec::new(),
            pools: Vec::new(),
            archetypes: Vec::new(),
            meta_archetypes: vec![MetaArchetype::default()],
            super_archetypes: Vec::new(),
            filter_combo_values: vec![Vec::new()],
            filter_combo_reverse: FxHashMap::default(),
            super_filters: FxHashMap::default(),
            taxa: vec![
                Taxon { meta_archetype: DEFAULT_META_ARCHETYPE, filter_combination: DEFAULT_FILTER_COMBINATION },
                Taxon { meta_archetype: DEFAULT_META_ARCHETYPE, filter_combination: DEFAULT_FILTER_COMBINATION },
                Taxon { meta_archetype: DEFAULT_META_ARCHETYPE, filter_combination: DEFAULT_FILTER_COMBINATION },
            ],
            taxon_lookup: FxHashMap::default(),
            taxa_by_meta: FxHashMap::default(),
            named_prototypes: Registry::new(),
            events: EventBus::new(),
        };
        world.filter_combo_reverse.insert(Vec::new(), DEFAULT_FILTER_COMBINATION);
        world.taxon_lookup.insert((DEFAULT_META_ARCHETYPE, DEFAULT_FILTER_COMBINATION), TaxonId::DEFAULT);
        world.taxa_by_meta.entry(DEFAULT_META_ARCHETYPE).or_default().push(TaxonId::DEFAULT);
        world
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    // ---- component type / pool registration ----------------------------

    pub fn register_component_type<T: Component>(&mut self, kind: ComponentKind) -> ComponentTypeId {
        let tid = TypeId::of::<T>();
        if let Some(&id) = self.component_type_ids.get(&tid) {
            return id;
        }
        let id = ComponentTypeId(self.component_kinds.len() as u16);
        self.component_kinds.push(kind);
        self.component_type_ids.insert(tid, id);
        if self.pools.len() <= id.0 as usize {
            self.pools.resize_with(id.0 as usize + 1, || None);
        }
        id
    }

    pub fn kind_of(&self, type_id: ComponentTypeId) -> ComponentKind {
        self.component_kinds[type_id.0 as usize]
    }

    pub fn register_pool<P: Pool + 'static>(&mut self, type_id: ComponentTypeId, pool: P) {
        if self.pools.len() <= type_id.0 as usize {
            self.pools.resize_with(type_id.0 as usize + 1, || None);
        }
        self.pools[type_id.0 as usize] = Some(Box::new(pool));
    }

    pub fn pool<P: Pool + 'static>(&self, type_id: ComponentTypeId) -> &P {
        self.pools[type_id.0 as usize]
            .as_ref()
            .expect("no pool registered for this component type")
            .as_any()
            .downcast_ref::<P>()
            .expect("pool type mismatch")
    }

    pub fn pool_mut<P: Pool + 'static>(&mut self, type_id: ComponentTypeId) -> &mut P {
        self.pools[type_id.0 as usize]
            .as_mut()
            .expect("no pool registered for this component type")
            .as_any_mut()
            .downcast_mut::<P>()
            .expect("pool type mismatch")
    }

    fn initial_taxon(&self, entity: Entity) -> TaxonId {
        if entity.is_prototype() { TaxonId::PROTOTYPE } else { TaxonId::DEFAULT }
    }

    // ---- typed attach/detach convenience --------------------------------

    pub fn attach_data<T: Component + Clone>(&mut self, type_id: ComponentTypeId, entity: Entity, value: T) {
        let taxon = self.initial_taxon(entity);
        let emit = {
            let pool = self.pool_mut::<DataPool<T>>(type_id);
            pool.add(entity, taxon, value);
            pool.creation_events_enabled() && !entity.is_prototype()
        };
        if emit {
            self.events.emit(ComponentCreated::<T>::new(entity));
        }
        self.register_component_add(entity, type_id);
    }

    pub fn detach_data<T: Component + Clone>(&mut self, type_id: ComponentTypeId, entity: Entity) -> Option<T> {
        let pool = self.pool_mut::<DataPool<T>>(type_id);
        let emit = pool.destruction_events_enabled();
        let value = pool.destroy(entity)?;
        if emit {
            self.events.emit(ComponentDestroyed::<T>::new(entity, value.clone()));
        }
        self.register_component_remove(entity, type_id);
        Some(value)
    }

    pub fn attach_list<T: Component + Clone>(
        &mut self,
        type_id: ComponentTypeId,
        entity: Entity,
        initial_capacity: usize,
    ) {
        let taxon = self.initial_taxon(entity);
        self.pool_mut::<ListPool<T>>(type_id).add(entity, taxon, initial_capacity);
        self.register_component_add(entity, type_id);
    }

    pub fn attach_filter<T: Component + Eq + Hash + Clone>(
        &mut self,
        type_id: ComponentTypeId,
        entity: Entity,
        value: T,
    ) {
        let taxon = self.initial_taxon(entity);
        self.pool_mut::<FilterPool<T>>(type_id).add(entity, taxon, value);
        self.register_component_add(entity, type_id);
    }

    pub fn set_filter<T: Component + Eq + Hash + Clone>(
        &mut self,
        type_id: ComponentTypeId,
        entity: Entity,
        value: T,
    ) {
        self.pool_mut::<FilterPool<T>>(type_id).set(entity, value);
        self.register_filter_change(entity, type_id);
    }

    // ---- entity lifecycle -----------------------------------------------

    pub fn create_entity(&mut self, prototype: bool) -> Result<Entity> {
        if !self.initialized {
            return Err(EcsError::InvariantViolation("create_entity called before initialize()".into()));
        }
        if !self.dirty.is_empty() {
            return Err(EcsError::InvariantViolation(
                "entities are pending reconciliation; call process_component_changes() first".into(),
            ));
        }
        let entity = self.entities.allocate(prototype)?;
        let idx = entity.id() as usize;
        if idx >= self.records.len() {
            self.records.resize_with(idx + 1, EntityRecord::default);
        }
        self.records[idx] = EntityRecord::default();
        Ok(entity)
    }

    /// New entity acquires the prototype's component-type set, archetype
    /// set and filter combination; every pool holding a component on the
    /// prototype copies its value into the new entity's taxon.
    pub fn instantiate(&mut self, prototype: Entity) -> Result<Entity> {
        debug_assert!(prototype.is_prototype(), "instantiate() source must be a prototype");
        let new_entity = self.create_entity(false)?;
        let source_record = self.records[prototype.id() as usize].clone();
        let target_taxon = TaxonId::DEFAULT;

        for type_id in source_record.component_types.ones() {
            let type_id = ComponentTypeId(type_id as u16);
            if let Some(pool) = self.pools[type_id.0 as usize].as_mut() {
                pool.clone_into(prototype, new_entity, target_taxon);
            }
        }

        self.records[new_entity.id() as usize] = source_record;
        self.dirty.push(new_entity);
        Ok(new_entity)
    }

    /// Make `prototype` resolvable by `name` for later lookup or
    /// instantiation. Typically called by a prototype loader as it streams
    /// prototypes in, in source order.
    pub fn register_prototype_name(&mut self, name: impl Into<String>, prototype: Entity) {
        debug_assert!(prototype.is_prototype(), "registered name must refer to a prototype entity");
        self.named_prototypes.insert_named(name, prototype);
    }

    /// Resolve a previously-registered prototype by name. Fatal on miss:
    /// there is no fallback.
    pub fn named_prototype(&self, name: &str) -> Result<Entity> {
        self.named_prototypes.require_named(name).map(|&e| e)
    }

    /// Resolve `name`, invoking `loader` to build and register a fresh
    /// prototype the first time `name` is seen. `loader` is expected to
    /// call [`World::create_entity`] with `prototype: true` and attach its
    /// components before returning.
    pub fn named_prototype_or_load(
        &mut self,
        name: &str,
        loader: impl FnOnce(&mut World) -> Result<Entity>,
    ) -> Result<Entity> {
        if self.named_prototypes.get_named(name).is_none() {
            let prototype = loader(self)?;
            self.register_prototype_name(name.to_string(), prototype);
        }
        self.named_prototypes.require_named(name).map(|&e| e)
    }

    pub fn destroy_now(&mut self, entity: Entity) {
        if !self.entities.is_alive(entity) {
            return;
        }
        let types: Vec<ComponentTypeId> = self.records[entity.id() as usize]
            .component_types
            .ones()
            .map(|i| ComponentTypeId(i as u16))
            .collect();
        for type_id in types {
            if let Some(pool) = self.pools[type_id.0 as usize].as_mut() {
                pool.destroy(entity);
            }
        }
        self.records[entity.id() as usize] = EntityRecord::default();
        self.entities.free(entity);
    }

    /// Entity destruction is routed through an event so systems observe a
    /// component's destruction event before the entity itself vanishes.
    pub fn request_destroy(&mut self, entity: Entity) {
        self.events.emit(DestroyEntityEvent { entity });
    }

    fn drain_destroy_events(&mut self) {
        let pending: Vec<Entity> = self.events.listen::<DestroyEntityEvent>().iter().map(|e| e.entity).collect();
        for entity in pending {
            self.destroy_now(entity);
        }
    }

    // ---- archetype declaration & initialization --------------------------

    pub fn add_archetype(&mut self, components: &[ComponentTypeId], filters: &[ComponentTypeId]) -> Result<ArchetypeIndex> {
        if self.initialized {
            return Err(EcsError::InvariantViolation("add_archetype called after initialize()".into()));
        }
        let idx = ArchetypeIndex(self.archetypes.len() as u16);
        self.archetypes.push(Archetype::new(components, filters));
        Ok(idx)
    }

    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(EcsError::InvariantViolation("initialize() called twice".into()));
        }

        let derived = derive_meta_archetypes(&self.archetypes);
        for group in derived {
            self.intern_meta_archetype(group);
        }

        self.super_archetypes = self
            .archetypes
            .iter()
            .map(|a| {
                self.meta_archetypes
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| a.components.is_subset_of(&m.components) && a.filters.is_subset_of(&m.filters))
                    .map(|(i, _)| MetaArchetypeIndex(i as u16))
                    .collect::<SmallVec<[MetaArchetypeIndex; 4]>>()
            })
            .collect();

        self.initialized = true;
        Ok(())
    }

    fn intern_meta_archetype(&mut self, group: MetaArchetype) -> MetaArchetypeIndex {
        for (i, existing) in self.meta_archetypes.iter().enumerate() {
            if existing.components == group.components && existing.filters == group.filters {
                return MetaArchetypeIndex(i as u16);
            }
        }
        let idx = MetaArchetypeIndex(self.meta_archetypes.len() as u16);
        self.meta_archetypes.push(group);
        idx
    }

    // ---- dirty tracking ---------------------------------------------------

    pub fn register_component_add(&mut self, entity: Entity, type_id: ComponentTypeId) {
        let record = &mut self.records[entity.id() as usize];
        record.component_types.set(type_id.0 as usize);
        self.mark_dirty(entity);
    }

    pub fn register_component_remove(&mut self, entity: Entity, type_id: ComponentTypeId) {
        let record = &mut self.records[entity.id() as usize];
        record.component_types.remove(type_id.0 as usize);
        self.mark_dirty(entity);
    }

    pub fn register_filter_change(&mut self, entity: Entity, _type_id: ComponentTypeId) {
        self.mark_dirty(entity);
    }

    fn mark_dirty(&mut self, entity: Entity) {
        if entity.is_prototype() {
            return;
        }
        if !self.dirty.contains(&entity) {
            self.dirty.push(entity);
        }
    }

    // ---- reconciliation -----------------------------------------------------

    fn intern_filter_combination(&mut self, mut instances: Vec<FilterInstanceIndex>) -> FilterCombinationIndex {
        instances.sort();
        instances.dedup();
        if let Some(&idx) = self.filter_combo_reverse.get(&instances) {
            return idx;
        }
        let idx = FilterCombinationIndex(self.filter_combo_values.len() as u32);
        for (existing_combo, existing_values) in self.filter_combo_values.iter().enumerate() {
            let existing_idx = FilterCombinationIndex(existing_combo as u32);
            if existing_values.len() < instances.len() && existing_values.iter().all(|v| instances.contains(v)) {
                // The already-interned combo is a proper subset of this one:
                // this combo is its superset.
                self.super_filters.entry(existing_idx).or_default().push(idx);
            } else if instances.len() < existing_values.len() && instances.iter().all(|v| existing_values.contains(v)) {
                // This combo is a proper subset of an already-interned
                // larger combo, registered regardless of interning order.
                self.super_filters.entry(idx).or_default().push(existing_idx);
            }
        }
        self.filter_combo_reverse.insert(instances.clone(), idx);
        self.filter_combo_values.push(instances);
        idx
    }

    fn get_exact_taxon(&mut self, meta: MetaArchetypeIndex, combination: FilterCombinationIndex) -> TaxonId {
        let values = &self.filter_combo_values[combination.0 as usize];
        let meta_filters = &self.meta_archetypes[meta.0 as usize].filters;
        let projected: Vec<FilterInstanceIndex> = values
            .iter()
            .copied()
            .filter(|fi| meta_filters.contains(fi.component_type().0 as usize))
            .collect();
        let projected_combo = self.intern_filter_combination(projected);

        if let Some(&taxon) = self.taxon_lookup.get(&(meta, projected_combo)) {
            return taxon;
        }
        let taxon = TaxonId(self.taxa.len() as u16);
        self.taxa.push(Taxon { meta_archetype: meta, filter_combination: projected_combo });
        self.taxon_lookup.insert((meta, projected_combo), taxon);
        self.taxa_by_meta.entry(meta).or_default().push(taxon);
        #[cfg(feature = "profiling")]
        debug!(taxon = taxon.0, meta = meta.0, combo = projected_combo.0, "allocated taxon");
        taxon
    }

    /// Steps 1-5 of the reconciliation algorithm: recompute each dirty
    /// entity's filter combination, archetype set, and meta-archetype
    /// partition, then ask every affected pool to migrate into the right
    /// taxon.
    pub fn process_component_changes(&mut self) -> Result<()> {
        let dirty = std::mem::take(&mut self.dirty);
        for entity in dirty {
            if !self.entities.is_alive(entity) {
                continue;
            }
            #[cfg(feature = "profiling")]
            trace!(entity = entity.id(), "reconciling");

            // Step 1: filter combination.
            let component_type_ids: Vec<ComponentTypeId> = self.records[entity.id() as usize]
                .component_types
                .ones()
                .map(|i| ComponentTypeId(i as u16))
                .collect();
            let mut instances = Vec::new();
            for &type_id in &component_type_ids {
                if self.component_kinds[type_id.0 as usize] != ComponentKind::Filter {
                    continue;
                }
                if let Some(pool) = self.pools[type_id.0 as usize].as_ref() {
                    if let Some(local_id) = pool.filter_local_id(entity) {
                        instances.push(FilterInstanceIndex::new(type_id, local_id));
                    }
                }
            }
            let filter_combo = self.intern_filter_combination(instances);
            self.records[entity.id() as usize].filter_combination = filter_combo;

            // Step 2: matched archetypes.
            let types_bitset = self.records[entity.id() as usize].component_types.clone();
            let matched: Vec<Archetype> = self
                .archetypes
                .iter()
                .filter(|a| a.components.is_subset_of(&types_bitset))
                .cloned()
                .collect();

            // Step 3: meta-archetype closure.
            let groups = derive_meta_archetypes(&matched);
            let group_indices: Vec<MetaArchetypeIndex> =
                groups.into_iter().map(|g| self.intern_meta_archetype(g)).collect();

            // Step 4: migrate each component type into its meta-archetype's taxon.
            let mut meta_map = SmallVec::<[(ComponentTypeId, MetaArchetypeIndex); 4]>::new();
            for &type_id in &component_type_ids {
                let meta = group_indices
                    .iter()
                    .copied()
                    .find(|&m| self.meta_archetypes[m.0 as usize].components.contains(type_id.0 as usize))
                    .unwrap_or(DEFAULT_META_ARCHETYPE);
                meta_map.push((type_id, meta));
                let taxon = self.get_exact_taxon(meta, filter_combo);
                if let Some(pool) = self.pools[type_id.0 as usize].as_mut() {
                    pool.update_taxon(entity, taxon);
                }
            }
            self.records[entity.id() as usize].meta_map = meta_map;
        }
        Ok(())
    }

    /// Swap event buffers, process destruction requests, then reconcile all
    /// dirty entities. This is the per-tick drain the scheduler calls both
    /// before and after running systems.
    pub fn publish_and_process(&mut self) -> Result<()> {
        self.events.swap_buffers();
        self.drain_destroy_events();
        self.process_component_changes()
    }

    pub fn events_ref(&self) -> &EventBus {
        &self.events
    }

    // ---- queries -----------------------------------------------------------

    pub fn make_query(&self, archetype: ArchetypeIndex) -> Result<Query> {
        if !self.initialized {
            return Err(EcsError::InvariantViolation("make_query called before initialize()".into()));
        }
        let mut taxa = Vec::new();
        if let Some(metas) = self.super_archetypes.get(archetype.0 as usize) {
            for &meta in metas {
                if let Some(list) = self.taxa_by_meta.get(&meta) {
                    taxa.extend(list.iter().copied());
                }
            }
        }
        taxa.sort();
        taxa.dedup();
        Ok(Query::new(taxa))
    }

    pub fn make_query_filtered(&self, archetype: ArchetypeIndex, filters: &[FilterInstanceIndex]) -> Result<Query> {
        if !self.initialized {
            return Err(EcsError::InvariantViolation("make_query called before initialize()".into()));
        }
        let mut wanted: Vec<FilterInstanceIndex> = filters.to_vec();
        wanted.sort();
        wanted.dedup();

        let Some(&combo) = self.filter_combo_reverse.get(&wanted) else {
            return Ok(Query::new(Vec::new()));
        };

        let mut candidates = vec![combo];
        if let Some(supersets) = self.super_filters.get(&combo) {
            candidates.extend(supersets.iter().copied());
        }

        let mut taxa = Vec::new();
        if let Some(metas) = self.super_archetypes.get(archetype.0 as usize) {
            for &meta in metas {
                for &c in &candidates {
                    if let Some(&taxon) = self.taxon_lookup.get(&(meta, c)) {
                        taxa.push(taxon);
                    }
                }
            }
        }
        taxa.sort();
        taxa.dedup();
        Ok(Query::new(taxa))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position(f32, f32);
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity(f32, f32);

    fn new_world() -> World {
        World::new(WorldConfig::default())
    }

    #[test]
    fn create_entity_before_initialize_is_fatal() {
        let mut world = new_world();
        assert!(world.create_entity(false).is_err());
    }

    #[test]
    fn declaring_archetype_after_initialize_is_fatal() {
        let mut world = new_world();
        world.initialize().unwrap();
        assert!(world.add_archetype(&[], &[]).is_err());
    }

    #[test]
    fn single_archetype_round_trip() {
        let mut world = new_world();
        let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
        world.register_pool(pos_id, DataPool::<Position>::new());
        let arch = world.add_archetype(&[pos_id], &[]).unwrap();
        world.initialize().unwrap();

        let e = world.create_entity(false).unwrap();
        world.attach_data(pos_id, e, Position(1.0, 2.0));
        world.process_component_changes().unwrap();

        let query = world.make_query(arch).unwrap();
        assert_eq!(query.taxa().len(), 1);
        let pool = world.pool::<DataPool<Position>>(pos_id);
        let taxon = query.taxa()[0];
        assert_eq!(pool.slice(taxon), &[Position(1.0, 2.0)]);
    }

    #[test]
    fn overlapping_archetypes_share_a_meta_archetype() {
        let mut world = new_world();
        let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
        let vel_id = world.register_component_type::<Velocity>(ComponentKind::Data);
        world.register_pool(pos_id, DataPool::<Position>::new());
        world.register_pool(vel_id, DataPool::<Velocity>::new());
        let moving = world.add_archetype(&[pos_id, vel_id], &[]).unwrap();
        let positioned = world.add_archetype(&[pos_id], &[]).unwrap();
        world.initialize().unwrap();

        let e1 = world.create_entity(false).unwrap();
        world.attach_data(pos_id, e1, Position(0.0, 0.0));
        world.attach_data(vel_id, e1, Velocity(1.0, 1.0));
        let e2 = world.create_entity(false).unwrap();
        world.attach_data(pos_id, e2, Position(5.0, 5.0));
        world.process_component_changes().unwrap();

        let moving_taxa = world.make_query(moving).unwrap();
        let positioned_taxa = world.make_query(positioned).unwrap();
        // e1 has both components and belongs to a meta-archetype that
        // satisfies both archetype queries; e2 has only Position.
        assert_eq!(moving_taxa.taxa().len(), 1);
        assert_eq!(positioned_taxa.taxa().len(), 1);
        assert_eq!(moving_taxa.taxa(), positioned_taxa.taxa());
    }

    #[test]
    fn unseen_filter_value_yields_empty_query() {
        let mut world = new_world();
        let team_id = world.register_component_type::<&'static str>(ComponentKind::Filter);
        world.register_pool(team_id, FilterPool::<&'static str>::new());
        let arch = world.add_archetype(&[], &[team_id]).unwrap();
        world.initialize().unwrap();

        let result = world.make_query_filtered(arch, &[FilterInstanceIndex::new(team_id, 0)]).unwrap();
        assert!(result.taxa().is_empty());
    }

    #[test]
    fn filtered_query_finds_supersets_interned_before_the_subset() {
        // {red,female} is interned (via e2) before {red} (via e1), so the
        // superset bookkeeping must record the {red} -> {red,female} edge
        // when the *smaller* combination is the one newly interned, not
        // only when a superset arrives after its subset already exists.
        let mut world = new_world();
        let color_id = world.register_component_type::<&'static str>(ComponentKind::Filter);
        let gender_id = world.register_component_type::<&'static str>(ComponentKind::Filter);
        world.register_pool(color_id, FilterPool::<&'static str>::new());
        world.register_pool(gender_id, FilterPool::<&'static str>::new());
        let arch = world.add_archetype(&[], &[color_id, gender_id]).unwrap();
        world.initialize().unwrap();

        let e2 = world.create_entity(false).unwrap();
        world.attach_filter(color_id, e2, "red");
        world.attach_filter(gender_id, e2, "female");
        let e1 = world.create_entity(false).unwrap();
        world.attach_filter(color_id, e1, "red");
        world.process_component_changes().unwrap();

        let query = world.make_query_filtered(arch, &[FilterInstanceIndex::new(color_id, 0)]).unwrap();
        assert_eq!(query.taxa().len(), 2);
    }

    #[test]
    fn named_prototype_lookup_is_fatal_without_registration() {
        let mut world = new_world();
        world.initialize().unwrap();
        assert!(matches!(world.named_prototype("hero"), Err(EcsError::MissingLookup(_))));
    }

    #[test]
    fn named_prototype_or_load_constructs_once_then_reuses() {
        let mut world = new_world();
        let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
        world.register_pool(pos_id, DataPool::<Position>::new());
        world.add_archetype(&[pos_id], &[]).unwrap();
        world.initialize().unwrap();

        let mut loads = 0;
        let first = world
            .named_prototype_or_load("hero", |w| {
                loads += 1;
                let p = w.create_entity(true)?;
                w.attach_data(pos_id, p, Position(1.0, 1.0));
                Ok(p)
            })
            .unwrap();
        let second = world
            .named_prototype_or_load("hero", |_| panic!("loader must not run twice"))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(loads, 1);
        assert_eq!(world.named_prototype("hero").unwrap(), first);
    }

    #[test]
    fn destroy_frees_components_then_recycles_id() {
        let mut world = new_world();
        let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
        world.register_pool(pos_id, DataPool::<Position>::new());
        world.add_archetype(&[pos_id], &[]).unwrap();
        world.initialize().unwrap();

        let e = world.create_entity(false).unwrap();
        world.attach_data(pos_id, e, Position(1.0, 1.0));
        world.process_component_changes().unwrap();
        world.destroy_now(e);
        assert!(!world.is_alive(e));
        assert_eq!(world.pool::<DataPool<Position>>(pos_id).get(e), None);
    }
}
