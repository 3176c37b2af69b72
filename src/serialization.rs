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

//! Snapshot hooks: byte-array encode/decode of a pool's taxon contents and
//! of world-level metadata. The engine produces and consumes opaque byte
//! arrays via `speedy`; it never touches a filesystem path or picks a
//! container format — that is the external collaborator's job.

use crate::archetype::TaxonId;
use crate::component::Component;
use crate::data_pool::DataPool;
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::filter_pool::FilterPool;
use crate::list_pool::ListPool;
use speedy::{LittleEndian, Readable, Writable};
use std::hash::Hash;

fn encode<T: Writable<LittleEndian>>(value: &T) -> Result<Vec<u8>> {
    value
        .write_to_vec()
        .map_err(|e| EcsError::SerializationError(e.to_string()))
}

fn decode<T: for<'a> Readable<'a, LittleEndian>>(bytes: &[u8]) -> Result<T> {
    T::read_from_buffer(bytes).map_err(|e| EcsError::DeserializationError(e.to_string()))
}

/// World-level metadata carried alongside every pool's snapshot: the entity
/// allocator's recycling state and the simulation clock.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Readable, Writable)]
pub struct WorldSnapshot {
    pub entities_bytes: Vec<u8>,
    pub next_free: u32,
    pub recycle_next: u32,
    pub sim_time: f64,
}

/// One pool's exported taxon contents: parallel `entities`/`components` byte
/// arrays, plus a kind-specific trailer (`filter_indices` for filter pools,
/// `element_counts` for list pools; empty for data pools).
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    pub entities: Vec<u8>,
    pub components: Vec<u8>,
    pub trailer: Vec<u8>,
}

impl<T> DataPool<T>
where
    T: Component + Clone + Writable<LittleEndian> + for<'a> Readable<'a, LittleEndian>,
{
    /// Export `taxon`'s entities and values as opaque byte arrays.
    pub fn export_taxon(&self, taxon: TaxonId) -> Result<PoolSnapshot> {
        let raw_entities: Vec<u32> = self.entities_in(taxon).iter().map(|e| e.raw()).collect();
        Ok(PoolSnapshot {
            entities: encode(&raw_entities)?,
            components: encode(&self.slice(taxon).to_vec())?,
            trailer: Vec::new(),
        })
    }

    /// Replay a taxon export, in original order, via `add`.
    pub fn import_taxon(&mut self, taxon: TaxonId, snapshot: &PoolSnapshot) -> Result<()> {
        let raw_entities: Vec<u32> = decode(&snapshot.entities)?;
        let values: Vec<T> = decode(&snapshot.components)?;
        for (raw, value) in raw_entities.into_iter().zip(values) {
            self.add(Entity::from_packed(raw), taxon, value);
        }
        Ok(())
    }
}

impl<T> ListPool<T>
where
    T: Component + Clone + Writable<LittleEndian> + for<'a> Readable<'a, LittleEndian>,
{
    /// Export `taxon`'s entities, flattened element values, and each
    /// entity's element count (the `element_counts` trailer needed to
    /// regroup elements back into per-entity lists on import).
    pub fn export_taxon(&self, taxon: TaxonId) -> Result<PoolSnapshot> {
        let entities = self.entities_in(taxon).to_vec();
        let raw_entities: Vec<u32> = entities.iter().map(|e| e.raw()).collect();
        let mut flattened = Vec::new();
        let mut counts = Vec::with_capacity(entities.len());
        for &entity in &entities {
            let len = self.length(entity);
            counts.push(len as u32);
            for i in 0..len {
                flattened.push(self.read(entity, i).clone());
            }
        }
        Ok(PoolSnapshot {
            entities: encode(&raw_entities)?,
            components: encode(&flattened)?,
            trailer: encode(&counts)?,
        })
    }

    pub fn import_taxon(&mut self, taxon: TaxonId, snapshot: &PoolSnapshot) -> Result<()> {
        let raw_entities: Vec<u32> = decode(&snapshot.entities)?;
        let flattened: Vec<T> = decode(&snapshot.components)?;
        let counts: Vec<u32> = decode(&snapshot.trailer)?;
        let mut cursor = 0usize;
        for (raw, count) in raw_entities.into_iter().zip(counts) {
            let entity = Entity::from_packed(raw);
            self.add(entity, taxon, count as usize);
            for _ in 0..count {
                self.append(entity, flattened[cursor].clone());
                cursor += 1;
            }
        }
        Ok(())
    }
}

impl<T> FilterPool<T>
where
    T: Component + Eq + Hash + Clone + Writable<LittleEndian> + for<'a> Readable<'a, LittleEndian>,
{
    /// Export `taxon`'s entities and each entity's current filter value
    /// (re-interned on import, not the raw local id, since the unique table
    /// is rebuilt from scratch by a fresh load).
    pub fn export_taxon(&self, taxon: TaxonId) -> Result<PoolSnapshot> {
        let entities = self.entities_in(taxon).to_vec();
        let raw_entities: Vec<u32> = entities.iter().map(|e| e.raw()).collect();
        let values: Vec<T> = entities
            .iter()
            .map(|&e| self.read(e).cloned().expect("entity listed in taxon must have a value"))
            .collect();
        Ok(PoolSnapshot {
            entities: encode(&raw_entities)?,
            components: encode(&values)?,
            trailer: Vec::new(),
        })
    }

    pub fn import_taxon(&mut self, taxon: TaxonId, snapshot: &PoolSnapshot) -> Result<()> {
        let raw_entities: Vec<u32> = decode(&snapshot.entities)?;
        let values: Vec<T> = decode(&snapshot.components)?;
        for (raw, value) in raw_entities.into_iter().zip(values) {
            self.add(Entity::from_packed(raw), taxon, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::TaxonId;

    #[derive(Debug, Clone, Copy, PartialEq, Readable, Writable)]
    struct Position(f32, f32);

    #[test]
    fn data_pool_round_trips_through_bytes() {
        let mut pool: DataPool<Position> = DataPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), Position(1.0, 2.0));

        let snapshot = pool.export_taxon(TaxonId(2)).unwrap();
        let mut restored: DataPool<Position> = DataPool::new();
        restored.import_taxon(TaxonId(2), &snapshot).unwrap();

        assert_eq!(restored.get(e), Some(&Position(1.0, 2.0)));
    }

    #[test]
    fn list_pool_round_trips_element_counts() {
        let mut pool: ListPool<u32> = ListPool::new();
        let e = Entity::from_raw_id(1, false);
        pool.add(e, TaxonId(2), 0);
        pool.append(e, 10);
        pool.append(e, 20);

        let snapshot = pool.export_taxon(TaxonId(2)).unwrap();
        let mut restored: ListPool<u32> = ListPool::new();
        restored.import_taxon(TaxonId(2), &snapshot).unwrap();

        assert_eq!(restored.length(e), 2);
        assert_eq!(*restored.read(e, 1), 20);
    }

    #[test]
    fn filter_pool_round_trips_values_not_local_ids() {
        let mut pool: FilterPool<u32> = FilterPool::new();
        let a = Entity::from_raw_id(1, false);
        let b = Entity::from_raw_id(2, false);
        pool.add(a, TaxonId(2), 7);
        pool.add(b, TaxonId(2), 7);

        let snapshot = pool.export_taxon(TaxonId(2)).unwrap();
        let mut restored: FilterPool<u32> = FilterPool::new();
        restored.import_taxon(TaxonId(2), &snapshot).unwrap();

        assert_eq!(restored.local_id(a), restored.local_id(b));
        assert_eq!(restored.read(a), Some(&7));
    }
}
