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

//! Read/write views over pool payloads, bounded by the lifetime of the pool
//! borrow that produced them. These exist so query-driven iteration reads
//! like "get a slice, iterate position-parallel with the entity list"
//! instead of poking at pool internals directly.

use crate::archetype::TaxonId;
use crate::component::Component;
use crate::data_pool::DataPool;
use crate::entity::Entity;
use crate::filter_pool::FilterPool;
use crate::list_pool::ListPool;
use std::hash::Hash;

/// A single component value, borrowed from a [`DataPool`].
pub struct DataAccessor<'a, T> {
    value: &'a T,
}

impl<'a, T> DataAccessor<'a, T> {
    pub fn get(&self) -> &T {
        self.value
    }
}

impl<'a, T: Component + Clone> DataPool<T> {
    pub fn accessor(&'a self, entity: Entity) -> Option<DataAccessor<'a, T>> {
        self.get(entity).map(|value| DataAccessor { value })
    }
}

/// Position-parallel view over one taxon's entities and values in a
/// [`DataPool`].
pub struct DataTaxonSlice<'a, T> {
    pub entities: &'a [Entity],
    pub values: &'a [T],
}

impl<'a, T: Component + Clone> DataTaxonSlice<'a, T> {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }
}

impl<T: Component + Clone> DataPool<T> {
    pub fn taxon_slice(&self, taxon: TaxonId) -> DataTaxonSlice<'_, T> {
        DataTaxonSlice {
            entities: self.entities_in(taxon),
            values: self.slice(taxon),
        }
    }
}

#[cfg(feature = "parallel")]
impl<T: Component + Clone + Sync> DataPool<T> {
    /// Run `f` over every `(entity, value)` pair across `taxa`, one rayon
    /// task per taxon. Slices borrowed for the duration follow the same
    /// validity rule as [`DataPool::taxon_slice`]: no `add`/`destroy`/
    /// `update_taxon` on this pool may run concurrently with this call.
    pub fn par_for_each_taxon(&self, taxa: &[TaxonId], f: impl Fn(Entity, &T) + Sync) {
        use rayon::prelude::*;
        taxa.par_iter().for_each(|&taxon| {
            let slice = self.taxon_slice(taxon);
            for (entity, value) in slice.iter() {
                f(entity, value);
            }
        });
    }
}

/// Borrowed access to one entity's record in a [`ListPool`].
pub struct ListAccessor<'a, T: Component + Clone> {
    pool: &'a ListPool<T>,
    entity: Entity,
}

impl<'a, T: Component + Clone> ListAccessor<'a, T> {
    pub fn length(&self) -> usize {
        self.pool.length(self.entity)
    }

    pub fn read(&self, i: usize) -> &T {
        self.pool.read(self.entity, i)
    }

    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.pool.iter(self.entity)
    }
}

impl<T: Component + Clone> ListPool<T> {
    pub fn accessor(&self, entity: Entity) -> ListAccessor<'_, T> {
        ListAccessor { pool: self, entity }
    }
}

/// Position-parallel view over one taxon's filter ids and the pool's global
/// unique-value table, from a [`FilterPool`].
pub struct FilterTaxonSlice<'a, T> {
    pub entities: &'a [Entity],
    pub ids: &'a [u16],
    pub unique_values: &'a [T],
}

impl<'a, T> FilterTaxonSlice<'a, T> {
    pub fn value_of(&self, position: usize) -> &T {
        &self.unique_values[self.ids[position] as usize]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T: Component + Eq + Hash + Clone> FilterPool<T> {
    pub fn taxon_slice(&self, taxon: TaxonId) -> FilterTaxonSlice<'_, T> {
        let (ids, unique_values) = self.slice(taxon);
        FilterTaxonSlice {
            entities: self.entities_in(taxon),
            ids,
            unique_values,
        }
    }
}
