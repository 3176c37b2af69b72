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

//! Archetype, meta-archetype, filter-combination and taxon data types, plus
//! the union-closure algorithm that derives the minimal meta-archetype
//! partition for an entity's component set.

use crate::bitset::BitSet;
use crate::component::ComponentTypeId;

/// A user-declared bag of component and filter types, interned at
/// registration time.
#[derive(Debug, Clone, Default)]
pub struct Archetype {
    pub components: BitSet,
    pub filters: BitSet,
}

impl Archetype {
    pub fn new(components: &[ComponentTypeId], filters: &[ComponentTypeId]) -> Self {
        let mut a = Archetype::default();
        for c in components {
            a.components.set(c.0 as usize);
        }
        for f in filters {
            a.filters.set(f.0 as usize);
        }
        a
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeIndex(pub u16);

/// An internally-derived union-closure of overlapping user archetypes. Every
/// component type an entity carries belongs to exactly one meta-archetype
/// (or the default one).
#[derive(Debug, Clone, Default)]
pub struct MetaArchetype {
    pub components: BitSet,
    pub filters: BitSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaArchetypeIndex(pub u16);

/// Index of the always-present default meta-archetype (components/filters
/// not covered by any declared archetype fall here).
pub const DEFAULT_META_ARCHETYPE: MetaArchetypeIndex = MetaArchetypeIndex(0);

/// An interned set of [`FilterInstanceIndex`]. The default combination (empty
/// set) is always index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FilterCombinationIndex(pub u32);

pub const DEFAULT_FILTER_COMBINATION: FilterCombinationIndex = FilterCombinationIndex(0);

/// `(component_type: 16 bits, local_id: 16 bits)` packed into a `u32`:
/// names a unique value interned by one [`crate::filter_pool::FilterPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterInstanceIndex(u32);

impl FilterInstanceIndex {
    pub fn new(component_type: ComponentTypeId, local_id: u16) -> Self {
        FilterInstanceIndex(((component_type.0 as u32) << 16) | local_id as u32)
    }

    pub fn component_type(self) -> ComponentTypeId {
        ComponentTypeId((self.0 >> 16) as u16)
    }

    pub fn local_id(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

/// A 16-bit taxon id naming a `(meta-archetype, filter-combination)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxonId(pub u16);

impl TaxonId {
    pub const NULL: TaxonId = TaxonId(0);
    pub const PROTOTYPE: TaxonId = TaxonId(1);
    pub const DEFAULT: TaxonId = TaxonId(2);
}

#[derive(Debug, Clone, Copy)]
pub struct Taxon {
    pub meta_archetype: MetaArchetypeIndex,
    pub filter_combination: FilterCombinationIndex,
}

/// Greedily merges archetype-shaped bags that share at least one component,
/// until no such pair remains. A subset relation (one bag's components
/// entirely contained in another's) still shares components with its
/// superset, so it merges too — the superset simply absorbs the subset's
/// filters, since its components were already covered. This yields the
/// minimal partition in which every component type belongs to exactly one
/// resulting bag — the core correctness-critical step of reconciliation
/// (spec step 3).
pub fn derive_meta_archetypes(matched: &[Archetype]) -> Vec<MetaArchetype> {
    let mut groups: Vec<MetaArchetype> = matched
        .iter()
        .map(|a| MetaArchetype {
            components: a.components.clone(),
            filters: a.filters.clone(),
        })
        .collect();

    loop {
        let mut merge_pair = None;
        'search: for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                let (a, b) = (&groups[i], &groups[j]);
                if a.components.intersects(&b.components) {
                    merge_pair = Some((i, j));
                    break 'search;
                }
            }
        }
        match merge_pair {
            Some((i, j)) => {
                let b = groups.remove(j);
                let a = &mut groups[i];
                a.components.union_with(&b.components);
                a.filters.union_with(&b.filters);
            }
            None => break,
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archetype(ids: &[u16]) -> Archetype {
        let types: Vec<ComponentTypeId> = ids.iter().map(|&i| ComponentTypeId(i)).collect();
        Archetype::new(&types, &[])
    }

    #[test]
    fn disjoint_archetypes_stay_separate() {
        let merged = derive_meta_archetypes(&[archetype(&[0]), archetype(&[1])]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn overlapping_archetypes_merge_transitively() {
        // {0,1} and {1,2} overlap on 1 -> merge into {0,1,2}; a third {5}
        // with no overlap stays separate.
        let merged = derive_meta_archetypes(&[archetype(&[0, 1]), archetype(&[1, 2]), archetype(&[5])]);
        assert_eq!(merged.len(), 2);
        let big = merged.iter().find(|m| m.components.len() == 3).unwrap();
        assert!(big.components.contains(0));
        assert!(big.components.contains(1));
        assert!(big.components.contains(2));
    }

    #[test]
    fn subset_archetypes_merge_into_the_superset() {
        // {0,1,2} is a superset of {0,1}; they share every component of the
        // smaller bag, so the closure merges them into a single group rather
        // than routing component 2 to one group and 0/1 to another.
        let merged = derive_meta_archetypes(&[archetype(&[0, 1]), archetype(&[0, 1, 2])]);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].components.contains(0));
        assert!(merged[0].components.contains(1));
        assert!(merged[0].components.contains(2));
    }

    #[test]
    fn filter_instance_index_roundtrips() {
        let fi = FilterInstanceIndex::new(ComponentTypeId(9), 42);
        assert_eq!(fi.component_type(), ComponentTypeId(9));
        assert_eq!(fi.local_id(), 42);
    }
}
