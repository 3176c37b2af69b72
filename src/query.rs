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

//! A compiled query: the ordered set of taxa a [`crate::world::World`]
//! decided satisfy an archetype (and, optionally, a filter combination).
//! Compilation happens once in `World::make_query`/`make_query_filtered`;
//! this type is just the resulting handle pools iterate against.

use crate::archetype::TaxonId;

/// The deduplicated, sorted set of taxa matching one archetype query.
/// Iterating `taxa()` and calling a pool's `entities_in`/`slice` per taxon
/// is the standard way to walk a query's results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    taxa: Vec<TaxonId>,
}

impl Query {
    pub(crate) fn new(taxa: Vec<TaxonId>) -> Self {
        Self { taxa }
    }

    pub fn taxa(&self) -> &[TaxonId] {
        &self.taxa
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaxonId> {
        self.taxa.iter()
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = &'a TaxonId;
    type IntoIter = std::slice::Iter<'a, TaxonId>;

    fn into_iter(self) -> Self::IntoIter {
        self.taxa.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_taxa() {
        let q = Query::default();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn iterates_in_construction_order() {
        let q = Query::new(vec![TaxonId(2), TaxonId(5)]);
        let collected: Vec<TaxonId> = q.iter().copied().collect();
        assert_eq!(collected, vec![TaxonId(2), TaxonId(5)]);
    }
}
