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

//! Component type identity and the packed index addressing a component
//! record inside a pool.

/// Marker trait for values storable in a pool. Flat value types only: no
/// owned pointers, since pool storage is bulk-copied.
pub trait Component: 'static + Send + Sync {}
impl<T: 'static + Send + Sync> Component for T {}

/// The three disjoint kinds of component a [`ComponentTypeId`] can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Plain value, stored in a [`crate::data_pool::DataPool`].
    Data,
    /// Variable-length sequence, stored in a [`crate::list_pool::ListPool`].
    List,
    /// Exact-match discriminator, stored in a [`crate::filter_pool::FilterPool`].
    Filter,
}

/// An interned type identity: a stable 16-bit index into the world's
/// component type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u16);

const TAXON_BITS: u32 = 12;
const ENTRY_BITS: u32 = 20;
const ENTRY_MASK: u32 = (1 << ENTRY_BITS) - 1;

/// `(taxon_id: 12 bits, entry: 20 bits)` packed into a `u32`, addressing a
/// component record inside a pool. Invalidated by removal, migration, or a
/// filter change on the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentIndex(u32);

impl ComponentIndex {
    pub const NULL: ComponentIndex = ComponentIndex(0);

    pub fn new(taxon_id: u16, entry: u32) -> Self {
        debug_assert!((taxon_id as u32) < (1 << TAXON_BITS), "taxon id overflowed 12 bits");
        debug_assert!(entry <= ENTRY_MASK, "entry overflowed 20 bits");
        ComponentIndex(((taxon_id as u32) << ENTRY_BITS) | (entry & ENTRY_MASK))
    }

    pub fn taxon_id(self) -> u16 {
        (self.0 >> ENTRY_BITS) as u16
    }

    pub fn entry(self) -> u32 {
        self.0 & ENTRY_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks() {
        let idx = ComponentIndex::new(17, 123_456);
        assert_eq!(idx.taxon_id(), 17);
        assert_eq!(idx.entry(), 123_456);
    }

    #[test]
    fn null_is_zero() {
        assert_eq!(ComponentIndex::NULL.taxon_id(), 0);
        assert_eq!(ComponentIndex::NULL.entry(), 0);
    }
}
