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

//! Array of owned, independently growable inner vectors, addressed by
//! `(outer, inner)` and capable of moving an entire inner list between
//! outer slots without touching its elements.
//!
//! Backs [`crate::list_pool::ListPool`]'s per-taxon storage: each outer
//! index is a taxon, each inner vector is one entity's list-valued
//! component.

#[derive(Debug, Clone)]
pub struct NestedList<T> {
    outer: Vec<Vec<Vec<T>>>,
}

impl<T> Default for NestedList<T> {
    fn default() -> Self {
        Self { outer: Vec::new() }
    }
}

impl<T> NestedList<T> {
    pub fn new() -> Self {
        Self { outer: Vec::new() }
    }

    fn ensure_outer(&mut self, outer: usize) {
        if outer >= self.outer.len() {
            self.outer.resize_with(outer + 1, Vec::new);
        }
    }

    /// Push a new, empty inner list at `outer`, returning its index within
    /// that outer slot.
    pub fn push_list(&mut self, outer: usize, initial_capacity: usize) -> usize {
        self.ensure_outer(outer);
        self.outer[outer].push(Vec::with_capacity(0));
        let inner_idx = self.outer[outer].len() - 1;
        if initial_capacity > 0 {
            self.outer[outer][inner_idx].reserve(initial_capacity);
        }
        inner_idx
    }

    pub fn len(&self, outer: usize, inner: usize) -> usize {
        self.outer[outer][inner].len()
    }

    pub fn get(&self, outer: usize, inner: usize, i: usize) -> &T {
        &self.outer[outer][inner][i]
    }

    pub fn get_mut(&mut self, outer: usize, inner: usize, i: usize) -> &mut T {
        &mut self.outer[outer][inner][i]
    }

    pub fn append(&mut self, outer: usize, inner: usize, value: T) {
        self.outer[outer][inner].push(value);
    }

    pub fn clear(&mut self, outer: usize, inner: usize) {
        self.outer[outer][inner].clear();
    }

    pub fn remove_at_swap_back(&mut self, outer: usize, inner: usize, i: usize) {
        self.outer[outer][inner].swap_remove(i);
    }

    pub fn iter(&self, outer: usize, inner: usize) -> std::slice::Iter<'_, T> {
        self.outer[outer][inner].iter()
    }

    /// Remove the inner list at `(outer, inner)` via swap-back, returning the
    /// owned list so the caller can re-seat it elsewhere without
    /// reallocating its contents. The slot previously occupied by the last
    /// inner list now lives at `inner`.
    pub fn take_swap_back(&mut self, outer: usize, inner: usize) -> Vec<T> {
        self.outer[outer].swap_remove(inner)
    }

    /// Re-seat a previously-taken inner list at a new outer slot, preserving
    /// its elements without copying them.
    pub fn put(&mut self, outer: usize, list: Vec<T>) -> usize {
        self.ensure_outer(outer);
        self.outer[outer].push(list);
        self.outer[outer].len() - 1
    }

    /// Number of inner lists currently held at `outer`.
    pub fn outer_len(&self, outer: usize) -> usize {
        self.outer.get(outer).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read_back() {
        let mut nl: NestedList<i32> = NestedList::new();
        let inner = nl.push_list(0, 0);
        nl.append(0, inner, 1);
        nl.append(0, inner, 2);
        assert_eq!(nl.len(0, inner), 2);
        assert_eq!(*nl.get(0, inner, 0), 1);
        assert_eq!(*nl.get(0, inner, 1), 2);
    }

    #[test]
    fn move_between_outer_slots_preserves_elements() {
        let mut nl: NestedList<i32> = NestedList::new();
        let inner = nl.push_list(0, 0);
        nl.append(0, inner, 10);
        nl.append(0, inner, 20);
        let moved = nl.take_swap_back(0, inner);
        let new_inner = nl.put(5, moved);
        assert_eq!(nl.len(5, new_inner), 2);
        assert_eq!(*nl.get(5, new_inner, 0), 10);
    }

    #[test]
    fn swap_back_remove_element() {
        let mut nl: NestedList<i32> = NestedList::new();
        let inner = nl.push_list(0, 0);
        nl.append(0, inner, 1);
        nl.append(0, inner, 2);
        nl.append(0, inner, 3);
        nl.remove_at_swap_back(0, inner, 0);
        assert_eq!(nl.len(0, inner), 2);
        assert_eq!(*nl.get(0, inner, 0), 3);
    }
}
