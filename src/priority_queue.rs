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

//! Min-heap priority queue used by the scheduler and available to user
//! scheduled systems for deadline-ordered work.

use crate::error::{EcsError, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Wraps `(payload, priority)` so that a std `BinaryHeap` (a max-heap) can be
/// used to implement min-heap ordering by priority.
#[derive(Debug)]
struct Entry<T> {
    payload: T,
    priority: f64,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest priority on top.
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
    }
}

/// Min-heap of `(payload, priority)` pairs, ordered so the lowest priority
/// (earliest deadline) is always at the top.
#[derive(Debug, Default)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    pub fn push(&mut self, payload: T, priority: f64) {
        self.heap.push(Entry { payload, priority });
    }

    pub fn peek(&self) -> Result<&T> {
        self.heap
            .peek()
            .map(|e| &e.payload)
            .ok_or(EcsError::EmptyPriorityQueue)
    }

    pub fn top_priority(&self) -> Result<f64> {
        self.heap
            .peek()
            .map(|e| e.priority)
            .ok_or(EcsError::EmptyPriorityQueue)
    }

    pub fn pop(&mut self) -> Result<T> {
        self.heap
            .pop()
            .map(|e| e.payload)
            .ok_or(EcsError::EmptyPriorityQueue)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_ascending_priority_order() {
        let mut q = PriorityQueue::new();
        q.push("c", 3.0);
        q.push("a", 1.0);
        q.push("b", 2.0);
        assert_eq!(q.pop().unwrap(), "a");
        assert_eq!(q.pop().unwrap(), "b");
        assert_eq!(q.pop().unwrap(), "c");
        assert!(q.is_empty());
    }

    #[test]
    fn empty_operations_are_fatal() {
        let q: PriorityQueue<i32> = PriorityQueue::new();
        assert!(q.peek().is_err());
        assert!(q.top_priority().is_err());
        let mut q2: PriorityQueue<i32> = PriorityQueue::new();
        assert!(q2.pop().is_err());
    }

    #[test]
    fn peek_does_not_remove() {
        let mut q = PriorityQueue::new();
        q.push(1, 1.0);
        assert_eq!(*q.peek().unwrap(), 1);
        assert_eq!(q.len(), 1);
    }
}
