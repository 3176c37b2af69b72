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

//! Double-buffered, type-indexed event bus.
//!
//! Grounded in the teacher crate's type-erased, `TypeId`-keyed
//! `EventStorage`/`TypedEventQueue` pattern, generalized from "process
//! immediately" to "buffer until `swap_buffers`": emitters only ever see
//! `emit_buffer`, listeners only ever see `listen_buffer`, and the two are
//! exchanged in one place.

use crate::event::Event;
use std::any::{Any, TypeId};
use std::collections::HashMap;

trait EventStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn swap(&mut self);
    fn listen_len(&self) -> usize;
}

struct TypedEventQueue<E: Event> {
    listen_buffer: Vec<E>,
    emit_buffer: Vec<E>,
}

impl<E: Event> Default for TypedEventQueue<E> {
    fn default() -> Self {
        Self { listen_buffer: Vec::new(), emit_buffer: Vec::new() }
    }
}

impl<E: Event> EventStorage for TypedEventQueue<E> {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn swap(&mut self) {
        self.listen_buffer.clear();
        std::mem::swap(&mut self.listen_buffer, &mut self.emit_buffer);
        self.emit_buffer.clear();
    }
    fn listen_len(&self) -> usize {
        self.listen_buffer.len()
    }
}

/// Type-indexed double-buffered event queues. Events written by emitters
/// during a tick become visible to listeners only after [`EventBus::swap_buffers`].
#[derive(Default)]
pub struct EventBus {
    queues: HashMap<TypeId, Box<dyn EventStorage>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue_mut<E: Event>(&mut self) -> &mut TypedEventQueue<E> {
        self.queues
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(TypedEventQueue::<E>::default()))
            .as_any_mut()
            .downcast_mut::<TypedEventQueue<E>>()
            .expect("event queue type mismatch")
    }

    /// Write `event` to `E`'s emit buffer. Not visible to listeners until
    /// the next `swap_buffers`.
    pub fn emit<E: Event>(&mut self, event: E) {
        self.queue_mut::<E>().emit_buffer.push(event);
    }

    /// Read `E`'s listen buffer as populated by the most recent `swap_buffers`.
    pub fn listen<E: Event>(&self) -> &[E] {
        match self.queues.get(&TypeId::of::<E>()) {
            Some(storage) => &storage
                .as_any()
                .downcast_ref::<TypedEventQueue<E>>()
                .expect("event queue type mismatch")
                .listen_buffer,
            None => &[],
        }
    }

    /// Publish: clear `listen_buffer`, move `emit_buffer` into it, clear
    /// `emit_buffer`. The only moment events become observable.
    pub fn swap_buffers(&mut self) {
        for queue in self.queues.values_mut() {
            queue.swap();
        }
    }

    pub fn pending_listen_count<E: Event>(&self) -> usize {
        self.queues
            .get(&TypeId::of::<E>())
            .map(|q| q.listen_len())
            .unwrap_or(0)
    }
}

/// Thread-safe event sink for host-launched data-parallel taxon work
/// (`DataPool::par_for_each_taxon` and similar). `EventBus::emit` takes
/// `&mut self` and can't be called from inside a rayon closure; workers push
/// here instead, and the caller drains into the bus once back on the single
/// scheduling thread.
#[cfg(feature = "parallel")]
pub struct ParallelEventSink<E: Event> {
    pending: parking_lot::Mutex<Vec<E>>,
}

#[cfg(feature = "parallel")]
impl<E: Event> Default for ParallelEventSink<E> {
    fn default() -> Self {
        Self {
            pending: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(feature = "parallel")]
impl<E: Event> ParallelEventSink<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callable from any worker thread holding only `&self`.
    pub fn push(&self, event: E) {
        self.pending.lock().push(event);
    }

    /// Move every pushed event into `bus`'s emit buffer for `E`.
    pub fn drain_into(&self, bus: &mut EventBus) {
        for event in self.pending.lock().drain(..) {
            bus.emit(event);
        }
    }
}
