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

//! Append-only interning of a value type behind a stable 16-bit index, with
//! an optional name-based side table and a fallback loader invoked on a
//! name miss.
//!
//! Backs [`crate::world::World`]'s named-prototype table: a prototype
//! loader can register prototypes by name as it streams them in, and a
//! caller elsewhere can resolve one by name without holding onto the
//! `Entity` handle, optionally constructing it lazily on first use.

use crate::error::{EcsError, Result};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryIndex(pub u16);

#[derive(Debug, Default)]
pub struct Registry<T> {
    values: Vec<T>,
    by_name: FxHashMap<String, RegistryIndex>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self { values: Vec::new(), by_name: FxHashMap::default() }
    }

    /// Intern `value`, returning its stable index. Unnamed.
    pub fn insert(&mut self, value: T) -> RegistryIndex {
        let idx = RegistryIndex(self.values.len() as u16);
        self.values.push(value);
        idx
    }

    /// Intern `value` under `name`, overwriting any previous registration
    /// of that name (the previous index stays valid but is no longer
    /// name-addressable).
    pub fn insert_named(&mut self, name: impl Into<String>, value: T) -> RegistryIndex {
        let idx = self.insert(value);
        self.by_name.insert(name.into(), idx);
        idx
    }

    pub fn get(&self, idx: RegistryIndex) -> Option<&T> {
        self.values.get(idx.0 as usize)
    }

    pub fn get_named(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).and_then(|&idx| self.get(idx))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve `name`, calling `loader` to construct and register a fresh
    /// value the first time `name` is seen. Propagates the loader's error
    /// on failure; the name stays unregistered so a later call can retry.
    pub fn get_or_load(&mut self, name: &str, loader: impl FnOnce() -> Result<T>) -> Result<&T> {
        if !self.by_name.contains_key(name) {
            let value = loader()?;
            self.insert_named(name.to_string(), value);
        }
        Ok(self.get_named(name).expect("just inserted"))
    }

    /// Resolve `name` with no fallback: a miss is fatal.
    pub fn require_named(&self, name: &str) -> Result<&T> {
        self.get_named(name).ok_or_else(|| EcsError::MissingLookup(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_insert_roundtrips_by_index() {
        let mut reg: Registry<&'static str> = Registry::new();
        let idx = reg.insert("alpha");
        assert_eq!(reg.get(idx), Some(&"alpha"));
    }

    #[test]
    fn named_lookup_without_fallback_is_fatal_on_miss() {
        let reg: Registry<u32> = Registry::new();
        assert!(matches!(reg.require_named("ghost"), Err(EcsError::MissingLookup(_))));
    }

    #[test]
    fn fallback_loader_only_runs_once_per_name() {
        let mut reg: Registry<u32> = Registry::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = *reg
                .get_or_load("health", || {
                    calls += 1;
                    Ok(100)
                })
                .unwrap();
            assert_eq!(value, 100);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn failing_loader_leaves_name_unregistered() {
        let mut reg: Registry<u32> = Registry::new();
        assert!(reg.get_or_load("bad", || Err(EcsError::MissingLookup("bad".into()))).is_err());
        assert!(reg.get_named("bad").is_none());
    }
}
