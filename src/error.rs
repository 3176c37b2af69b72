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

//! Error types
//!
//! Recoverable conditions (an unseen filter value at query time) surface as
//! empty results, not as `EcsError`. Everything in this enum is categorical:
//! the call that produced it should be treated as having left whatever it
//! was touching in an unspecified state.

use std::fmt;

/// ECS error type
#[derive(Debug, Clone)]
pub enum EcsError {
    /// An invariant the engine relies on was violated by the caller, e.g.
    /// declaring an archetype after `initialize()`, creating an entity
    /// before `initialize()`, or destroying a component that doesn't exist.
    InvariantViolation(String),

    /// The 31-bit entity id space has been exhausted.
    EntityCapacityExhausted,

    /// A programmer contract was broken: double-adding a component type to
    /// the same entity, calling `update_taxon` on a prototype, and similar.
    ContractViolation(String),

    /// A named lookup in a registry missed and no fallback loader was
    /// configured (or the loader itself failed).
    MissingLookup(String),

    /// A scheduled system's `update_to` exceeded the configured iteration
    /// guard without draining its queue; almost always a feedback loop.
    RunawayScheduler { system: &'static str, limit: u32 },

    /// `pop`/`peek`/`top_priority` called on an empty `PriorityQueue`.
    EmptyPriorityQueue,

    /// Serialization of a pool or world snapshot failed.
    SerializationError(String),

    /// Deserialization of a pool or world snapshot failed.
    DeserializationError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
            EcsError::EntityCapacityExhausted => {
                write!(f, "entity id space exhausted (31-bit ceiling reached)")
            }
            EcsError::ContractViolation(msg) => write!(f, "contract violation: {msg}"),
            EcsError::MissingLookup(msg) => write!(f, "missing lookup: {msg}"),
            EcsError::RunawayScheduler { system, limit } => write!(
                f,
                "scheduled system '{system}' exceeded {limit} iterations in a single update_to call"
            ),
            EcsError::EmptyPriorityQueue => write!(f, "priority queue operation on an empty queue"),
            EcsError::SerializationError(msg) => write!(f, "serialization error: {msg}"),
            EcsError::DeserializationError(msg) => write!(f, "deserialization error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_nonempty() {
        let errs = [
            EcsError::InvariantViolation("x".into()),
            EcsError::EntityCapacityExhausted,
            EcsError::ContractViolation("x".into()),
            EcsError::MissingLookup("x".into()),
            EcsError::RunawayScheduler { system: "physics", limit: 10_000 },
            EcsError::EmptyPriorityQueue,
            EcsError::SerializationError("x".into()),
            EcsError::DeserializationError("x".into()),
        ];
        for e in errs {
            assert!(!e.to_string().is_empty());
        }
    }
}
