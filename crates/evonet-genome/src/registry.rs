// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-kind identity allocation.
//!
//! Every graph node (network, layer, neuron, synapse) carries a stable
//! integer id independent of its storage location. Ids are partitioned by
//! object kind; each partition holds a monotonic counter plus the set of
//! live ids. An id is valid for a kind iff it was added and not yet
//! erased, and is never reused while still live.

use ahash::{AHashMap, AHashSet};

/// Object kinds the registry partitions ids by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Network,
    Layer,
    Neuron,
    Synapse,
}

#[derive(Debug, Default, Clone)]
struct Partition {
    next: u64,
    live: AHashSet<u64>,
}

/// Id allocator, one per simulation run (network ids) and one per
/// topology scope (layer/neuron/synapse ids).
#[derive(Debug, Default, Clone)]
pub struct Registry {
    partitions: AHashMap<ObjectKind, Partition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for `kind`.
    pub fn add(&mut self, kind: ObjectKind) -> u64 {
        let partition = self.partitions.entry(kind).or_default();
        let id = partition.next;
        partition.next += 1;
        partition.live.insert(id);
        id
    }

    /// Whether `id` is currently live for `kind`.
    pub fn has(&self, kind: ObjectKind, id: u64) -> bool {
        self.partitions
            .get(&kind)
            .map_or(false, |p| p.live.contains(&id))
    }

    /// Release one id. Returns `false` if it was not live.
    pub fn erase(&mut self, kind: ObjectKind, id: u64) -> bool {
        self.partitions
            .get_mut(&kind)
            .map_or(false, |p| p.live.remove(&id))
    }

    /// Release every live id of one kind. The counter is not reset, so
    /// erased ids are never handed out again within the run.
    pub fn erase_kind(&mut self, kind: ObjectKind) {
        if let Some(partition) = self.partitions.get_mut(&kind) {
            partition.live.clear();
        }
    }

    /// Drop all partitions, counters included.
    pub fn clear(&mut self) {
        self.partitions.clear();
    }

    /// Number of live ids for `kind`.
    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.partitions.get(&kind).map_or(0, |p| p.live.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_per_kind() {
        let mut registry = Registry::new();
        assert_eq!(registry.add(ObjectKind::Neuron), 0);
        assert_eq!(registry.add(ObjectKind::Neuron), 1);
        // independent partition
        assert_eq!(registry.add(ObjectKind::Layer), 0);
        assert_eq!(registry.add(ObjectKind::Neuron), 2);
    }

    #[test]
    fn erased_ids_are_not_reused() {
        let mut registry = Registry::new();
        let a = registry.add(ObjectKind::Synapse);
        assert!(registry.erase(ObjectKind::Synapse, a));
        assert!(!registry.has(ObjectKind::Synapse, a));
        let b = registry.add(ObjectKind::Synapse);
        assert_ne!(a, b);
    }

    #[test]
    fn erase_kind_keeps_counter() {
        let mut registry = Registry::new();
        registry.add(ObjectKind::Network);
        registry.add(ObjectKind::Network);
        registry.erase_kind(ObjectKind::Network);
        assert_eq!(registry.live_count(ObjectKind::Network), 0);
        assert_eq!(registry.add(ObjectKind::Network), 2);
    }

    #[test]
    fn erase_unknown_id_is_false() {
        let mut registry = Registry::new();
        assert!(!registry.erase(ObjectKind::Layer, 7));
    }
}
