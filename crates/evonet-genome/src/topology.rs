// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! The mutable topology graph for one network.
//!
//! A [`TopologyScope`] owns flat arenas of layers, neurons and synapses;
//! all cross-references are ids into those arenas, never live references.
//! Layers are ordered by depth (0 = input, last = output), neurons within
//! a layer by height. Synapses are indexed three ways - outgoing list per
//! source, `(source, target)` pair map for existence checks, and the
//! inverse `target -> source` map - and the indexes stay consistent under
//! every add/remove.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use evonet_config::EvonetConfig;

use crate::registry::{ObjectKind, Registry};
use crate::{random, GenomeError, GenomeResult};

/// Layer identity within one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Neuron identity within one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeuronId(pub u64);

/// Synapse identity within one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SynapseId(pub u64);

/// One neuron: a bounded bias plus the cached reachability sets.
///
/// `inlet` holds the input-layer neurons that can reach this neuron,
/// `outlet` the output-layer neurons it can reach. Both are recomputed by
/// [`crate::reachability::update_reachability`]; a neuron with an empty
/// outlet set is dead code.
#[derive(Debug, Clone)]
pub struct Neuron {
    id: NeuronId,
    pub(crate) bias: f64,
    pub(crate) inlet: AHashSet<NeuronId>,
    pub(crate) outlet: AHashSet<NeuronId>,
}

impl Neuron {
    pub fn id(&self) -> NeuronId {
        self.id
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn inlet(&self) -> &AHashSet<NeuronId> {
        &self.inlet
    }

    pub fn outlet(&self) -> &AHashSet<NeuronId> {
        &self.outlet
    }
}

/// One directed synapse with a bounded weight.
#[derive(Debug, Clone)]
pub struct Synapse {
    id: SynapseId,
    source: NeuronId,
    target: NeuronId,
    pub(crate) weight: f64,
}

impl Synapse {
    pub fn id(&self) -> SynapseId {
        self.id
    }

    pub fn source(&self) -> NeuronId {
        self.source
    }

    pub fn target(&self) -> NeuronId {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// The shared mutable state for one network's topology.
#[derive(Debug, Clone)]
pub struct TopologyScope {
    config: Arc<EvonetConfig>,
    registry: Registry,

    layers: Vec<LayerId>,
    layer_neurons: AHashMap<LayerId, Vec<NeuronId>>,
    neurons: AHashMap<NeuronId, Neuron>,

    synapses: AHashMap<SynapseId, Synapse>,
    outgoing: AHashMap<NeuronId, Vec<SynapseId>>,
    pairs: AHashMap<(NeuronId, NeuronId), SynapseId>,
    incoming: AHashMap<NeuronId, AHashMap<NeuronId, SynapseId>>,
}

impl TopologyScope {
    pub fn new(config: Arc<EvonetConfig>) -> Self {
        Self {
            config,
            registry: Registry::new(),
            layers: Vec::new(),
            layer_neurons: AHashMap::new(),
            neurons: AHashMap::new(),
            synapses: AHashMap::new(),
            outgoing: AHashMap::new(),
            pairs: AHashMap::new(),
            incoming: AHashMap::new(),
        }
    }

    pub fn config(&self) -> &EvonetConfig {
        &self.config
    }

    /// Dynamic mode: no pinned hidden-layer sizes, structural mutation of
    /// interior layers is permitted.
    pub fn is_dynamic(&self) -> bool {
        self.config.network.hidden.is_none()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    /// Neuron ids at `depth` in height order; empty for an out-of-range
    /// depth.
    pub fn neuron_ids(&self, depth: usize) -> &[NeuronId] {
        self.layers
            .get(depth)
            .and_then(|layer| self.layer_neurons.get(layer))
            .map_or(&[], |ids| ids.as_slice())
    }

    pub fn neuron(&self, id: NeuronId) -> GenomeResult<&Neuron> {
        self.neurons.get(&id).ok_or(GenomeError::UnknownNeuron(id.0))
    }

    pub fn synapse(&self, id: SynapseId) -> GenomeResult<&Synapse> {
        self.synapses
            .get(&id)
            .ok_or(GenomeError::UnknownSynapse(id.0))
    }

    /// `(depth, height)` address of a neuron.
    pub fn locate(&self, id: NeuronId) -> Option<(usize, usize)> {
        for (depth, layer) in self.layers.iter().enumerate() {
            if let Some(ids) = self.layer_neurons.get(layer) {
                if let Some(height) = ids.iter().position(|n| *n == id) {
                    return Some((depth, height));
                }
            }
        }
        None
    }

    /// Neuron id at a `(depth, height)` address.
    pub fn neuron_at(&self, depth: usize, height: usize) -> GenomeResult<NeuronId> {
        let ids = self
            .layers
            .get(depth)
            .and_then(|layer| self.layer_neurons.get(layer))
            .ok_or(GenomeError::DepthOutOfRange {
                depth,
                layers: self.layers.len(),
            })?;
        ids.get(height).copied().ok_or(GenomeError::HeightOutOfRange {
            height,
            size: ids.len(),
        })
    }

    /// Outgoing synapses of a neuron, in insertion order.
    pub fn outgoing(&self, id: NeuronId) -> &[SynapseId] {
        self.outgoing.get(&id).map_or(&[], |ids| ids.as_slice())
    }

    /// Incoming synapses of a neuron as `(source, synapse)` pairs.
    pub fn incoming(&self, id: NeuronId) -> impl Iterator<Item = (NeuronId, SynapseId)> + '_ {
        self.incoming
            .get(&id)
            .into_iter()
            .flat_map(|map| map.iter().map(|(source, synapse)| (*source, *synapse)))
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    // ------------------------------------------------------------------
    // Structural operations
    // ------------------------------------------------------------------

    /// Insert a layer at `depth`, shifting deeper layers down.
    pub fn add_layer(&mut self, depth: usize) -> GenomeResult<LayerId> {
        if depth > self.layers.len() {
            return Err(GenomeError::DepthOutOfRange {
                depth,
                layers: self.layers.len(),
            });
        }
        let id = LayerId(self.registry.add(ObjectKind::Layer));
        self.layers.insert(depth, id);
        self.layer_neurons.insert(id, Vec::new());
        Ok(id)
    }

    /// Insert a neuron at `(depth, height)` with a bias sampled from the
    /// configured range, shifting taller neurons up.
    pub fn add_neuron(&mut self, depth: usize, height: usize) -> GenomeResult<NeuronId> {
        let layer = *self.layers.get(depth).ok_or(GenomeError::DepthOutOfRange {
            depth,
            layers: self.layers.len(),
        })?;
        let ids = self
            .layer_neurons
            .get_mut(&layer)
            .ok_or(GenomeError::UnknownLayer(layer.0))?;
        if height > ids.len() {
            return Err(GenomeError::HeightOutOfRange {
                height,
                size: ids.len(),
            });
        }

        let id = NeuronId(self.registry.add(ObjectKind::Neuron));
        ids.insert(height, id);
        self.neurons.insert(
            id,
            Neuron {
                id,
                bias: random::uniform_in(&self.config.neuron.bias),
                inlet: AHashSet::new(),
                outlet: AHashSet::new(),
            },
        );
        Ok(id)
    }

    /// Add a directed synapse with a weight sampled from the configured
    /// range. Self-loops and duplicate `(source, target)` pairs are
    /// rejected.
    pub fn add_synapse(&mut self, source: NeuronId, target: NeuronId) -> GenomeResult<SynapseId> {
        if source == target {
            return Err(GenomeError::SelfSynapse(source.0));
        }
        if !self.neurons.contains_key(&source) {
            return Err(GenomeError::UnknownNeuron(source.0));
        }
        if !self.neurons.contains_key(&target) {
            return Err(GenomeError::UnknownNeuron(target.0));
        }
        if self.pairs.contains_key(&(source, target)) {
            return Err(GenomeError::DuplicateSynapse {
                source_id: source.0,
                target_id: target.0,
            });
        }

        let id = SynapseId(self.registry.add(ObjectKind::Synapse));
        self.synapses.insert(
            id,
            Synapse {
                id,
                source,
                target,
                weight: random::uniform_in(&self.config.synapse.weight),
            },
        );
        self.outgoing.entry(source).or_default().push(id);
        self.pairs.insert((source, target), id);
        self.incoming.entry(target).or_default().insert(source, id);
        Ok(id)
    }

    /// Remove a synapse from all three indexes.
    pub fn remove_synapse(&mut self, id: SynapseId) -> GenomeResult<()> {
        let synapse = self
            .synapses
            .remove(&id)
            .ok_or(GenomeError::UnknownSynapse(id.0))?;
        if let Some(list) = self.outgoing.get_mut(&synapse.source) {
            list.retain(|s| *s != id);
        }
        self.pairs.remove(&(synapse.source, synapse.target));
        if let Some(sources) = self.incoming.get_mut(&synapse.target) {
            sources.remove(&synapse.source);
        }
        self.registry.erase(ObjectKind::Synapse, id.0);
        Ok(())
    }

    /// Remove a neuron together with every synapse touching it.
    pub fn remove_neuron(&mut self, id: NeuronId) -> GenomeResult<()> {
        if !self.neurons.contains_key(&id) {
            return Err(GenomeError::UnknownNeuron(id.0));
        }

        let attached: Vec<SynapseId> = self
            .outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .copied()
            .chain(
                self.incoming
                    .get(&id)
                    .into_iter()
                    .flat_map(|m| m.values().copied()),
            )
            .collect();
        for synapse in attached {
            self.remove_synapse(synapse)?;
        }
        self.outgoing.remove(&id);
        self.incoming.remove(&id);

        for ids in self.layer_neurons.values_mut() {
            if let Some(pos) = ids.iter().position(|n| *n == id) {
                ids.remove(pos);
                break;
            }
        }
        self.neurons.remove(&id);
        self.registry.erase(ObjectKind::Neuron, id.0);
        Ok(())
    }

    /// Remove the layer at `depth` together with its neurons.
    pub fn remove_layer(&mut self, depth: usize) -> GenomeResult<()> {
        let layer = *self.layers.get(depth).ok_or(GenomeError::DepthOutOfRange {
            depth,
            layers: self.layers.len(),
        })?;
        let ids = self.layer_neurons.get(&layer).cloned().unwrap_or_default();
        for id in ids {
            self.remove_neuron(id)?;
        }
        self.layers.remove(depth);
        self.layer_neurons.remove(&layer);
        self.registry.erase(ObjectKind::Layer, layer.0);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Numeric operations
    // ------------------------------------------------------------------

    /// Set a bias exactly; a value outside the configured range is a
    /// structural error, not clamped.
    pub fn set_bias(&mut self, id: NeuronId, bias: f64) -> GenomeResult<()> {
        let range = self.config.neuron.bias;
        if !range.contains(bias) {
            return Err(GenomeError::OutOfBounds {
                value: bias,
                min: range.min,
                max: range.max,
            });
        }
        self.neurons
            .get_mut(&id)
            .ok_or(GenomeError::UnknownNeuron(id.0))?
            .bias = bias;
        Ok(())
    }

    /// Perturb a bias, clamping into the configured range (by contract,
    /// perturbation is the one place clamping is correct).
    pub fn perturb_bias(&mut self, id: NeuronId, delta: f64) -> GenomeResult<f64> {
        let range = self.config.neuron.bias;
        let neuron = self
            .neurons
            .get_mut(&id)
            .ok_or(GenomeError::UnknownNeuron(id.0))?;
        neuron.bias = range.clamp(neuron.bias + delta);
        Ok(neuron.bias)
    }

    /// Set a weight exactly; out-of-range values are rejected.
    pub fn set_weight(&mut self, id: SynapseId, weight: f64) -> GenomeResult<()> {
        let range = self.config.synapse.weight;
        if !range.contains(weight) {
            return Err(GenomeError::OutOfBounds {
                value: weight,
                min: range.min,
                max: range.max,
            });
        }
        self.synapses
            .get_mut(&id)
            .ok_or(GenomeError::UnknownSynapse(id.0))?
            .weight = weight;
        Ok(())
    }

    /// Perturb a weight, clamping into the configured range.
    pub fn perturb_weight(&mut self, id: SynapseId, delta: f64) -> GenomeResult<f64> {
        let range = self.config.synapse.weight;
        let synapse = self
            .synapses
            .get_mut(&id)
            .ok_or(GenomeError::UnknownSynapse(id.0))?;
        synapse.weight = range.clamp(synapse.weight + delta);
        Ok(synapse.weight)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Drop every layer, neuron and synapse. Registry counters are kept,
    /// so rebuilt entities get fresh ids.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.layer_neurons.clear();
        self.neurons.clear();
        self.synapses.clear();
        self.outgoing.clear();
        self.pairs.clear();
        self.incoming.clear();
        self.registry.erase_kind(ObjectKind::Layer);
        self.registry.erase_kind(ObjectKind::Neuron);
        self.registry.erase_kind(ObjectKind::Synapse);
    }

    /// Build the initial topology: depth 0 with `inputs` neurons, pinned
    /// hidden layers when configured (static mode), then the output layer
    /// with `outputs` neurons.
    pub fn initialize(&mut self) -> GenomeResult<()> {
        self.clear();

        let inputs = self.config.network.inputs;
        let outputs = self.config.network.outputs;
        let hidden = self.config.network.hidden.clone();

        let mut depth = 0;
        self.add_layer(depth)?;
        for height in 0..inputs {
            self.add_neuron(depth, height)?;
        }

        if let Some(hidden) = hidden {
            for size in hidden {
                depth += 1;
                self.add_layer(depth)?;
                for height in 0..size {
                    self.add_neuron(depth, height)?;
                }
            }
        }

        depth += 1;
        self.add_layer(depth)?;
        for height in 0..outputs {
            self.add_neuron(depth, height)?;
        }
        Ok(())
    }

    /// Deep-copy another scope's layers, neurons (bias) and synapses
    /// (weight), preserving depth/height addressing. All entities get
    /// fresh ids from this scope's registry.
    pub fn clone_from(&mut self, other: &TopologyScope) -> GenomeResult<()> {
        self.clear();

        let mut mapping: AHashMap<NeuronId, NeuronId> = AHashMap::new();
        for depth in 0..other.layer_count() {
            self.add_layer(depth)?;
            for (height, old_id) in other.neuron_ids(depth).iter().enumerate() {
                let new_id = self.add_neuron(depth, height)?;
                self.set_bias(new_id, other.neuron(*old_id)?.bias())?;
                mapping.insert(*old_id, new_id);
            }
        }

        for depth in 0..other.layer_count() {
            for old_source in other.neuron_ids(depth).iter() {
                for synapse_id in other.outgoing(*old_source).to_vec() {
                    let synapse = other.synapse(synapse_id)?;
                    let source = mapping[&synapse.source()];
                    let target = mapping[&synapse.target()];
                    let new_id = self.add_synapse(source, target)?;
                    self.set_weight(new_id, synapse.weight())?;
                }
            }
        }
        Ok(())
    }

    /// Clone into a brand-new scope whose ids are disjoint from this
    /// one's: the child inherits this scope's id counters, so every
    /// copied entity gets an id this scope never used.
    pub fn deep_clone(&self) -> GenomeResult<TopologyScope> {
        let mut child = TopologyScope::new(self.config.clone());
        child.registry = self.registry.clone();
        child.registry.erase_kind(ObjectKind::Layer);
        child.registry.erase_kind(ObjectKind::Neuron);
        child.registry.erase_kind(ObjectKind::Synapse);
        child.clone_from(self)?;
        Ok(child)
    }

    pub(crate) fn neuron_mut(&mut self, id: NeuronId) -> GenomeResult<&mut Neuron> {
        self.neurons
            .get_mut(&id)
            .ok_or(GenomeError::UnknownNeuron(id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(inputs: usize, outputs: usize, hidden: Option<Vec<usize>>) -> TopologyScope {
        let config = Arc::new(EvonetConfig::new(inputs, outputs, hidden).unwrap());
        TopologyScope::new(config)
    }

    #[test]
    fn initialize_builds_configured_shape() {
        let mut s = scope(3, 2, Some(vec![4, 5]));
        s.initialize().unwrap();
        assert_eq!(s.layer_count(), 4);
        assert_eq!(s.neuron_ids(0).len(), 3);
        assert_eq!(s.neuron_ids(1).len(), 4);
        assert_eq!(s.neuron_ids(2).len(), 5);
        assert_eq!(s.neuron_ids(3).len(), 2);
    }

    #[test]
    fn initialize_without_hidden_is_two_layers() {
        let mut s = scope(2, 1, None);
        s.initialize().unwrap();
        assert_eq!(s.layer_count(), 2);
        assert_eq!(s.neuron_ids(0).len(), 2);
        assert_eq!(s.neuron_ids(1).len(), 1);
        assert!(s.is_dynamic());
    }

    #[test]
    fn sampled_biases_stay_in_range() {
        let mut s = scope(8, 8, None);
        s.initialize().unwrap();
        let range = s.config().neuron.bias;
        for depth in 0..s.layer_count() {
            for id in s.neuron_ids(depth).to_vec() {
                assert!(range.contains(s.neuron(id).unwrap().bias()));
            }
        }
    }

    #[test]
    fn self_synapse_is_rejected() {
        let mut s = scope(2, 1, None);
        s.initialize().unwrap();
        let n = s.neuron_at(0, 0).unwrap();
        assert_eq!(
            s.add_synapse(n, n),
            Err(GenomeError::SelfSynapse(n.0))
        );
    }

    #[test]
    fn duplicate_synapse_is_rejected() {
        let mut s = scope(2, 1, None);
        s.initialize().unwrap();
        let a = s.neuron_at(0, 0).unwrap();
        let b = s.neuron_at(1, 0).unwrap();
        s.add_synapse(a, b).unwrap();
        assert!(matches!(
            s.add_synapse(a, b),
            Err(GenomeError::DuplicateSynapse { .. })
        ));
        // the reverse direction is a different ordered pair
        assert!(s.add_synapse(b, a).is_ok());
    }

    #[test]
    fn duplicate_synapse_error_reports_both_endpoints() {
        let mut s = scope(2, 1, None);
        s.initialize().unwrap();
        let a = s.neuron_at(0, 0).unwrap();
        let b = s.neuron_at(1, 0).unwrap();
        s.add_synapse(a, b).unwrap();
        let err = s.add_synapse(a, b).unwrap_err();
        assert_eq!(
            err,
            GenomeError::DuplicateSynapse {
                source_id: a.0,
                target_id: b.0,
            }
        );
        assert_eq!(
            err.to_string(),
            format!("Synapse {} -> {} already exists", a.0, b.0)
        );
        // endpoint ids are plain payload, not a nested error cause
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn remove_neuron_cleans_all_synapse_indexes() {
        let mut s = scope(2, 2, None);
        s.initialize().unwrap();
        let a = s.neuron_at(0, 0).unwrap();
        let b = s.neuron_at(0, 1).unwrap();
        let out = s.neuron_at(1, 0).unwrap();
        s.add_synapse(a, out).unwrap();
        s.add_synapse(b, out).unwrap();
        s.add_synapse(out, a).unwrap();
        assert_eq!(s.synapse_count(), 3);

        s.remove_neuron(out).unwrap();
        assert_eq!(s.synapse_count(), 0);
        assert_eq!(s.neuron_ids(1).len(), 1);
        assert!(s.outgoing(a).is_empty());
        assert_eq!(s.incoming(a).count(), 0);
    }

    #[test]
    fn remove_layer_cascades() {
        let mut s = scope(1, 1, None);
        s.initialize().unwrap();
        s.add_layer(1).unwrap();
        let h = s.add_neuron(1, 0).unwrap();
        let input = s.neuron_at(0, 0).unwrap();
        let output = s.neuron_at(2, 0).unwrap();
        s.add_synapse(input, h).unwrap();
        s.add_synapse(h, output).unwrap();

        s.remove_layer(1).unwrap();
        assert_eq!(s.layer_count(), 2);
        assert_eq!(s.synapse_count(), 0);
        assert!(s.neuron(h).is_err());
    }

    #[test]
    fn set_bias_rejects_out_of_range() {
        let mut s = scope(1, 1, None);
        s.initialize().unwrap();
        let n = s.neuron_at(0, 0).unwrap();
        assert!(matches!(
            s.set_bias(n, 7.5),
            Err(GenomeError::OutOfBounds { .. })
        ));
        // perturbation clamps instead
        let clamped = s.perturb_bias(n, 100.0).unwrap();
        assert_eq!(clamped, s.config().neuron.bias.max);
    }

    #[test]
    fn clone_preserves_structure_with_fresh_ids() {
        let mut parent = scope(2, 1, None);
        parent.initialize().unwrap();
        let a = parent.neuron_at(0, 0).unwrap();
        let b = parent.neuron_at(0, 1).unwrap();
        let out = parent.neuron_at(1, 0).unwrap();
        let s1 = parent.add_synapse(a, out).unwrap();
        parent.set_weight(s1, 0.25).unwrap();
        parent.add_synapse(b, out).unwrap();

        let child = parent.deep_clone().unwrap();
        assert_eq!(child.layer_count(), parent.layer_count());
        assert_eq!(child.neuron_count(), parent.neuron_count());
        assert_eq!(child.synapse_count(), parent.synapse_count());

        // identical addressing, biases and weights
        for depth in 0..parent.layer_count() {
            for height in 0..parent.neuron_ids(depth).len() {
                let p = parent.neuron_at(depth, height).unwrap();
                let c = child.neuron_at(depth, height).unwrap();
                assert_eq!(
                    parent.neuron(p).unwrap().bias(),
                    child.neuron(c).unwrap().bias()
                );
            }
        }
        let child_a = child.neuron_at(0, 0).unwrap();
        let child_out = child.neuron_at(1, 0).unwrap();
        let (_, syn) = child
            .incoming(child_out)
            .find(|(src, _)| *src == child_a)
            .unwrap();
        assert_eq!(child.synapse(syn).unwrap().weight(), 0.25);

        // ids are disjoint from the parent's
        for depth in 0..child.layer_count() {
            for id in child.neuron_ids(depth) {
                assert!(parent.neuron(*id).is_err());
            }
        }
    }

    #[test]
    fn depth_and_height_bounds_are_enforced() {
        let mut s = scope(1, 1, None);
        s.initialize().unwrap();
        assert!(matches!(
            s.add_layer(5),
            Err(GenomeError::DepthOutOfRange { .. })
        ));
        assert!(matches!(
            s.add_neuron(0, 9),
            Err(GenomeError::HeightOutOfRange { .. })
        ));
        assert!(matches!(
            s.add_neuron(9, 0),
            Err(GenomeError::DepthOutOfRange { .. })
        ));
    }
}
