// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Topology-and-weight mutation ("evolve").
//!
//! Runs once per network per generation. Structural layer/neuron changes
//! only apply in dynamic mode; the input and output layers are never
//! touched and a network never drops below 2 layers. All count deltas use
//! the log-distributed sample `log_sample(add) - log_sample(remove)`: a
//! zero delta means no structural change that round, and removal counts
//! are clamped to availability. Candidate lists are snapshotted before
//! removal so the walk never iterates a container it is mutating.

use tracing::trace;

use crate::topology::TopologyScope;
use crate::{random, GenomeError, GenomeResult};

/// Mutate one topology in place.
pub fn mutate(scope: &mut TopologyScope) -> GenomeResult<()> {
    let config = scope.config().clone();
    let dynamic = scope.is_dynamic();

    // Layer count delta (dynamic mode only). New layers go to random
    // interior depths; removals pick random interior layers and stop
    // while at least the input and output layers remain.
    if dynamic {
        let delta = random::log_sample(config.mutate.layer.add_rate)
            - random::log_sample(config.mutate.layer.remove_rate);
        if delta > 0 {
            for _ in 0..delta {
                let depth = 1 + random::index(scope.layer_count() - 1);
                scope.add_layer(depth)?;
            }
        } else if delta < 0 {
            let count = ((-delta) as usize).min(scope.layer_count().saturating_sub(2));
            for _ in 0..count {
                let depth = 1 + random::index(scope.layer_count() - 2);
                scope.remove_layer(depth)?;
            }
        }
        if delta != 0 {
            trace!(delta, layers = scope.layer_count(), "layer mutation");
        }
    }

    let depth_max = scope.layer_count() - 1;
    for depth in 0..=depth_max {
        // Neuron count delta for interior layers; boundary layers keep
        // their fixed arity.
        if dynamic && depth != 0 && depth != depth_max {
            let delta = random::log_sample(config.mutate.neuron.add_rate)
                - random::log_sample(config.mutate.neuron.remove_rate);
            if delta > 0 {
                for _ in 0..delta {
                    let height = random::index(scope.neuron_ids(depth).len() + 1);
                    scope.add_neuron(depth, height)?;
                }
            } else if delta < 0 {
                let count = ((-delta) as usize).min(scope.neuron_ids(depth).len());
                for _ in 0..count {
                    let ids = scope.neuron_ids(depth);
                    let id = ids[random::index(ids.len())];
                    scope.remove_neuron(id)?;
                }
            }
        }

        let neuron_ids = scope.neuron_ids(depth).to_vec();
        for id in neuron_ids {
            // Bias perturbation, clamped into the configured range.
            if random::condition(config.mutate.neuron.change.rate) {
                let amount = config.mutate.neuron.change.amount;
                scope.perturb_bias(id, random::uniform(-amount, amount))?;
            }

            // Synapse count delta. Targets come from other layers only;
            // the direction across depths is unconstrained, so feedback
            // synapses can appear (liveness is reachability's problem,
            // not depth order's).
            let delta = random::log_sample(config.mutate.synapse.add_rate)
                - random::log_sample(config.mutate.synapse.remove_rate);
            if delta > 0 {
                for _ in 0..delta {
                    let mut other = random::index(scope.layer_count() - 1);
                    if other >= depth {
                        other += 1;
                    }
                    let targets = scope.neuron_ids(other);
                    if targets.is_empty() {
                        continue;
                    }
                    let target = targets[random::index(targets.len())];
                    match scope.add_synapse(id, target) {
                        Ok(_) => {}
                        // the pair already exists; counts clamp, no retry
                        Err(GenomeError::DuplicateSynapse { .. }) => {}
                        Err(e) => return Err(e),
                    }
                }
            } else if delta < 0 {
                let mut candidates = scope.outgoing(id).to_vec();
                let count = ((-delta) as usize).min(candidates.len());
                for _ in 0..count {
                    let pick = random::index(candidates.len());
                    scope.remove_synapse(candidates.swap_remove(pick))?;
                }
            }

            // Weight perturbation on incoming synapses past depth 0.
            if depth != 0 {
                let incoming: Vec<_> = scope.incoming(id).map(|(_, syn)| syn).collect();
                for synapse in incoming {
                    if random::condition(config.mutate.synapse.change.rate) {
                        let amount = config.mutate.synapse.change.amount;
                        scope.perturb_weight(synapse, random::uniform(-amount, amount))?;
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evonet_config::EvonetConfig;
    use std::sync::Arc;

    fn aggressive_config(hidden: Option<Vec<usize>>) -> Arc<EvonetConfig> {
        let mut config = EvonetConfig::new(3, 2, hidden).unwrap();
        config.mutate.layer.add_rate = 0.4;
        config.mutate.layer.remove_rate = 0.4;
        config.mutate.neuron.add_rate = 0.5;
        config.mutate.neuron.remove_rate = 0.5;
        config.mutate.neuron.change.rate = 0.9;
        config.mutate.synapse.add_rate = 0.6;
        config.mutate.synapse.remove_rate = 0.5;
        config.mutate.synapse.change.rate = 0.9;
        Arc::new(config)
    }

    fn check_invariants(scope: &TopologyScope) {
        assert!(scope.layer_count() >= 2);
        assert_eq!(scope.neuron_ids(0).len(), 3, "input arity changed");
        assert_eq!(
            scope.neuron_ids(scope.layer_count() - 1).len(),
            2,
            "output arity changed"
        );

        let bias_range = scope.config().neuron.bias;
        let weight_range = scope.config().synapse.weight;
        let mut seen_pairs = ahash::AHashSet::new();
        for depth in 0..scope.layer_count() {
            for id in scope.neuron_ids(depth).to_vec() {
                let neuron = scope.neuron(id).unwrap();
                assert!(bias_range.contains(neuron.bias()));
                for synapse_id in scope.outgoing(id).to_vec() {
                    let synapse = scope.synapse(synapse_id).unwrap();
                    assert_ne!(synapse.source(), synapse.target(), "self-synapse");
                    assert!(
                        seen_pairs.insert((synapse.source(), synapse.target())),
                        "duplicate (source, target) pair"
                    );
                    assert!(weight_range.contains(synapse.weight()));
                }
            }
        }
    }

    #[test]
    fn repeated_mutation_preserves_invariants() {
        let mut scope = TopologyScope::new(aggressive_config(None));
        scope.initialize().unwrap();
        for _ in 0..200 {
            mutate(&mut scope).unwrap();
            check_invariants(&scope);
        }
    }

    #[test]
    fn static_mode_never_changes_structure() {
        let mut scope = TopologyScope::new(aggressive_config(Some(vec![4])));
        scope.initialize().unwrap();
        for _ in 0..100 {
            mutate(&mut scope).unwrap();
            assert_eq!(scope.layer_count(), 3);
            assert_eq!(scope.neuron_ids(0).len(), 3);
            assert_eq!(scope.neuron_ids(1).len(), 4);
            assert_eq!(scope.neuron_ids(2).len(), 2);
        }
    }

    #[test]
    fn mutation_eventually_adds_synapses() {
        let mut scope = TopologyScope::new(aggressive_config(None));
        scope.initialize().unwrap();
        for _ in 0..100 {
            mutate(&mut scope).unwrap();
        }
        // With add rate 0.6 over 100 rounds and 5 fixed boundary neurons,
        // a fully synapse-free outcome is vanishingly unlikely.
        assert!(scope.synapse_count() > 0);
    }
}
