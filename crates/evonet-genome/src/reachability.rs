// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Inlet/outlet reachability sweep.
//!
//! Two passes over the topology, executed before every code generation:
//!
//! - **Inlet pass**, depth ascending: a depth-0 neuron's inlet set is
//!   itself; any other neuron's inlet set is the union of the inlet sets
//!   of all neurons it receives a synapse from.
//! - **Outlet pass**, depth descending: a last-layer neuron's outlet set
//!   is itself; any other neuron's outlet set is the union of the outlet
//!   sets of all neurons it sends a synapse to.
//!
//! All sets are cleared before each pass, so feedback synapses (edges
//! pointing at equal or shallower depths) contribute nothing and the
//! sweep is idempotent. A neuron whose outlet set ends up empty cannot
//! influence any output and is dead code.

use ahash::AHashSet;

use crate::topology::{NeuronId, TopologyScope};

/// Recompute every neuron's inlet and outlet set in place.
pub fn update_reachability(scope: &mut TopologyScope) {
    let depths = scope.layer_count();
    if depths == 0 {
        return;
    }

    // Inlet pass, depth ascending
    for depth in 0..depths {
        for id in scope.neuron_ids(depth).to_vec() {
            if let Ok(neuron) = scope.neuron_mut(id) {
                neuron.inlet.clear();
            }
        }
    }
    for depth in 0..depths {
        for id in scope.neuron_ids(depth).to_vec() {
            let inlet: AHashSet<NeuronId> = if depth == 0 {
                std::iter::once(id).collect()
            } else {
                let mut union = AHashSet::new();
                for (source, _) in scope.incoming(id) {
                    if let Ok(neuron) = scope.neuron(source) {
                        union.extend(neuron.inlet().iter().copied());
                    }
                }
                union
            };
            if let Ok(neuron) = scope.neuron_mut(id) {
                neuron.inlet = inlet;
            }
        }
    }

    // Outlet pass, depth descending
    for depth in 0..depths {
        for id in scope.neuron_ids(depth).to_vec() {
            if let Ok(neuron) = scope.neuron_mut(id) {
                neuron.outlet.clear();
            }
        }
    }
    for depth in (0..depths).rev() {
        for id in scope.neuron_ids(depth).to_vec() {
            let outlet: AHashSet<NeuronId> = if depth == depths - 1 {
                std::iter::once(id).collect()
            } else {
                let mut union = AHashSet::new();
                for synapse_id in scope.outgoing(id).to_vec() {
                    if let Ok(synapse) = scope.synapse(synapse_id) {
                        if let Ok(target) = scope.neuron(synapse.target()) {
                            union.extend(target.outlet().iter().copied());
                        }
                    }
                }
                union
            };
            if let Ok(neuron) = scope.neuron_mut(id) {
                neuron.outlet = outlet;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evonet_config::EvonetConfig;
    use std::sync::Arc;

    fn connected_scope() -> TopologyScope {
        // 2 inputs, 1 hidden, 1 output; input 0 -> hidden -> output,
        // input 1 left disconnected.
        let config = Arc::new(EvonetConfig::new(2, 1, None).unwrap());
        let mut scope = TopologyScope::new(config);
        scope.initialize().unwrap();
        scope.add_layer(1).unwrap();
        let hidden = scope.add_neuron(1, 0).unwrap();
        let input0 = scope.neuron_at(0, 0).unwrap();
        let output = scope.neuron_at(2, 0).unwrap();
        scope.add_synapse(input0, hidden).unwrap();
        scope.add_synapse(hidden, output).unwrap();
        scope
    }

    #[test]
    fn inlet_and_outlet_follow_connectivity() {
        let mut scope = connected_scope();
        update_reachability(&mut scope);

        let input0 = scope.neuron_at(0, 0).unwrap();
        let input1 = scope.neuron_at(0, 1).unwrap();
        let hidden = scope.neuron_at(1, 0).unwrap();
        let output = scope.neuron_at(2, 0).unwrap();

        assert!(scope.neuron(input0).unwrap().inlet().contains(&input0));
        assert!(scope.neuron(hidden).unwrap().inlet().contains(&input0));
        assert!(scope.neuron(output).unwrap().inlet().contains(&input0));
        assert!(!scope.neuron(output).unwrap().inlet().contains(&input1));

        assert!(scope.neuron(output).unwrap().outlet().contains(&output));
        assert!(scope.neuron(hidden).unwrap().outlet().contains(&output));
        assert!(scope.neuron(input0).unwrap().outlet().contains(&output));
        // disconnected input is dead code
        assert!(scope.neuron(input1).unwrap().outlet().is_empty());
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut scope = connected_scope();
        update_reachability(&mut scope);

        let snapshot: Vec<_> = (0..scope.layer_count())
            .flat_map(|d| scope.neuron_ids(d).to_vec())
            .map(|id| {
                let n = scope.neuron(id).unwrap();
                (id, n.inlet().clone(), n.outlet().clone())
            })
            .collect();

        update_reachability(&mut scope);
        for (id, inlet, outlet) in snapshot {
            let n = scope.neuron(id).unwrap();
            assert_eq!(n.inlet(), &inlet);
            assert_eq!(n.outlet(), &outlet);
        }
    }

    #[test]
    fn feedback_synapse_does_not_resurrect_dead_code() {
        let mut scope = connected_scope();
        let hidden = scope.neuron_at(1, 0).unwrap();
        let input1 = scope.neuron_at(0, 1).unwrap();
        // feedback edge from hidden back to the disconnected input
        scope.add_synapse(hidden, input1).unwrap();
        update_reachability(&mut scope);

        // input1 now reaches the output through nothing; its only outgoing
        // path is absent, so it stays dead
        assert!(scope.neuron(input1).unwrap().outlet().is_empty());
        // and the feedback edge does not grow hidden's inlet set
        let input0 = scope.neuron_at(0, 0).unwrap();
        let inlet = scope.neuron(hidden).unwrap().inlet().clone();
        assert_eq!(inlet.len(), 1);
        assert!(inlet.contains(&input0));
    }
}
