// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lowering: topology -> emit IR.
//!
//! Walks layers in depth order and neurons in height order, classifying
//! each live neuron (non-empty outlet set) into its emission kind:
//!
//! - **Input**: depth-0 neurons read one positional runtime input.
//! - **Constant-foldable**: every contributing incoming edge is already a
//!   numeric literal, so the activated value is computed here and never
//!   becomes a runtime variable.
//! - **Symbolic**: at least one incoming edge carries a runtime variable;
//!   literal contributions fold into the constant part.
//!
//! Neurons with an empty outlet set are pruned entirely. Feedback edges
//! (source emitted at or after the consumer) cannot be evaluated in a
//! single forward pass and contribute nothing; reachability already
//! decided liveness, emission order decides computability.

use ahash::AHashMap;
use evonet_genome::{Activation, NeuronId, TopologyScope};

use crate::ir::{NeuronExpr, OutputValue, Program, Statement, Term};

#[derive(Debug, Clone)]
enum Emitted {
    Pruned,
    Literal(f64),
    Var(String),
}

fn var_name(id: NeuronId) -> String {
    format!("n{}", id.0)
}

/// Lower one swept topology into a [`Program`].
///
/// The reachability sweep must have run since the last structural
/// change; unswept scopes lower to a program whose outputs are all
/// constants.
pub fn lower(scope: &TopologyScope, activation: &Activation) -> Program {
    let depths = scope.layer_count();
    let last = depths.saturating_sub(1);

    let mut table: AHashMap<NeuronId, Emitted> = AHashMap::new();
    let mut statements = Vec::new();
    let mut outputs = Vec::new();

    for depth in 0..depths {
        for (height, id) in scope.neuron_ids(depth).iter().enumerate() {
            let id = *id;
            let Ok(neuron) = scope.neuron(id) else {
                continue;
            };

            let emitted = if neuron.outlet().is_empty() {
                Emitted::Pruned
            } else if depth == 0 {
                statements.push(Statement {
                    var: var_name(id),
                    expr: NeuronExpr::Input {
                        height,
                        bias: neuron.bias(),
                    },
                });
                Emitted::Var(var_name(id))
            } else {
                // deterministic order: sort contributing edges by source id
                let mut incoming: Vec<_> = scope.incoming(id).collect();
                incoming.sort_by_key(|(source, _)| *source);

                let mut constant = neuron.bias();
                let mut terms = Vec::new();
                for (source, synapse_id) in incoming {
                    let Ok(synapse) = scope.synapse(synapse_id) else {
                        continue;
                    };
                    let weight = synapse.weight();
                    if weight == 0.0 {
                        continue;
                    }
                    match table.get(&source) {
                        Some(Emitted::Literal(value)) => constant += weight * value,
                        Some(Emitted::Var(var)) => terms.push(Term {
                            weight,
                            var: var.clone(),
                        }),
                        // pruned or not yet emitted (feedback edge)
                        Some(Emitted::Pruned) | None => {}
                    }
                }

                if terms.is_empty() {
                    Emitted::Literal(activation.eval(constant))
                } else {
                    statements.push(Statement {
                        var: var_name(id),
                        expr: NeuronExpr::Sum { constant, terms },
                    });
                    Emitted::Var(var_name(id))
                }
            };

            if depth == last {
                outputs.push(match &emitted {
                    Emitted::Pruned => OutputValue::Zero,
                    Emitted::Literal(value) => OutputValue::Literal(*value),
                    Emitted::Var(var) => OutputValue::Var(var.clone()),
                });
            }
            table.insert(id, emitted);
        }
    }

    Program {
        activation: activation.clone(),
        inputs: scope.neuron_ids(0).len(),
        statements,
        outputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evonet_config::EvonetConfig;
    use evonet_genome::update_reachability;
    use std::sync::Arc;

    fn two_in_one_out() -> TopologyScope {
        let config = Arc::new(EvonetConfig::new(2, 1, None).unwrap());
        let mut scope = TopologyScope::new(config);
        scope.initialize().unwrap();
        scope
    }

    #[test]
    fn disconnected_network_folds_to_constants() {
        let mut scope = two_in_one_out();
        let out = scope.neuron_at(1, 0).unwrap();
        scope.set_bias(out, 0.25).unwrap();
        update_reachability(&mut scope);

        let program = lower(&scope, &Activation::Sigmoid);
        // inputs are dead code, the output has no incoming edges
        assert!(program.statements.is_empty());
        assert_eq!(program.outputs.len(), 1);
        match &program.outputs[0] {
            OutputValue::Literal(v) => {
                assert!((v - Activation::Sigmoid.eval(0.25)).abs() < 1e-12)
            }
            other => panic!("expected literal output, got {other:?}"),
        }
    }

    #[test]
    fn connected_input_becomes_symbolic_chain() {
        let mut scope = two_in_one_out();
        let input0 = scope.neuron_at(0, 0).unwrap();
        let out = scope.neuron_at(1, 0).unwrap();
        let syn = scope.add_synapse(input0, out).unwrap();
        scope.set_weight(syn, 0.5).unwrap();
        update_reachability(&mut scope);

        let program = lower(&scope, &Activation::Identity);
        assert_eq!(program.inputs, 2);
        // one input assignment + one symbolic output assignment
        assert_eq!(program.statements.len(), 2);
        match &program.statements[0].expr {
            NeuronExpr::Input { height, .. } => assert_eq!(*height, 0),
            other => panic!("expected input expr, got {other:?}"),
        }
        match &program.statements[1].expr {
            NeuronExpr::Sum { terms, .. } => {
                assert_eq!(terms.len(), 1);
                assert_eq!(terms[0].weight, 0.5);
                assert_eq!(terms[0].var, program.statements[0].var);
            }
            other => panic!("expected sum expr, got {other:?}"),
        }
        assert_eq!(
            program.outputs[0],
            OutputValue::Var(program.statements[1].var.clone())
        );
    }

    #[test]
    fn pruned_neurons_never_appear_in_statements() {
        let mut scope = two_in_one_out();
        let input0 = scope.neuron_at(0, 0).unwrap();
        let input1 = scope.neuron_at(0, 1).unwrap();
        let out = scope.neuron_at(1, 0).unwrap();
        scope.add_synapse(input0, out).unwrap();
        // input1 stays disconnected
        update_reachability(&mut scope);

        let program = lower(&scope, &Activation::Tanh);
        let dead = var_name(input1);
        assert!(program.statements.iter().all(|s| s.var != dead));
    }

    #[test]
    fn zero_weight_edges_contribute_nothing() {
        let mut scope = two_in_one_out();
        let input0 = scope.neuron_at(0, 0).unwrap();
        let out = scope.neuron_at(1, 0).unwrap();
        let syn = scope.add_synapse(input0, out).unwrap();
        scope.set_weight(syn, 0.0).unwrap();
        update_reachability(&mut scope);

        let program = lower(&scope, &Activation::Identity);
        // the output folds to a literal because its only edge is weightless
        assert!(matches!(program.outputs[0], OutputValue::Literal(_)));
    }
}
