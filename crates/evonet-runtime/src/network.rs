// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! One member of the population: a topology plus its compiled artifact
//! and fitness accumulator.
//!
//! The artifact name is derived from the network's registry id and is
//! treated as stale whenever the topology changes; compilation happens
//! lazily on the next evaluation.

use evonet_codegen::{lower, CEmitter, CompilerBridge};
use evonet_genome::{mutate, update_reachability, Activation, TopologyScope};
use tracing::trace;

use crate::callbacks::{Callbacks, Group};
use crate::{RuntimeError, RuntimeResult};

/// Whether a network still takes part in training and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Alive,
    Dead,
}

pub struct Network {
    id: u64,
    index: usize,
    group_size: usize,
    status: Status,
    scope: TopologyScope,
    activation: Activation,
    fitness_sum: f64,
    fitness_count: u64,
    compiled: bool,
}

impl Network {
    pub fn new(
        id: u64,
        index: usize,
        group_size: usize,
        scope: TopologyScope,
        activation: Activation,
    ) -> Self {
        Self {
            id,
            index,
            group_size,
            status: Status::Alive,
            scope,
            activation,
            fitness_sum: 0.0,
            fitness_count: 0,
            compiled: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn group(&self) -> Group {
        Group::from_flat(self.index, self.group_size)
    }

    pub fn scope(&self) -> &TopologyScope {
        &self.scope
    }

    /// Stable artifact name under which the bridge knows this network.
    pub fn artifact_name(&self) -> String {
        format!("network-{}", self.id)
    }

    /// Accumulated fitness: the running sum, or its mean when the
    /// fitness mode is averaging. Zero before any evaluation.
    pub fn fitness(&self) -> f64 {
        if self.scope.config().network.fitness.average {
            if self.fitness_count == 0 {
                0.0
            } else {
                self.fitness_sum / self.fitness_count as f64
            }
        } else {
            self.fitness_sum
        }
    }

    pub fn reset_fitness(&mut self) {
        self.fitness_sum = 0.0;
        self.fitness_count = 0;
    }

    /// Seed layers and neurons per the configured shape.
    pub fn initialize(&mut self) -> RuntimeResult<()> {
        self.scope.initialize()?;
        self.compiled = false;
        Ok(())
    }

    pub fn mutate(&mut self) -> RuntimeResult<()> {
        mutate(&mut self.scope)?;
        self.compiled = false;
        Ok(())
    }

    /// Recompute inlet/outlet reachability after structural changes.
    pub fn sweep(&mut self) {
        update_reachability(&mut self.scope);
        self.compiled = false;
    }

    /// Render the current forward-pass source. The reachability sweep
    /// must be current.
    pub fn generated_source(&self) -> String {
        CEmitter::new().emit(&lower(&self.scope, &self.activation))
    }

    fn ensure_compiled(&mut self, bridge: &dyn CompilerBridge) -> RuntimeResult<String> {
        let name = self.artifact_name();
        if !self.compiled || !bridge.has(&name) {
            update_reachability(&mut self.scope);
            let source = CEmitter::new().emit(&lower(&self.scope, &self.activation));
            bridge.compile(&name, &source, false)?;
            self.compiled = true;
            trace!(artifact = %name, "recompiled stale network");
        }
        Ok(name)
    }

    /// Evaluate once: compile if stale, run the artifact with the given
    /// inputs, score via the trainer and hand outputs to the receiver.
    pub fn input(
        &mut self,
        values: &[f64],
        bridge: &dyn CompilerBridge,
        callbacks: &Callbacks,
    ) -> RuntimeResult<()> {
        let arity = self.scope.neuron_ids(0).len();
        if values.len() != arity {
            return Err(RuntimeError::InvalidArgument(format!(
                "network {} takes {} inputs, received {}",
                self.id,
                arity,
                values.len()
            )));
        }

        let name = self.ensure_compiled(bridge)?;
        let outputs = bridge.execute(&name, values)?;

        let group = self.group();
        self.fitness_sum += (callbacks.trainer)(group, &outputs);
        self.fitness_count += 1;
        (callbacks.receiver)(group, &outputs);
        Ok(())
    }

    /// Drop this network's artifact from the bridge.
    pub fn release(&mut self, bridge: &dyn CompilerBridge) {
        bridge.remove(&self.artifact_name());
        self.compiled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evonet_codegen::MockBridge;
    use evonet_config::EvonetConfig;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn network(inputs: usize, outputs: usize) -> Network {
        let config = Arc::new(EvonetConfig::new(inputs, outputs, None).unwrap());
        let scope = TopologyScope::new(config);
        let mut network = Network::new(7, 0, 1, scope, Activation::Sigmoid);
        network.initialize().unwrap();
        network.sweep();
        network
    }

    #[test]
    fn artifact_name_derives_from_id() {
        assert_eq!(network(1, 1).artifact_name(), "network-7");
    }

    #[test]
    fn input_rejects_wrong_arity() {
        let bridge = MockBridge::new();
        let mut network = network(2, 1);
        let err = network
            .input(&[1.0], &bridge, &Callbacks::default())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument(_)));
        assert_eq!(bridge.compile_count(), 0);
    }

    #[test]
    fn input_compiles_once_and_accumulates_fitness() {
        let bridge = MockBridge::new();
        let counted = Arc::new(AtomicUsize::new(0));
        let seen = counted.clone();
        let callbacks = Callbacks {
            trainer: Arc::new(|_, _| 2.0),
            receiver: Arc::new(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            ..Callbacks::default()
        };

        let mut network = network(2, 1);
        network.input(&[1.0, 0.0], &bridge, &callbacks).unwrap();
        network.input(&[0.0, 1.0], &bridge, &callbacks).unwrap();

        assert_eq!(bridge.compile_count(), 1);
        assert_eq!(bridge.executions().len(), 2);
        assert_eq!(counted.load(Ordering::SeqCst), 2);
        // total mode by default
        assert_eq!(network.fitness(), 4.0);
    }

    #[test]
    fn average_mode_divides_by_sample_count() {
        let config = EvonetConfig {
            network: evonet_config::NetworkConfig {
                inputs: 1,
                outputs: 1,
                fitness: evonet_config::FitnessConfig {
                    average: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let scope = TopologyScope::new(Arc::new(config));
        let mut network = Network::new(1, 0, 1, scope, Activation::Identity);
        network.initialize().unwrap();
        network.sweep();
        assert_eq!(network.fitness(), 0.0);

        let bridge = MockBridge::new();
        let callbacks = Callbacks {
            trainer: Arc::new(|_, outputs| outputs[0] + 1.0),
            ..Callbacks::default()
        };
        bridge.script("network-1", vec![0.0]);
        network.input(&[0.5], &bridge, &callbacks).unwrap();
        network.input(&[0.5], &bridge, &callbacks).unwrap();
        assert_eq!(network.fitness(), 1.0);
    }

    #[test]
    fn mutation_marks_artifact_stale() {
        let bridge = MockBridge::new();
        let mut network = network(2, 1);
        let callbacks = Callbacks::default();

        network.input(&[0.0, 0.0], &bridge, &callbacks).unwrap();
        network.mutate().unwrap();
        network.sweep();
        network.input(&[0.0, 0.0], &bridge, &callbacks).unwrap();

        // recompile reuses the name, overwriting the artifact
        assert_eq!(bridge.compile_count(), 1);
        assert_eq!(bridge.executions().len(), 2);
    }

    #[test]
    fn release_removes_the_artifact() {
        let bridge = MockBridge::new();
        let mut network = network(1, 1);
        network
            .input(&[0.0], &bridge, &Callbacks::default())
            .unwrap();
        assert!(bridge.has("network-7"));
        network.release(&bridge);
        assert!(!bridge.has("network-7"));
    }
}
