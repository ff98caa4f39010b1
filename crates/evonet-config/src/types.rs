// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `evonet.toml`. Defaults match the engine's reference parameters.

use serde::{Deserialize, Serialize};

use crate::range::ValueRange;
use crate::validation::validate_config;
use crate::ConfigResult;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EvonetConfig {
    pub population: PopulationConfig,
    pub network: NetworkConfig,
    pub neuron: NeuronConfig,
    pub synapse: SynapseConfig,
    pub mutate: MutateConfig,
}

impl EvonetConfig {
    /// Build a validated configuration with the given network dimensions.
    ///
    /// `hidden = None` puts the networks in dynamic mode: the mutation
    /// engine may add and remove hidden layers and neurons. Pinning hidden
    /// sizes freezes the layer structure (static mode).
    pub fn new(
        inputs: usize,
        outputs: usize,
        hidden: Option<Vec<usize>>,
    ) -> ConfigResult<Self> {
        let mut config = Self::default();
        config.network.inputs = inputs;
        config.network.outputs = outputs;
        config.network.hidden = hidden;
        validate_config(&config)?;
        Ok(config)
    }

    /// Re-run validation, e.g. after field-level edits.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_config(self)
    }

    /// Number of groups the population is partitioned into.
    pub fn group_count(&self) -> usize {
        self.population.size / self.population.group
    }
}

/// Population-level parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of networks per generation
    pub size: usize,
    /// Networks per group; groups route fitness/input callbacks
    pub group: usize,
    /// Selection-weight floor in `[0, 1)`. Even the worst performer keeps
    /// this much relative selection probability.
    pub equality: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            group: 1,
            equality: 5e-2,
        }
    }
}

/// Network dimensions and fitness aggregation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub inputs: usize,
    pub outputs: usize,
    /// Fixed hidden-layer sizes; `None` enables dynamic topology
    pub hidden: Option<Vec<usize>>,
    pub fitness: FitnessConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            inputs: 1,
            outputs: 1,
            hidden: None,
            fitness: FitnessConfig::default(),
        }
    }
}

/// Fitness interpretation
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Lower fitness is better (minimization objective)
    pub inverse: bool,
    /// Report mean fitness over evaluations instead of the running total
    pub average: bool,
}

/// Neuron parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronConfig {
    /// Bias bound; new biases are sampled from it, perturbed biases are
    /// clamped into it
    pub bias: ValueRange,
}

/// Synapse parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SynapseConfig {
    /// Weight bound; same sampling/clamping contract as the bias bound
    pub weight: ValueRange,
}

/// Mutation rates, grouped per structural element
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MutateConfig {
    pub layer: LayerMutations,
    pub neuron: NeuronMutations,
    pub synapse: SynapseMutations,
}

/// Layer add/remove rates (dynamic mode only)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayerMutations {
    pub add_rate: f64,
    pub remove_rate: f64,
}

impl Default for LayerMutations {
    fn default() -> Self {
        Self {
            add_rate: 6e-3,
            remove_rate: 6e-3,
        }
    }
}

/// Neuron add/remove rates plus bias perturbation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronMutations {
    pub add_rate: f64,
    pub remove_rate: f64,
    pub change: ChangeMutation,
}

impl Default for NeuronMutations {
    fn default() -> Self {
        Self {
            add_rate: 1e-2,
            remove_rate: 1e-2,
            change: ChangeMutation {
                rate: 4e-2,
                amount: 1e-1,
            },
        }
    }
}

/// Synapse add/remove rates plus weight perturbation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SynapseMutations {
    pub add_rate: f64,
    pub remove_rate: f64,
    pub change: ChangeMutation,
}

impl Default for SynapseMutations {
    fn default() -> Self {
        Self {
            add_rate: 2e-2,
            remove_rate: 2e-2,
            change: ChangeMutation {
                rate: 8e-2,
                amount: 1e-1,
            },
        }
    }
}

/// A perturbation mutation: applied with probability `rate`, drawing a
/// uniform delta in `[-amount, amount]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChangeMutation {
    pub rate: f64,
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_parameters() {
        let config = EvonetConfig::default();
        assert_eq!(config.population.size, 100);
        assert_eq!(config.population.group, 1);
        assert!((config.population.equality - 5e-2).abs() < f64::EPSILON);
        assert!((config.mutate.layer.add_rate - 6e-3).abs() < f64::EPSILON);
        assert!((config.mutate.neuron.change.amount - 1e-1).abs() < f64::EPSILON);
        assert!((config.mutate.synapse.change.rate - 8e-2).abs() < f64::EPSILON);
        assert_eq!(config.neuron.bias, ValueRange::symmetric(1.0));
        assert_eq!(config.synapse.weight, ValueRange::symmetric(1.0));
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(EvonetConfig::new(0, 1, None).is_err());
        assert!(EvonetConfig::new(2, 0, None).is_err());
        assert!(EvonetConfig::new(2, 1, Some(vec![3, 0])).is_err());
        assert!(EvonetConfig::new(2, 1, Some(vec![3, 4])).is_ok());
    }

    #[test]
    fn toml_roundtrip_preserves_hidden_layers() {
        let config = EvonetConfig::new(3, 2, Some(vec![5, 4])).unwrap();
        let text = toml::to_string(&config).unwrap();
        let parsed: EvonetConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.network.hidden, Some(vec![5, 4]));
        assert_eq!(parsed.network.inputs, 3);
    }
}
