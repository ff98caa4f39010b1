// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are consistent and within valid ranges
//! before any population is built from them. All problems are collected
//! and reported together.

use crate::{ConfigError, ConfigResult, EvonetConfig};

fn check_probability(field: &str, value: f64, errors: &mut Vec<String>) {
    if !(0.0..1.0).contains(&value) {
        errors.push(format!("{field} = {value} must be in [0, 1)"));
    }
}

fn check_amount(field: &str, value: f64, errors: &mut Vec<String>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(format!("{field} = {value} must be finite and non-negative"));
    }
}

fn check_range(field: &str, min: f64, max: f64, errors: &mut Vec<String>) {
    if !min.is_finite() || !max.is_finite() || min >= max {
        errors.push(format!("{field} = [{min}, {max}] is not a valid interval"));
    }
}

/// Validate the complete configuration
///
/// Checks:
/// - network dimensions (inputs/outputs positive, hidden sizes positive)
/// - population size and group partitioning
/// - mutation rates (valid probabilities / log-sample bases)
/// - bias and weight ranges
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] listing every violation found.
pub fn validate_config(config: &EvonetConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    if config.network.inputs == 0 {
        errors.push("network.inputs must be positive".to_string());
    }
    if config.network.outputs == 0 {
        errors.push("network.outputs must be positive".to_string());
    }
    if let Some(hidden) = &config.network.hidden {
        for (i, size) in hidden.iter().enumerate() {
            if *size == 0 {
                errors.push(format!("network.hidden[{i}] must be positive"));
            }
        }
    }

    if config.population.size == 0 {
        errors.push("population.size must be positive".to_string());
    }
    if config.population.group == 0 {
        errors.push("population.group must be positive".to_string());
    } else if config.population.size % config.population.group != 0 {
        errors.push(format!(
            "population.group = {} must evenly divide population.size = {}",
            config.population.group, config.population.size
        ));
    }
    check_probability("population.equality", config.population.equality, &mut errors);

    let mutate = &config.mutate;
    check_probability("mutate.layer.add_rate", mutate.layer.add_rate, &mut errors);
    check_probability("mutate.layer.remove_rate", mutate.layer.remove_rate, &mut errors);
    check_probability("mutate.neuron.add_rate", mutate.neuron.add_rate, &mut errors);
    check_probability("mutate.neuron.remove_rate", mutate.neuron.remove_rate, &mut errors);
    check_probability("mutate.neuron.change.rate", mutate.neuron.change.rate, &mut errors);
    check_amount("mutate.neuron.change.amount", mutate.neuron.change.amount, &mut errors);
    check_probability("mutate.synapse.add_rate", mutate.synapse.add_rate, &mut errors);
    check_probability("mutate.synapse.remove_rate", mutate.synapse.remove_rate, &mut errors);
    check_probability("mutate.synapse.change.rate", mutate.synapse.change.rate, &mut errors);
    check_amount("mutate.synapse.change.amount", mutate.synapse.change.amount, &mut errors);

    check_range("neuron.bias", config.neuron.bias.min, config.neuron.bias.max, &mut errors);
    check_range(
        "synapse.weight",
        config.synapse.weight.min,
        config.synapse.weight.max,
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("\n")))
    }
}
