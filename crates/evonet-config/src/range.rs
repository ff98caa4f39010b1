// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Closed numeric intervals used to bound biases and synapse weights.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// A closed `[min, max]` interval over `f64`.
///
/// Biases and weights are sampled from and clamped into one of these;
/// perturbation never escapes the interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Build a range, rejecting empty or inverted intervals.
    pub fn new(min: f64, max: f64) -> ConfigResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::InvalidValue(format!(
                "range [{min}, {max}] is not a valid interval"
            )));
        }
        Ok(Self { min, max })
    }

    /// `[-half_width, half_width]`, the shape used for the default bias
    /// and weight bounds.
    pub fn symmetric(half_width: f64) -> Self {
        Self {
            min: -half_width,
            max: half_width,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::symmetric(1.0)
    }
}
