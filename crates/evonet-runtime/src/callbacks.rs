// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! User callbacks wired into the training loop.
//!
//! Each callback receives the network's [`Group`] coordinate so one
//! closure can serve the whole population. All three run on worker
//! threads and must be `Send + Sync`.

use std::fmt;
use std::sync::Arc;

/// Position of a network inside the population's group layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Group {
    /// Which group the network belongs to.
    pub group: usize,
    /// Position within that group.
    pub index: usize,
}

impl Group {
    pub fn new(group: usize, index: usize) -> Self {
        Self { group, index }
    }

    /// Coordinate of the network at `flat` position for `group_size`
    /// networks per group.
    pub fn from_flat(flat: usize, group_size: usize) -> Self {
        Self {
            group: flat / group_size,
            index: flat % group_size,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.group, self.index)
    }
}

/// Scores one evaluation: receives the network's outputs and returns a
/// fitness sample to accumulate.
pub type Trainer = Arc<dyn Fn(Group, &[f64]) -> f64 + Send + Sync>;

/// Produces the input vector for one evaluation.
pub type Sender = Arc<dyn Fn(Group) -> Vec<f64> + Send + Sync>;

/// Observes the outputs of one evaluation.
pub type Receiver = Arc<dyn Fn(Group, &[f64]) + Send + Sync>;

/// Callback set held by the population. Defaults score zero, send no
/// inputs and discard outputs.
#[derive(Clone)]
pub struct Callbacks {
    pub trainer: Trainer,
    pub sender: Sender,
    pub receiver: Receiver,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            trainer: Arc::new(|_, _| 0.0),
            sender: Arc::new(|_| Vec::new()),
            receiver: Arc::new(|_, _| {}),
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_position_splits_into_group_and_index() {
        assert_eq!(Group::from_flat(0, 4), Group::new(0, 0));
        assert_eq!(Group::from_flat(5, 4), Group::new(1, 1));
        assert_eq!(Group::from_flat(7, 4), Group::new(1, 3));
    }

    #[test]
    fn defaults_are_inert() {
        let callbacks = Callbacks::default();
        assert_eq!((callbacks.trainer)(Group::new(0, 0), &[1.0]), 0.0);
        assert!((callbacks.sender)(Group::new(0, 0)).is_empty());
        (callbacks.receiver)(Group::new(0, 0), &[1.0]);
    }
}
