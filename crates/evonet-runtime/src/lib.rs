// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
# Evonet Runtime

Coordinates a population of networks through the evolutionary loop:

- [`Network`] - one genotype plus its compiled forward-pass artifact and
  fitness accumulator
- [`Population`] - lifecycle state machine (`OFF -> ON -> TRAINING`,
  pause/resume, stop), concurrent training rounds, fitness-proportional
  selection, snapshot save/restore
- [`Controller`] - cloneable cross-thread handle for pause/resume/stop
- [`Statistics`] - generation counter, alive/dead counts, best/worst
  extrema for the current generation and all time

Training and next-generation construction fan out over scoped threads,
one task per network, joined before the round completes.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod callbacks;
pub mod network;
pub mod population;
pub mod stats;

pub use callbacks::{Callbacks, Group, Receiver, Sender, Trainer};
pub use network::{Network, Status};
pub use population::{Controller, LifecycleState, Population};
pub use stats::{Extrema, NetworkStat, Statistics};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors from population coordination
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("{operation} requires lifecycle state {expected}, population is {actual}")]
    Lifecycle {
        operation: &'static str,
        expected: &'static str,
        actual: LifecycleState,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Kill rejected, no network changed: {0}")]
    KillRejected(String),

    #[error("Internal failure: {0}")]
    Internal(String),

    #[error(transparent)]
    Genome(#[from] evonet_genome::GenomeError),

    #[error(transparent)]
    Codegen(#[from] evonet_codegen::CodegenError),
}
