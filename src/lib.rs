// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Evonet - Neuroevolution of Compiled Networks
//!
//! Evonet evolves neural-network topologies with a genetic algorithm and
//! evaluates each candidate by generating, compiling and running a native
//! forward-pass program.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! evonet = "0.1"
//! ```
//!
//! ```no_run
//! use std::sync::Arc;
//! use evonet::{CcBridge, EvonetConfig, Group, Population};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = EvonetConfig::new(2, 1, None)?;
//!     let bridge = Arc::new(CcBridge::new("./artifacts")?);
//!     let mut population = Population::new(config, bridge);
//!
//!     population.set_sender(Arc::new(|_: Group| vec![1.0, 0.0]));
//!     population.set_trainer(Arc::new(|_: Group, outputs: &[f64]| {
//!         1.0 - (outputs[0] - 1.0).abs()
//!     }));
//!
//!     population.start()?;
//!     for _ in 0..10 {
//!         population.train(4, None)?;
//!         population.evolve()?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Workspace layout
//!
//! - [`config`] - validated configuration (`evonet-config`)
//! - [`genome`] - identity registry, topology graph, mutation,
//!   reachability (`evonet-genome`)
//! - [`codegen`] - emit IR, C emitter, compiler bridge (`evonet-codegen`)
//! - [`runtime`] - networks, population coordinator, lifecycle,
//!   statistics (`evonet-runtime`)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod logging;

// Re-export member crates
pub use evonet_codegen as codegen;
pub use evonet_config as config;
pub use evonet_genome as genome;
pub use evonet_runtime as runtime;

// Primary API surface
pub use evonet_codegen::{CcBridge, CompilerBridge, MockBridge};
pub use evonet_config::{load_config, EvonetConfig, ValueRange};
pub use evonet_genome::{Activation, TopologyScope};
pub use evonet_runtime::{
    Controller, Group, LifecycleState, Network, Population, Statistics, Status,
};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::codegen::{CcBridge, CompilerBridge};
    pub use crate::config::{load_config, EvonetConfig};
    pub use crate::genome::Activation;
    pub use crate::runtime::{Controller, Group, LifecycleState, Population, Status};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        // Just test that re-exports work
        use crate::prelude::*;
        let _group = Group::new(0, 0);
        let _state = LifecycleState::Off;
    }
}
