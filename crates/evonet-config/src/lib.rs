// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
# Evonet Configuration System

Type-safe configuration for the evonet neuroevolution engine:

- TOML file parsing with automatic file discovery
- Per-section defaults matching the engine's reference parameters
- A validation pass that fails fast on inconsistent values

Configuration errors are construction-time errors: a `Population` never
sees an unvalidated [`EvonetConfig`].

## Usage

```rust,no_run
use evonet_config::EvonetConfig;

// Programmatic construction with validated dimensions
let config = EvonetConfig::new(2, 1, None).expect("invalid dimensions");

// Or load from `evonet.toml`
let config = evonet_config::load_config(None).expect("failed to load config");
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod range;
pub mod types;
pub mod validation;

pub use loader::{find_config_file, load_config};
pub use range::ValueRange;
pub use types::{
    ChangeMutation, EvonetConfig, FitnessConfig, LayerMutations, MutateConfig, NetworkConfig,
    NeuronConfig, NeuronMutations, PopulationConfig, SynapseConfig, SynapseMutations,
};
pub use validation::validate_config;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Configuration validation failed:\n{0}")]
    Validation(String),
}
