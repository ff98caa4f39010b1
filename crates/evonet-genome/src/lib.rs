// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
# Evonet Genome Management

Handles all **genotype** operations for evonet:

- Identity registry (stable, comparable ids per object kind)
- Topology graph (layers, neurons, synapses) with structural invariants
- Topology-and-weight mutation
- Reachability analysis (inlet/outlet sweep, dead-code detection)
- Flat binary record codec for population snapshots

## Architecture

This crate manages the **genetic blueprint** (genotype) of an evonet
network. Turning a topology into an executable forward pass (phenotype)
is handled by `evonet-codegen`; population lifecycle by `evonet-runtime`.

## Modules

- `registry` - Per-kind id allocation
- `topology` - The mutable graph for one network
- `mutation` - Structural and numeric mutation ("evolve")
- `reachability` - Inlet/outlet two-pass sweep
- `activation` - Closed activation-function registry with alias lookup
- `storage` - Fixed-width binary record codec
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod activation;
pub mod mutation;
pub mod random;
pub mod reachability;
pub mod registry;
pub mod storage;
pub mod topology;

pub use activation::Activation;
pub use mutation::mutate;
pub use reachability::update_reachability;
pub use registry::{ObjectKind, Registry};
pub use storage::{decode_records, encode_records, Record, Tag};
pub use topology::{LayerId, Neuron, NeuronId, Synapse, SynapseId, TopologyScope};

/// Result type for genome operations
pub type GenomeResult<T> = Result<T, GenomeError>;

/// Errors that can occur during genome operations
///
/// Structural-invariant violations fail the single operation that caused
/// them; the graph is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenomeError {
    #[error("Layer depth {depth} out of range (layer count {layers})")]
    DepthOutOfRange { depth: usize, layers: usize },

    #[error("Neuron height {height} out of range (layer size {size})")]
    HeightOutOfRange { height: usize, size: usize },

    #[error("Unknown layer id {0}")]
    UnknownLayer(u64),

    #[error("Unknown neuron id {0}")]
    UnknownNeuron(u64),

    #[error("Unknown synapse id {0}")]
    UnknownSynapse(u64),

    #[error("A neuron cannot synapse onto itself (neuron id {0})")]
    SelfSynapse(u64),

    #[error("Synapse {source_id} -> {target_id} already exists")]
    DuplicateSynapse { source_id: u64, target_id: u64 },

    #[error("Value {value} outside configured range [{min}, {max}]")]
    OutOfBounds { value: f64, min: f64, max: f64 },

    #[error("Unknown activation function alias: {0}")]
    UnknownActivation(String),

    #[error("Activation '{name}' expects {expected} constants, got {actual}")]
    WrongConstantCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Snapshot stream truncated at word {0}")]
    TruncatedStream(usize),

    #[error("Unknown record tag {0}")]
    UnknownTag(u64),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}
