// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
# Evonet Code Generation & Compiler Bridge

Turns one network's topology into an executable forward-pass program:

1. `lower` - reachability-aware classification of every live neuron into
   an ordered emit IR ([`Program`])
2. `emit` - rendering the IR into C source ([`CEmitter`]); the IR keeps
   the target language swappable without touching mutation or
   reachability logic
3. `bridge` - the [`CompilerBridge`] contract for compiling and executing
   the generated program as a subprocess, with the `cc`-based
   [`CcBridge`] and a scripted [`MockBridge`] for tests

## Generated-program interface

One process per network per evaluation. Inputs arrive as positional
command-line arguments (one per input neuron, height order, decimal
text); outputs are printed to stdout as space-separated decimal numbers
in height order.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bridge;
pub mod emit;
pub mod ir;
pub mod lower;

pub use bridge::{format_arg, CcBridge, CompilerBridge, MockBridge};
pub use emit::CEmitter;
pub use ir::{NeuronExpr, OutputValue, Program, Statement, Term};
pub use lower::lower;

/// Result type for codegen operations
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors from code generation, compilation and execution
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("Invalid artifact name '{0}': names must not carry a path or extension")]
    InvalidName(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compilation of '{name}' failed: {detail}")]
    CompileFailed { name: String, detail: String },

    #[error("Program '{0}' has not been compiled")]
    NotCompiled(String),

    #[error("Execution of '{name}' failed: {detail}")]
    ExecuteFailed { name: String, detail: String },

    #[error("Could not parse program output '{0}' as a number")]
    OutputParse(String),

    #[error("Working directory {0} escapes the process's own file tree")]
    WorkdirEscape(std::path::PathBuf),

    #[error(transparent)]
    Genome(#[from] evonet_genome::GenomeError),
}
