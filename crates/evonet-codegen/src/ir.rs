// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! The emit IR: an ordered list of per-neuron instructions.
//!
//! Lowering classifies every live neuron into one of three emission
//! kinds (input, constant-folded, symbolic) and produces a [`Program`];
//! emitters render a `Program` into a target language without knowing
//! anything about topologies or reachability.

use evonet_genome::Activation;

/// A complete forward-pass program for one network.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Activation applied by every emitted assignment
    pub activation: Activation,
    /// Number of positional runtime inputs the program reads
    pub inputs: usize,
    /// Variable assignments in dependency order (depth, then height)
    pub statements: Vec<Statement>,
    /// One printed value per output neuron, in height order
    pub outputs: Vec<OutputValue>,
}

/// One emitted variable assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Variable name, unique per neuron
    pub var: String,
    pub expr: NeuronExpr,
}

/// The right-hand side of an assignment; the activation function wraps
/// the whole expression.
#[derive(Debug, Clone, PartialEq)]
pub enum NeuronExpr {
    /// Input kind: `activator(bias + <positional runtime input>)`
    Input { height: usize, bias: f64 },
    /// Symbolic kind: `activator(constant + Σ weight * var)` where
    /// `constant` folds the bias plus every literal contribution
    Sum { constant: f64, terms: Vec<Term> },
}

/// One non-foldable incoming edge
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub weight: f64,
    pub var: String,
}

/// The resolved value printed for one output neuron.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    /// Pruned output neuron: prints 0
    Zero,
    /// Constant-folded at generation time
    Literal(f64),
    /// Value of an emitted variable
    Var(String),
}
