// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Closed activation-function registry.
//!
//! Every known activation kind is a tagged variant carrying its numeric
//! constants. String aliases are resolved once at the API boundary via
//! [`Activation::from_alias`]; the hot paths (constant folding and code
//! emission) dispatch on the enum, never on strings.

use ahash::AHashMap;
use once_cell::sync::Lazy;

use crate::{GenomeError, GenomeResult};

/// An activation function with its constants bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    BinaryStep,
    /// Exponential linear unit with slope `alpha` below zero
    Elu { alpha: f64 },
    Gaussian,
    Gelu,
    Identity,
    LeakyRelu { alpha: f64 },
    ParametricRelu { alpha: f64 },
    Relu,
    /// Scaled ELU: `lambda * x` above zero, `alpha * (e^x - 1)` below
    Selu { lambda: f64, alpha: f64 },
    Sigmoid,
    Silu,
    /// Smoothed hyperbolic tangent with four shape constants
    Smht { a: f64, b: f64, c: f64, d: f64 },
    Softplus,
    Tanh,
}

/// Canonical name -> accepted aliases. The reverse index is built once;
/// alias uniqueness across rows is a checked invariant (see tests).
const ALIAS_ROWS: &[(&str, &[&str])] = &[
    ("binary-step", &["binary step", "binary", "step"]),
    ("exponential-linear-unit", &["exponential linear unit", "elu"]),
    ("gaussian", &["gaussian"]),
    ("gaussian-error-linear-unit", &["gaussian error linear unit", "gelu"]),
    ("identity", &["identity", "linear"]),
    ("leaky-rectified-linear-unit", &["leaky rectified linear unit", "leaky relu"]),
    ("parametric-rectified-linear-unit", &["parametric rectified linear unit", "prelu"]),
    ("rectified-linear-unit", &["rectified linear unit", "relu"]),
    ("scaled-exponential-linear-unit", &["scaled exponential linear unit", "selu"]),
    ("sigmoid", &["sigmoid", "logistic", "soft step"]),
    ("sigmoid-linear-unit", &["sigmoid linear unit", "silu", "swish"]),
    ("smoothed-hyperbolic-tangent", &["smoothed hyperbolic tangent", "smht"]),
    ("softplus", &["softplus"]),
    ("hyperbolic-tangent", &["hyperbolic tangent", "tanh"]),
];

static ALIASES: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = AHashMap::new();
    for (canonical, aliases) in ALIAS_ROWS {
        table.insert(*canonical, *canonical);
        for alias in *aliases {
            table.insert(*alias, *canonical);
        }
    }
    table
});

fn constant_count(canonical: &str) -> usize {
    match canonical {
        "exponential-linear-unit" => 1,
        "leaky-rectified-linear-unit" => 1,
        "parametric-rectified-linear-unit" => 1,
        "scaled-exponential-linear-unit" => 2,
        "smoothed-hyperbolic-tangent" => 4,
        _ => 0,
    }
}

impl Activation {
    /// Resolve an alias and bind its constants.
    ///
    /// # Errors
    ///
    /// [`GenomeError::UnknownActivation`] for an unrecognized alias,
    /// [`GenomeError::WrongConstantCount`] when `consts` does not match
    /// the function's arity.
    pub fn from_alias(name: &str, consts: &[f64]) -> GenomeResult<Self> {
        let canonical = *ALIASES
            .get(name)
            .ok_or_else(|| GenomeError::UnknownActivation(name.to_string()))?;

        let expected = constant_count(canonical);
        if consts.len() != expected {
            return Err(GenomeError::WrongConstantCount {
                name: canonical.to_string(),
                expected,
                actual: consts.len(),
            });
        }

        Ok(match canonical {
            "binary-step" => Self::BinaryStep,
            "exponential-linear-unit" => Self::Elu { alpha: consts[0] },
            "gaussian" => Self::Gaussian,
            "gaussian-error-linear-unit" => Self::Gelu,
            "identity" => Self::Identity,
            "leaky-rectified-linear-unit" => Self::LeakyRelu { alpha: consts[0] },
            "parametric-rectified-linear-unit" => Self::ParametricRelu { alpha: consts[0] },
            "rectified-linear-unit" => Self::Relu,
            "scaled-exponential-linear-unit" => Self::Selu {
                lambda: consts[0],
                alpha: consts[1],
            },
            "sigmoid" => Self::Sigmoid,
            "sigmoid-linear-unit" => Self::Silu,
            "smoothed-hyperbolic-tangent" => Self::Smht {
                a: consts[0],
                b: consts[1],
                c: consts[2],
                d: consts[3],
            },
            "softplus" => Self::Softplus,
            "hyperbolic-tangent" => Self::Tanh,
            _ => return Err(GenomeError::UnknownActivation(name.to_string())),
        })
    }

    /// Evaluate at `x`, used for constant folding during code generation.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Self::BinaryStep => {
                if x >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Elu { alpha } => {
                if x >= 0.0 {
                    x
                } else {
                    alpha * (x.exp() - 1.0)
                }
            }
            Self::Gaussian => (-x * x).exp(),
            Self::Gelu => 0.5 * x * (1.0 + erf(x / std::f64::consts::SQRT_2)),
            Self::Identity => x,
            Self::LeakyRelu { alpha } | Self::ParametricRelu { alpha } => {
                if x >= 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            Self::Relu => x.max(0.0),
            Self::Selu { lambda, alpha } => {
                if x >= 0.0 {
                    lambda * x
                } else {
                    alpha * (x.exp() - 1.0)
                }
            }
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Silu => x / (1.0 + (-x).exp()),
            Self::Smht { a, b, c, d } => {
                ((a * x).exp() - (-b * x).exp()) / ((c * x).exp() + (-d * x).exp())
            }
            Self::Softplus => (1.0 + x.exp()).ln(),
            Self::Tanh => x.tanh(),
        }
    }

    /// The function body of `static double activator(double x)` in the
    /// generated C program, constants inlined.
    pub fn c_body(&self) -> String {
        match self {
            Self::BinaryStep => "return (x >= 0) ? 1.0 : 0.0;".to_string(),
            Self::Elu { alpha } => {
                format!("return (x >= 0) ? x : {alpha} * (exp(x) - 1.0);")
            }
            Self::Gaussian => "return exp(-x * x);".to_string(),
            Self::Gelu => "return 0.5 * x * (1.0 + erf(x / sqrt(2.0)));".to_string(),
            Self::Identity => "return x;".to_string(),
            Self::LeakyRelu { alpha } | Self::ParametricRelu { alpha } => {
                format!("return (x >= 0) ? x : {alpha} * x;")
            }
            Self::Relu => "return (x >= 0) ? x : 0.0;".to_string(),
            Self::Selu { lambda, alpha } => {
                format!("return (x >= 0) ? {lambda} * x : {alpha} * (exp(x) - 1.0);")
            }
            Self::Sigmoid => "return 1.0 / (1.0 + exp(-x));".to_string(),
            Self::Silu => "return x / (1.0 + exp(-x));".to_string(),
            Self::Smht { a, b, c, d } => format!(
                "return (exp({a} * x) - exp(-{b} * x)) / (exp({c} * x) + exp(-{d} * x));"
            ),
            Self::Softplus => "return log(1.0 + exp(x));".to_string(),
            Self::Tanh => "return tanh(x);".to_string(),
        }
    }
}

/// Gauss error function, Abramowitz & Stegun 7.1.26 (max error 1.5e-7).
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}
