// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Random sampling primitives for mutation.
//!
//! Thin wrappers over the `rand` crate so the mutation engine reads as
//! the algorithm it implements rather than distribution plumbing.

use evonet_config::ValueRange;
use rand::Rng;

/// Uniform value in `[0, 1)`.
pub fn unit() -> f64 {
    rand::thread_rng().gen()
}

/// Uniform value in `[min, max]`.
pub fn uniform(min: f64, max: f64) -> f64 {
    if min >= max {
        return min;
    }
    rand::thread_rng().gen_range(min..=max)
}

/// Uniform value inside a configured range.
pub fn uniform_in(range: &ValueRange) -> f64 {
    uniform(range.min, range.max)
}

/// Bernoulli draw with probability `chance` in `[0, 1]`.
pub fn condition(chance: f64) -> bool {
    unit() < chance
}

/// Uniform index in `0..len`. `len` must be nonzero.
pub fn index(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}

/// Log-distributed structural-mutation sample.
///
/// Draws `u ~ U(0, 1)` and returns `floor(log_rate(u))`, i.e.
/// `ln(u) / ln(rate)` truncated toward zero. `rate` must be in `[0, 1)`;
/// larger rates produce larger samples on average, a rate of zero always
/// produces zero.
pub fn log_sample(rate: f64) -> i64 {
    if rate <= 0.0 {
        return 0;
    }
    debug_assert!(rate < 1.0, "log_sample rate must be in [0, 1)");
    let mut u = unit();
    if u <= 0.0 {
        u = f64::MIN_POSITIVE;
    }
    (u.ln() / rate.ln()) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_stays_in_range() {
        for _ in 0..1000 {
            let v = unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn uniform_in_respects_bounds() {
        let range = ValueRange::symmetric(0.5);
        for _ in 0..1000 {
            assert!(range.contains(uniform_in(&range)));
        }
    }

    #[test]
    fn log_sample_is_nonnegative_and_rarely_positive_at_low_rates() {
        let mut positives = 0;
        for _ in 0..10_000 {
            let v = log_sample(6e-3);
            assert!(v >= 0);
            if v > 0 {
                positives += 1;
            }
        }
        // P(sample >= 1) = rate, so ~60 hits expected out of 10k
        assert!(positives < 500, "too many positive samples: {positives}");
    }

    #[test]
    fn log_sample_zero_rate_is_zero() {
        for _ in 0..100 {
            assert_eq!(log_sample(0.0), 0);
        }
    }

    #[test]
    fn condition_extremes() {
        assert!(!condition(0.0));
        assert!(condition(1.0));
    }
}
