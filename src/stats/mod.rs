//! Statistical primitives used by the test selector
//!
//! Each test is a pure function over plain slices or count tables so the
//! selection logic can be exercised without a DataFrame.

pub mod contingency;
pub mod normality;
pub mod two_sample;

pub use contingency::*;
pub use normality::*;
pub use two_sample::*;

use statrs::function::erf::{erf_inv, erfc};

/// Upper tail of the standard normal distribution, `P(Z > z)`.
pub(crate) fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Inverse CDF of the standard normal distribution.
pub(crate) fn normal_quantile(p: f64) -> f64 {
    std::f64::consts::SQRT_2 * erf_inv(2.0 * p - 1.0)
}

/// Arithmetic mean and unbiased (n - 1) variance.
pub(crate) fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, f64::NAN);
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (mean, ss / (n - 1.0))
}
