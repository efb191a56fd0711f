//! Shapiro-Wilk normality test
//!
//! Royston's (1995) approximation of the Shapiro-Wilk W statistic and its
//! p-value, valid for 3 <= n <= 5000.

use super::{normal_quantile, normal_sf};

/// Smallest sample size the test is defined for.
pub const MIN_NORMALITY_SAMPLES: usize = 3;

/// Range below which a sample is treated as constant.
const SMALL: f64 = 1e-19;

/// Polynomial coefficients for the two largest weights.
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];

/// Small-sample (n <= 11) transformation coefficients.
const G: [f64; 2] = [-2.273, 0.459];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];

/// Large-sample (n >= 12) transformation coefficients.
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

/// Outcome of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityTest {
    /// W statistic in (0, 1]
    pub w: f64,
    /// Upper-tail p-value; small values reject normality
    pub p_value: f64,
}

/// Run the Shapiro-Wilk test on a sample.
///
/// Returns `None` when the sample has fewer than three values. A sample with
/// zero range is reported as `W = 1, p = 1`.
pub fn shapiro_wilk(sample: &[f64]) -> Option<NormalityTest> {
    let n = sample.len();
    if n < MIN_NORMALITY_SAMPLES {
        return None;
    }

    let mut x = sample.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Some(NormalityTest {
            w: 1.0,
            p_value: 1.0,
        });
    }

    let a = coefficients(n);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum();

    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();

    let w = ((numerator * numerator) / ss).min(1.0);
    let p_value = p_value(w, n);

    Some(NormalityTest { w, p_value })
}

/// Half of the antisymmetric weight vector, largest weight first.
fn coefficients(n: usize) -> Vec<f64> {
    let nn2 = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an = n as f64;
    let an25 = an + 0.25;
    let m: Vec<f64> = (1..=nn2)
        .map(|i| normal_quantile((i as f64 - 0.375) / an25))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; nn2];
    a[0] = a1;

    let (first_scaled, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };

    for i in first_scaled..nn2 {
        a[i] = -m[i] / fac;
    }

    a
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        // Exact distribution for n = 3
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::PI / 3.0;
        return (pi6 * (w.sqrt().asin() - stqr)).clamp(0.0, 1.0);
    }

    let an = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let mut y = w1.ln();

    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    normal_sf((y - m) / s).clamp(0.0, 1.0)
}

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, coef| acc * x + coef)
}
