//! Two-sample location tests: Welch's t-test and Mann-Whitney U

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{mean_and_variance, normal_sf};

/// Largest group size for which the exact U distribution is used when the
/// other group is larger.
const EXACT_MWU_MAX_GROUP: usize = 8;

/// Result of a two-sample test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// Two-sided Welch's t-test (unequal variances).
///
/// Returns `None` when either group has fewer than two values or when the
/// standard error is zero.
pub fn welch_t_test(x: &[f64], y: &[f64]) -> Option<TwoSampleTest> {
    if x.len() < 2 || y.len() < 2 {
        return None;
    }

    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let (m1, v1) = mean_and_variance(x);
    let (m2, v2) = mean_and_variance(y);

    let se1 = v1 / n1;
    let se2 = v2 / n2;
    let se_sq = se1 + se2;
    if se_sq <= 0.0 || !se_sq.is_finite() {
        return None;
    }

    let t = (m1 - m2) / se_sq.sqrt();
    // Welch-Satterthwaite degrees of freedom
    let df = se_sq * se_sq / (se1 * se1 / (n1 - 1.0) + se2 * se2 / (n2 - 1.0));

    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = (2.0 * dist.sf(t.abs())).min(1.0);

    Some(TwoSampleTest {
        statistic: t,
        p_value,
    })
}

/// Two-sided Mann-Whitney U test with continuity correction.
///
/// The statistic is U for the first sample. The exact null distribution is
/// used when there are no ties and at most one group exceeds
/// eight observations; otherwise the tie-corrected normal approximation.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Option<TwoSampleTest> {
    if x.is_empty() || y.is_empty() {
        return None;
    }

    let n1 = x.len();
    let n2 = y.len();
    let ranked = rank_combined(x, y);

    let r1: f64 = ranked.ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let use_exact = !ranked.has_ties()
        && !(n1 > EXACT_MWU_MAX_GROUP && n2 > EXACT_MWU_MAX_GROUP);

    let p_value = if use_exact {
        2.0 * exact_upper_tail(u.round() as usize, n1, n2)
    } else {
        asymptotic_two_sided(u, n1, n2, &ranked.tie_sizes)
    };

    Some(TwoSampleTest {
        statistic: u1,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

struct RankedSample {
    /// Average ranks, first-sample values first
    ranks: Vec<f64>,
    /// Sizes of tie groups larger than one
    tie_sizes: Vec<usize>,
}

impl RankedSample {
    fn has_ties(&self) -> bool {
        !self.tie_sizes.is_empty()
    }
}

fn rank_combined(x: &[f64], y: &[f64]) -> RankedSample {
    let combined: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
    let n = combined.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        combined[a]
            .partial_cmp(&combined[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut tie_sizes = Vec::new();
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && combined[order[end]] == combined[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; tied values share the average rank
        let avg_rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg_rank;
        }
        if end - start > 1 {
            tie_sizes.push(end - start);
        }
        start = end;
    }

    RankedSample { ranks, tie_sizes }
}

/// `P(U >= u)` under the null for sample sizes `n1`, `n2` without ties.
fn exact_upper_tail(u: usize, n1: usize, n2: usize) -> f64 {
    let counts = u_distribution(n1, n2);
    let total: f64 = counts.iter().sum();
    if u >= counts.len() {
        return 0.0;
    }
    counts[u..].iter().sum::<f64>() / total
}

/// Frequencies of each U value, i.e. the coefficients of the Gaussian
/// binomial coefficient `[n1 + n2 choose m]_q` with `m = min(n1, n2)`.
fn u_distribution(n1: usize, n2: usize) -> Vec<f64> {
    let m = n1.min(n2);
    let n = n1.max(n2);
    let len = m * n + 1;

    let mut c = vec![0.0; len];
    c[0] = 1.0;
    for i in 1..=m {
        // divide by (1 - q^i)
        for k in i..len {
            c[k] += c[k - i];
        }
        // multiply by (1 - q^(n + i))
        let shift = n + i;
        for k in (shift..len).rev() {
            c[k] -= c[k - shift];
        }
    }
    c
}

fn asymptotic_two_sided(u: f64, n1: usize, n2: usize, tie_sizes: &[usize]) -> f64 {
    let n = (n1 + n2) as f64;
    let n1n2 = (n1 * n2) as f64;
    let mu = n1n2 / 2.0;

    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = n1n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return 1.0;
    }

    let z = (u - mu - 0.5) / variance.sqrt();
    2.0 * normal_sf(z)
}
