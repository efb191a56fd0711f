//! Contingency tables and association tests
//!
//! Chi-square test of independence (with expected counts) and Fisher's exact
//! test for 2x2 tables.

use std::collections::BTreeMap;

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::factorial::ln_binomial;

/// Relative tolerance when collecting tables "as or more extreme" than the
/// observed one in Fisher's exact test.
const FISHER_RELATIVE_TOLERANCE: f64 = 1e-7;

/// Cross-tabulated counts. Rows and columns are ordered by sorted label value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<i64>,
    pub col_labels: Vec<i64>,
    pub counts: Vec<Vec<u64>>,
}

/// Outcome of the chi-square test of independence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
}

/// Outcome of Fisher's exact test (two-sided)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FisherTest {
    /// Sample odds ratio `(n00 * n11) / (n01 * n10)`
    pub odds_ratio: f64,
    pub p_value: f64,
}

impl ContingencyTable {
    /// Cross-tabulate paired observations.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut cells: BTreeMap<(i64, i64), u64> = BTreeMap::new();
        for pair in pairs {
            *cells.entry(pair).or_insert(0) += 1;
        }

        let mut row_labels: Vec<i64> = cells.keys().map(|(r, _)| *r).collect();
        row_labels.dedup();
        let mut col_labels: Vec<i64> = cells.keys().map(|(_, c)| *c).collect();
        col_labels.sort_unstable();
        col_labels.dedup();

        let counts = row_labels
            .iter()
            .map(|r| {
                col_labels
                    .iter()
                    .map(|c| cells.get(&(*r, *c)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            row_labels,
            col_labels,
            counts,
        }
    }

    /// Build a table directly from counts, labelling rows and columns 0..n.
    pub fn from_counts(counts: Vec<Vec<u64>>) -> Self {
        let rows = counts.len();
        let cols = counts.first().map(|r| r.len()).unwrap_or(0);
        Self {
            row_labels: (0..rows as i64).collect(),
            col_labels: (0..cols as i64).collect(),
            counts,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    pub fn is_2x2(&self) -> bool {
        self.shape() == (2, 2)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn row_sums(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    fn col_sums(&self) -> Vec<u64> {
        let (_, cols) = self.shape();
        (0..cols)
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    /// Expected counts under independence: `row_sum * col_sum / total`.
    pub fn expected_counts(&self) -> Vec<Vec<f64>> {
        let total = self.total() as f64;
        let col_sums = self.col_sums();
        self.row_sums()
            .iter()
            .map(|&r| {
                col_sums
                    .iter()
                    .map(|&c| {
                        if total > 0.0 {
                            r as f64 * c as f64 / total
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Smallest expected count over all cells.
    pub fn min_expected_count(&self) -> f64 {
        self.expected_counts()
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Pearson chi-square test of independence.
    ///
    /// With `yates` set, tables with one degree of freedom get the continuity
    /// correction. Returns `None` when any expected count is zero.
    pub fn chi_square(&self, yates: bool) -> Option<ChiSquareTest> {
        let (rows, cols) = self.shape();
        if rows == 0 || cols == 0 {
            return None;
        }
        let dof = (rows - 1) * (cols - 1);
        let expected = self.expected_counts();
        if expected.iter().flatten().any(|&e| e <= 0.0) {
            return None;
        }
        if dof == 0 {
            return Some(ChiSquareTest {
                statistic: 0.0,
                p_value: 1.0,
                dof,
            });
        }

        let correct = yates && dof == 1;
        let mut statistic = 0.0;
        for (obs_row, exp_row) in self.counts.iter().zip(expected.iter()) {
            for (&obs, &exp) in obs_row.iter().zip(exp_row.iter()) {
                let mut diff = (obs as f64 - exp).abs();
                if correct {
                    diff -= diff.min(0.5);
                }
                statistic += diff * diff / exp;
            }
        }

        let dist = ChiSquared::new(dof as f64).ok()?;
        Some(ChiSquareTest {
            statistic,
            p_value: dist.sf(statistic),
            dof,
        })
    }

    /// Two-sided Fisher's exact test. Only defined for 2x2 tables.
    pub fn fisher_exact(&self) -> Option<FisherTest> {
        if !self.is_2x2() {
            return None;
        }
        let c = &self.counts;
        let (a, b, cc, d) = (c[0][0], c[0][1], c[1][0], c[1][1]);

        if self.row_sums().contains(&0) || self.col_sums().contains(&0) {
            return Some(FisherTest {
                odds_ratio: f64::NAN,
                p_value: 1.0,
            });
        }

        let odds_ratio = if b > 0 && cc > 0 {
            (a * d) as f64 / (b * cc) as f64
        } else {
            f64::INFINITY
        };

        // Condition on margins: x = n00 ~ Hypergeometric(N, row0, col0)
        let row0 = a + b;
        let row1 = cc + d;
        let col0 = a + cc;
        let total = row0 + row1;

        let ln_denominator = ln_binomial(total, col0);
        let pmf = |x: u64| -> f64 {
            (ln_binomial(row0, x) + ln_binomial(row1, col0 - x) - ln_denominator).exp()
        };

        let lo = col0.saturating_sub(row1);
        let hi = row0.min(col0);
        let observed = pmf(a);
        let cutoff = observed * (1.0 + FISHER_RELATIVE_TOLERANCE);

        let p_value: f64 = (lo..=hi).map(pmf).filter(|&p| p <= cutoff).sum();

        Some(FisherTest {
            odds_ratio,
            p_value: p_value.min(1.0),
        })
    }

    /// Odds ratio `(n11 / n10) / (n01 / n00)` for a 2x2 table.
    pub fn odds_ratio(&self) -> Option<f64> {
        if !self.is_2x2() {
            return None;
        }
        let c = &self.counts;
        let (n00, n01, n10, n11) = (
            c[0][0] as f64,
            c[0][1] as f64,
            c[1][0] as f64,
            c[1][1] as f64,
        );
        Some((n11 / n10) / (n01 / n00))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorted_labels() {
        let table = ContingencyTable::from_pairs(vec![(3, 1), (1, 0), (3, 0), (1, 0), (2, 1)]);
        assert_eq!(table.row_labels, vec![1, 2, 3]);
        assert_eq!(table.col_labels, vec![0, 1]);
        assert_eq!(table.counts, vec![vec![2, 0], vec![0, 1], vec![1, 1]]);
        assert_eq!(table.total(), 5);
    }

    #[test]
    fn test_expected_counts() {
        let table = ContingencyTable::from_counts(vec![vec![50, 2], vec![3, 45]]);
        let expected = table.expected_counts();
        assert!((expected[0][0] - 27.56).abs() < 1e-9);
        assert!((expected[0][1] - 24.44).abs() < 1e-9);
        assert!((expected[1][0] - 25.44).abs() < 1e-9);
        assert!((expected[1][1] - 22.56).abs() < 1e-9);
        assert!((table.min_expected_count() - 22.56).abs() < 1e-9);
    }

    #[test]
    fn test_chi_square_with_yates() {
        let table = ContingencyTable::from_counts(vec![vec![50, 2], vec![3, 45]]);
        let result = table.chi_square(true).unwrap();
        assert_eq!(result.dof, 1);
        // |O - E| = 22.44 everywhere, corrected to 21.94
        let expected_stat = 21.94f64.powi(2)
            * (1.0 / 27.56 + 1.0 / 24.44 + 1.0 / 25.44 + 1.0 / 22.56);
        assert!((result.statistic - expected_stat).abs() < 1e-9);
        assert!(result.p_value < 1e-10);
    }

    #[test]
    fn test_chi_square_without_correction_larger() {
        let table = ContingencyTable::from_counts(vec![vec![20, 15], vec![10, 25]]);
        let corrected = table.chi_square(true).unwrap();
        let raw = table.chi_square(false).unwrap();
        assert!(raw.statistic > corrected.statistic);
    }

    #[test]
    fn test_chi_square_three_by_two_has_two_dof() {
        let table =
            ContingencyTable::from_counts(vec![vec![10, 12], vec![14, 9], vec![11, 13]]);
        let result = table.chi_square(true).unwrap();
        assert_eq!(result.dof, 2);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_chi_square_zero_expected() {
        let table = ContingencyTable::from_counts(vec![vec![0, 0], vec![3, 4]]);
        assert!(table.chi_square(true).is_none());
    }

    #[test]
    fn test_fisher_small_table() {
        let table = ContingencyTable::from_counts(vec![vec![8, 1], vec![0, 1]]);
        let result = table.fisher_exact().unwrap();
        assert!(result.odds_ratio.is_infinite());
        assert!((result.p_value - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_fisher_tea_tasting() {
        // Classic lady-tasting-tea table
        let table = ContingencyTable::from_counts(vec![vec![3, 1], vec![1, 3]]);
        let result = table.fisher_exact().unwrap();
        assert!((result.odds_ratio - 9.0).abs() < 1e-12);
        assert!((result.p_value - 34.0 / 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_fisher_rejects_non_2x2() {
        let table = ContingencyTable::from_counts(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert!(table.fisher_exact().is_none());
    }

    #[test]
    fn test_manual_odds_ratio() {
        let table = ContingencyTable::from_counts(vec![vec![50, 2], vec![3, 45]]);
        let or = table.odds_ratio().unwrap();
        assert!((or - 375.0).abs() < 1e-9);
    }
}
