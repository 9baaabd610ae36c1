// Mann-Whitney U (Wilcoxon rank-sum) test
//
// Distribution-free alternative to the t-test, used when normality fails.
// The statistic reported is U for the first sample. Without ties, the exact
// null distribution is used whenever at least one sample is small; otherwise
// the normal approximation with tie-corrected variance and a continuity
// correction.
//
// H0: the two samples come from the same distribution. Two-sided.

use super::outcome::{require_len, standard_normal, Result, TestOutcome};
use statrs::distribution::ContinuousCDF;

/// The exact distribution is used when either sample is at most this size
pub const EXACT_MAX_N: usize = 8;

/// How the p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMethod {
    Exact,
    Asymptotic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MannWhitney {
    pub outcome: TestOutcome,
    pub method: RankMethod,
}

/// Two-sided Mann-Whitney U test
///
/// # Example
/// ```
/// use abtest::hypothesis::mann_whitney_u;
///
/// let control = [1.1, 2.2, 3.3, 4.4];
/// let test = [5.5, 6.6, 7.7, 8.8, 9.9];
/// let result = mann_whitney_u(&control, &test).unwrap();
/// assert_eq!(result.outcome.statistic, 0.0);
/// assert!(result.outcome.pvalue < 0.05);
/// ```
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<MannWhitney> {
    require_len(a, 1)?;
    require_len(b, 1)?;

    let n1 = a.len();
    let n2 = b.len();

    let combined: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, tie_sizes) = rank_with_ties(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let has_ties = tie_sizes.iter().any(|&t| t > 1);

    if (n1 <= EXACT_MAX_N || n2 <= EXACT_MAX_N) && !has_ties {
        let pvalue = 2.0 * exact_sf(u as usize, n1, n2);
        return Ok(MannWhitney {
            outcome: TestOutcome::new(u1, pvalue),
            method: RankMethod::Exact,
        });
    }

    let n = (n1 + n2) as f64;
    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let mu = (n1 * n2) as f64 / 2.0;
    let sigma = ((n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();

    let pvalue = if sigma > 0.0 {
        let z = (u - mu - 0.5) / sigma;
        2.0 * standard_normal()?.sf(z)
    } else {
        1.0
    };

    Ok(MannWhitney {
        outcome: TestOutcome::new(u1, pvalue),
        method: RankMethod::Asymptotic,
    })
}

/// Average ranks (1-based) plus the size of every tie block
fn rank_with_ties(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sizes = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let average = (start + end) as f64 / 2.0 + 1.0;
        for &index in &order[start..=end] {
            ranks[index] = average;
        }
        tie_sizes.push(end - start + 1);
        start = end + 1;
    }

    (ranks, tie_sizes)
}

/// P(U >= u) under H0, counting rank arrangements
fn exact_sf(u: usize, n1: usize, n2: usize) -> f64 {
    let max_u = n1 * n2;
    if u > max_u {
        return 0.0;
    }
    let counts = u_distribution(n1, n2);
    let total: f64 = counts.iter().sum();
    counts[u..].iter().sum::<f64>() / total
}

/// Number of arrangements giving each U value.
///
/// These are the coefficients of the Gaussian binomial [m + n choose m]_q,
/// built as prod_{i=1..m} (1 - q^(n+i)) / (1 - q^i) with m the smaller size,
/// so the cost stays O(m^2 n) when one sample is large.
fn u_distribution(n1: usize, n2: usize) -> Vec<f64> {
    let (m, n) = (n1.min(n2), n1.max(n2));
    let mut counts = vec![0.0; m * n + 1];
    counts[0] = 1.0;

    for i in 1..=m {
        // counts holds [n + i - 1 choose i - 1]_q; the product has degree i * n
        let degree = i * n;
        for u in i..=degree {
            counts[u] += counts[u - i];
        }
        for u in (n + i..=degree).rev() {
            counts[u] -= counts[u - (n + i)];
        }
    }

    counts
}
