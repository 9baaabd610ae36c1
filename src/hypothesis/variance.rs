// Levene's test for homogeneity of variance
//
// Each observation is replaced by its absolute deviation from the group
// center; a one-way ANOVA on those deviations gives an F statistic with
// (k - 1, N - k) degrees of freedom. Centering on the median (Brown-Forsythe)
// is robust to non-normal data.
//
// H0: all groups have equal variances.

use super::outcome::{require_len, Result, StatsError, TestOutcome};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use std::fmt;

/// Location each group's deviations are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LeveneCenter {
    /// Brown-Forsythe variant
    #[default]
    Median,
    /// Levene's original formulation
    Mean,
}

impl fmt::Display for LeveneCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeveneCenter::Median => f.write_str("median"),
            LeveneCenter::Mean => f.write_str("mean"),
        }
    }
}

/// Levene's W statistic and p-value across two or more groups
///
/// # Example
/// ```
/// use abtest::hypothesis::{levene, LeveneCenter};
///
/// let narrow = [9.8, 10.1, 10.0, 9.9, 10.2];
/// let wide = [4.0, 16.0, 7.5, 13.0, 10.0];
/// let outcome = levene(&[&narrow, &wide], LeveneCenter::Median).unwrap();
/// assert!(outcome.statistic > 0.0);
/// ```
pub fn levene(groups: &[&[f64]], center: LeveneCenter) -> Result<TestOutcome> {
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InsufficientData {
            required: 2,
            actual: k,
        });
    }
    for group in groups {
        require_len(group, 2)?;
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|group| {
            let c = match center {
                LeveneCenter::Median => median(group),
                LeveneCenter::Mean => group.iter().sum::<f64>() / group.len() as f64,
            };
            group.iter().map(|x| (x - c).abs()).collect()
        })
        .collect();

    let total: usize = deviations.iter().map(Vec::len).sum();
    let group_means: Vec<f64> = deviations
        .iter()
        .map(|z| z.iter().sum::<f64>() / z.len() as f64)
        .collect();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zbar)| z.len() as f64 * (zbar - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zbar)| z.iter().map(|zij| (zij - zbar).powi(2)).sum::<f64>())
        .sum();

    if within == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let w = (df_within / df_between) * (between / within);

    let f = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| StatsError::Distribution(e.to_string()))?;

    Ok(TestOutcome::new(w, f.sf(w)))
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
