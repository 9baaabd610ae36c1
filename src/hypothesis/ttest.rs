// Independent two-sample t-tests
//
// Student's variant pools the variances (valid when Levene does not reject
// homogeneity). Welch's variant keeps them separate and uses the
// Welch-Satterthwaite degrees of freedom.
//
// H0: the two population means are equal. Two-sided p-values.

use super::outcome::{mean_variance, require_len, Result, StatsError, TestOutcome};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// t statistic, degrees of freedom and two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub outcome: TestOutcome,
    pub df: f64,
}

/// Two-sample t-test; `equal_var` selects Student (true) or Welch (false)
///
/// The statistic is positive when the first sample has the larger mean.
///
/// # Example
/// ```
/// use abtest::hypothesis::ttest_ind;
///
/// let control = [10.0, 12.0, 11.0, 13.0, 10.0];
/// let test = [25.0, 27.0, 26.0, 28.0, 25.0];
///
/// let result = ttest_ind(&control, &test, false).unwrap();
/// assert!(result.outcome.statistic < 0.0);
/// assert!(result.outcome.pvalue < 0.05);
/// ```
pub fn ttest_ind(a: &[f64], b: &[f64], equal_var: bool) -> Result<TTest> {
    require_len(a, 2)?;
    require_len(b, 2)?;

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (m1, v1) = mean_variance(a);
    let (m2, v2) = mean_variance(b);

    let (se, df) = if equal_var {
        let df = n1 + n2 - 2.0;
        let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
        ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
    } else {
        let q1 = v1 / n1;
        let q2 = v2 / n2;
        let df = (q1 + q2).powi(2) / (q1.powi(2) / (n1 - 1.0) + q2.powi(2) / (n2 - 1.0));
        ((q1 + q2).sqrt(), df)
    };

    if se == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let t = (m1 - m2) / se;
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let pvalue = 2.0 * dist.sf(t.abs());

    Ok(TTest {
        outcome: TestOutcome::new(t, pvalue),
        df,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_statistic_by_hand() {
        // means 2 and 5, variances 1 and 1: pooled = 1, se = sqrt(2/3)
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let result = ttest_ind(&a, &b, true).unwrap();
        let expected = -3.0 / (2.0_f64 / 3.0).sqrt();
        assert!((result.outcome.statistic - expected).abs() < 1e-12);
        assert_eq!(result.df, 4.0);
    }

    #[test]
    fn test_welch_equals_student_for_equal_sizes_and_variances() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [3.0, 4.0, 5.0, 6.0];
        let student = ttest_ind(&a, &b, true).unwrap();
        let welch = ttest_ind(&a, &b, false).unwrap();
        assert!((student.outcome.statistic - welch.outcome.statistic).abs() < 1e-12);
        assert!((student.df - welch.df).abs() < 1e-9);
    }

    #[test]
    fn test_pvalue_at_critical_value() {
        // t = 2.228 is the 97.5% quantile of t(10)
        let dist = StudentsT::new(0.0, 1.0, 10.0).unwrap();
        let p = 2.0 * dist.sf(2.228);
        assert!((p - 0.05).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_no_difference() {
        let a = [10.0, 12.0, 11.0, 13.0, 10.0];
        let b = [11.0, 13.0, 10.0, 12.0, 11.0];
        let result = ttest_ind(&a, &b, false).unwrap();
        assert!(result.outcome.pvalue >= 0.05);
    }

    #[test]
    fn test_zero_variance_is_an_error() {
        assert_eq!(
            ttest_ind(&[1.0, 1.0], &[1.0, 1.0], true),
            Err(StatsError::ZeroVariance)
        );
    }

    #[test]
    fn test_insufficient_samples() {
        assert!(ttest_ind(&[1.0], &[1.0, 2.0], false).is_err());
    }
}
