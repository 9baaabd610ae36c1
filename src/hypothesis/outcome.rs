// Shared result and error types for the hypothesis tests

use serde::Serialize;
use statrs::distribution::Normal;
use thiserror::Error;

/// Errors raised when a sample cannot support a test
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("All observations are identical (zero range)")]
    ZeroRange,

    #[error("Both samples have zero variance")]
    ZeroVariance,

    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Result type for hypothesis tests
pub type Result<T> = std::result::Result<T, StatsError>;

/// Test statistic and two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub pvalue: f64,
}

impl TestOutcome {
    pub fn new(statistic: f64, pvalue: f64) -> Self {
        Self {
            statistic,
            pvalue: pvalue.clamp(0.0, 1.0),
        }
    }

    /// H0 is rejected when p < alpha
    pub fn rejects_null(&self, alpha: f64) -> bool {
        self.pvalue < alpha
    }
}

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| StatsError::Distribution(e.to_string()))
}

pub(crate) fn require_len(sample: &[f64], required: usize) -> Result<()> {
    if sample.len() < required {
        return Err(StatsError::InsufficientData {
            required,
            actual: sample.len(),
        });
    }
    Ok(())
}

/// Arithmetic mean and unbiased (n - 1) variance
pub(crate) fn mean_variance(sample: &[f64]) -> (f64, f64) {
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let ss: f64 = sample.iter().map(|x| (x - mean).powi(2)).sum();
    (mean, ss / (n - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_clamps_pvalue() {
        assert_eq!(TestOutcome::new(1.0, 1.0000001).pvalue, 1.0);
        assert_eq!(TestOutcome::new(1.0, -1e-18).pvalue, 0.0);
    }

    #[test]
    fn test_rejects_null_is_strict() {
        let outcome = TestOutcome::new(2.0, 0.05);
        assert!(!outcome.rejects_null(0.05));
        assert!(outcome.rejects_null(0.051));
    }

    #[test]
    fn test_mean_variance() {
        let (mean, var) = mean_variance(&[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(mean, 5.0);
        assert!((var - 20.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_require_len() {
        assert!(require_len(&[1.0, 2.0], 3).is_err());
        assert!(require_len(&[1.0, 2.0, 3.0], 3).is_ok());
    }
}
