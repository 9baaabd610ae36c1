// Configuration for the bidding-strategy analysis
//
// Loaded from TOML; every field has a default so a partial file (or no file)
// works. Command-line flags are applied on top in main.rs.

use crate::hypothesis::LeveneCenter;
use crate::metrics::Metric;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sheet names used when reading a workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub control: String,
    pub test: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            control: "Control Group".to_string(),
            test: "Test Group".to_string(),
        }
    }
}

/// Configuration for assumption checks and hypothesis tests
///
/// # Example
/// ```
/// use abtest::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level (alpha) shared by every test
    ///
    /// - 0.05 (default): 95% confidence
    /// - 0.01: stricter, fewer false positives
    /// - 0.10: looser, fewer false negatives
    pub significance_level: f64,

    /// Minimum observations per group for a metric
    ///
    /// Shapiro-Wilk needs at least 3.
    pub min_sample_size: usize,

    /// Center used by Levene's test
    pub levene_center: LeveneCenter,

    /// Metrics to compare, in report order
    pub metrics: Vec<Metric>,

    pub sheets: SheetNames,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: 3,
            levene_center: LeveneCenter::Median,
            metrics: Metric::DEFAULT.to_vec(),
            sheets: SheetNames::default(),
        }
    }
}

impl AnalysisConfig {
    /// 99% confidence
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            ..Self::default()
        }
    }

    /// 90% confidence
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file doesn't exist or has invalid TOML syntax.
    /// Values are not validated here: command-line overrides are applied
    /// first, then the caller runs [`AnalysisConfig::validate`].
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if self.min_sample_size < 3 {
            return Err(format!(
                "min_sample_size must be >= 3 for Shapiro-Wilk, got {}",
                self.min_sample_size
            ));
        }

        if self.metrics.is_empty() {
            return Err("metrics must name at least one metric".to_string());
        }

        if self.sheets.control.trim().is_empty() || self.sheets.test.trim().is_empty() {
            return Err("sheet names must not be empty".to_string());
        }

        Ok(())
    }
}
