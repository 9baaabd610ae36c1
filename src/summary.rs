//! Descriptive summary of each group (the `describe()` table)
//!
//! Uses trueno::Vector for SIMD mean/stddev/min/max and aprender's
//! DescriptiveStats for quartiles (R-7 interpolation).
//! Both work in f32, which is ample for display; the hypothesis tests run on
//! the f64 samples directly.

use crate::dataset::{Column, Dataset, Group};
use crate::metrics::Metric;
use anyhow::{Context, Result};
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use trueno::Vector;

/// Count, location and spread of one column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarize the non-missing values of a column
    pub fn from_values(column: Column, values: &[f64]) -> Result<Self> {
        let present: Vec<f32> = values
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| v as f32)
            .collect();
        let count = present.len();

        if count == 0 {
            return Ok(Self {
                column,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                median: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            });
        }

        let v = Vector::from_slice(&present);
        let mean = v.mean().context("Failed to compute mean")?;
        let min = v.min().context("Failed to compute min")?;
        let max = v.max().context("Failed to compute max")?;

        // trueno's stddev divides by n; rescale to the sample estimate
        let std = if count > 1 {
            let population = v.stddev().context("Failed to compute stddev")?;
            f64::from(population) * (count as f64 / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        let stats = DescriptiveStats::new(&v);
        let p25 = stats
            .quantile(0.25)
            .map_err(|e| anyhow::anyhow!("Failed to compute 25th percentile: {}", e))?;
        let median = stats
            .quantile(0.5)
            .map_err(|e| anyhow::anyhow!("Failed to compute median: {}", e))?;
        let p75 = stats
            .quantile(0.75)
            .map_err(|e| anyhow::anyhow!("Failed to compute 75th percentile: {}", e))?;

        Ok(Self {
            column,
            count,
            mean: f64::from(mean),
            std,
            min: f64::from(min),
            p25: f64::from(p25),
            median: f64::from(median),
            p75: f64::from(p75),
            max: f64::from(max),
        })
    }
}

/// Ratio of two column means (e.g. total clicks over total impressions)
#[derive(Debug, Clone, Serialize)]
pub struct RatioSummary {
    pub metric: Metric,
    pub value: f64,
}

/// Everything printed about one group before the hypothesis tests
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group: Group,
    pub source: String,
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub missing: Vec<(Column, usize)>,
    pub ratios: Vec<RatioSummary>,
}

impl GroupSummary {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let columns = Column::ALL
            .iter()
            .map(|&column| ColumnSummary::from_values(column, &dataset.column(column)))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to summarize {} group", dataset.group()))?;

        let mut summary = Self {
            group: dataset.group(),
            source: dataset.source().to_string(),
            rows: dataset.len(),
            columns,
            missing: dataset.missing_counts(),
            ratios: Vec::new(),
        };

        summary.ratios = [
            Metric::ClickThroughRate,
            Metric::PurchasePerClick,
            Metric::EarningPerClick,
        ]
        .iter()
        .filter_map(|&metric| {
            let (numerator, denominator) = metric.ratio()?;
            Some(RatioSummary {
                metric,
                value: summary.ratio_of_means(numerator, denominator),
            })
        })
        .collect();

        Ok(summary)
    }

    pub fn column(&self, column: Column) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// mean(numerator) / mean(denominator)
    pub fn ratio_of_means(&self, numerator: Column, denominator: Column) -> f64 {
        match (self.column(numerator), self.column(denominator)) {
            (Some(n), Some(d)) if d.mean != 0.0 => n.mean / d.mean,
            _ => f64::NAN,
        }
    }

    pub fn ratio(&self, metric: Metric) -> Option<f64> {
        self.ratios
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.value)
    }

    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Observation;

    fn fixture() -> Dataset {
        Dataset::new(
            Group::Test,
            "fixture",
            vec![
                Observation::new(1000.0, 50.0, 5.0, 200.0),
                Observation::new(2000.0, 70.0, 9.0, 400.0),
                Observation::new(3000.0, 90.0, 10.0, 300.0),
                Observation::new(2000.0, 110.0, 12.0, 500.0),
            ],
        )
    }

    #[test]
    fn test_column_summary_basic() {
        let s = ColumnSummary::from_values(Column::Click, &[50.0, 70.0, 90.0, 110.0]).unwrap();
        assert_eq!(s.count, 4);
        assert!((s.mean - 80.0).abs() < 1e-4);
        assert_eq!(s.min, 50.0);
        assert_eq!(s.max, 110.0);
        // Sample std: sqrt(((30^2 + 10^2) * 2) / 3) = sqrt(2000 / 3)
        assert!((s.std - (2000.0_f64 / 3.0).sqrt()).abs() < 1e-3);
        assert!((s.median - 80.0).abs() < 1e-4);
        // R-7: position 0.75 between 50 and 70
        assert!((s.p25 - 65.0).abs() < 1e-4);
        assert!((s.p75 - 95.0).abs() < 1e-4);
    }

    #[test]
    fn test_column_summary_skips_missing() {
        let s = ColumnSummary::from_values(Column::Purchase, &[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.mean - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_column_summary_all_missing() {
        let s = ColumnSummary::from_values(Column::Purchase, &[f64::NAN]).unwrap();
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
    }

    #[test]
    fn test_ratio_of_means_matches_manual_arithmetic() {
        let summary = GroupSummary::from_dataset(&fixture()).unwrap();

        // mean(Click) = 80, mean(Impression) = 2000
        let ctr = summary.ratio(Metric::ClickThroughRate).unwrap();
        assert!((ctr - 0.04).abs() < 1e-6, "ctr = {ctr}");

        // mean(Earning) = 350, mean(Click) = 80
        let epc = summary.ratio(Metric::EarningPerClick).unwrap();
        assert!((epc - 4.375).abs() < 1e-5, "epc = {epc}");

        // mean(Purchase) = 9
        let ppc = summary.ratio(Metric::PurchasePerClick).unwrap();
        assert!((ppc - 0.1125).abs() < 1e-6, "ppc = {ppc}");
    }

    #[test]
    fn test_group_summary_reports_missing() {
        let ds = Dataset::new(
            Group::Control,
            "fixture",
            vec![
                Observation::new(1.0, f64::NAN, 1.0, 1.0),
                Observation::new(2.0, 1.0, f64::NAN, 1.0),
            ],
        );
        let summary = GroupSummary::from_dataset(&ds).unwrap();
        assert_eq!(summary.total_missing(), 2);
        assert_eq!(summary.column(Column::Click).unwrap().count, 1);
    }
}
