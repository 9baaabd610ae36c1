//! Metrics compared between the two bidding strategies
//!
//! A metric is either a raw column or a row-wise ratio of two columns. Drawing
//! a sample drops non-finite values: missing cells and rows where the
//! denominator is zero.

use crate::dataset::{Column, Dataset, Observation};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Impression,
    Click,
    Purchase,
    Earning,
    /// Click / Impression
    #[value(alias = "ctr")]
    ClickThroughRate,
    /// Purchase / Click
    PurchasePerClick,
    /// Earning / Click
    #[value(alias = "epc")]
    EarningPerClick,
}

impl Metric {
    /// The three questions asked of the bidding experiment
    pub const DEFAULT: [Metric; 3] = [
        Metric::Purchase,
        Metric::ClickThroughRate,
        Metric::EarningPerClick,
    ];

    /// Numerator and denominator columns for ratio metrics
    pub fn ratio(&self) -> Option<(Column, Column)> {
        match self {
            Metric::ClickThroughRate => Some((Column::Click, Column::Impression)),
            Metric::PurchasePerClick => Some((Column::Purchase, Column::Click)),
            Metric::EarningPerClick => Some((Column::Earning, Column::Click)),
            _ => None,
        }
    }

    pub fn column(&self) -> Option<Column> {
        match self {
            Metric::Impression => Some(Column::Impression),
            Metric::Click => Some(Column::Click),
            Metric::Purchase => Some(Column::Purchase),
            Metric::Earning => Some(Column::Earning),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Impression => "Impression",
            Metric::Click => "Click",
            Metric::Purchase => "Purchase",
            Metric::Earning => "Earning",
            Metric::ClickThroughRate => "Click/Impression",
            Metric::PurchasePerClick => "Purchase/Click",
            Metric::EarningPerClick => "Earning/Click",
        }
    }

    /// Value of this metric for one row (NaN or infinite when undefined)
    pub fn value(&self, row: &Observation) -> f64 {
        match (self.column(), self.ratio()) {
            (Some(column), _) => row.get(column),
            (None, Some((numerator, denominator))) => row.get(numerator) / row.get(denominator),
            (None, None) => f64::NAN,
        }
    }

    /// Per-row values with non-finite entries dropped
    pub fn sample(&self, dataset: &Dataset) -> Vec<f64> {
        let sample: Vec<f64> = dataset
            .rows()
            .iter()
            .map(|row| self.value(row))
            .filter(|v| v.is_finite())
            .collect();

        let dropped = dataset.len() - sample.len();
        if dropped > 0 {
            tracing::debug!(
                metric = self.name(),
                group = %dataset.group(),
                dropped,
                "Dropped non-finite values from sample"
            );
        }

        sample
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
