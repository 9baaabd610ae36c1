//! Load both groups, summarize them and assess each configured metric

use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, Group};
use crate::hypothesis::assess_metric;
use crate::report::ExperimentReport;
use crate::summary::GroupSummary;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Where the two group tables come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// One spreadsheet, one sheet per group
    Workbook(PathBuf),
    /// One CSV file per group
    Csv { control: PathBuf, test: PathBuf },
}

impl Input {
    /// Resolve the command-line input combination
    pub fn from_args(
        workbook: Option<PathBuf>,
        control: Option<PathBuf>,
        test: Option<PathBuf>,
    ) -> Result<Self> {
        match (workbook, control, test) {
            (Some(workbook), None, None) => Ok(Input::Workbook(workbook)),
            (None, Some(control), Some(test)) => Ok(Input::Csv { control, test }),
            (Some(_), _, _) => {
                anyhow::bail!("Cannot combine WORKBOOK with --control/--test. Choose one.")
            }
            (None, None, None) => anyhow::bail!(
                "Must specify either WORKBOOK or both --control and --test. \
                 Usage: abtest ab_testing.xlsx or abtest --control control.csv --test test.csv"
            ),
            (None, _, _) => anyhow::bail!("--control and --test must be given together"),
        }
    }

    /// Load the control and test tables
    pub fn load(&self, config: &AnalysisConfig) -> Result<(Dataset, Dataset)> {
        match self {
            Input::Workbook(path) => {
                let control = Dataset::from_workbook(path, &config.sheets.control, Group::Control)
                    .context("Failed to load control group")?;
                let test = Dataset::from_workbook(path, &config.sheets.test, Group::Test)
                    .context("Failed to load test group")?;
                Ok((control, test))
            }
            Input::Csv { control, test } => {
                let control = Dataset::from_csv(control, Group::Control)
                    .context("Failed to load control group")?;
                let test =
                    Dataset::from_csv(test, Group::Test).context("Failed to load test group")?;
                Ok((control, test))
            }
        }
    }
}

/// Summarize both groups and assess every configured metric
pub fn analyze(
    control: &Dataset,
    test: &Dataset,
    config: &AnalysisConfig,
) -> Result<ExperimentReport> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let control_summary = GroupSummary::from_dataset(control)?;
    let test_summary = GroupSummary::from_dataset(test)?;

    for summary in [&control_summary, &test_summary] {
        let missing = summary.total_missing();
        if missing > 0 {
            tracing::warn!(
                group = %summary.group,
                missing,
                "Missing values will be dropped per metric"
            );
        }
    }

    let assessments = config
        .metrics
        .iter()
        .map(|&metric| assess_metric(metric, control, test, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(ExperimentReport {
        significance_level: config.significance_level,
        control: control_summary,
        test: test_summary,
        assessments,
    })
}

/// Load the input and run the full analysis
pub fn run(input: &Input, config: &AnalysisConfig) -> Result<ExperimentReport> {
    let (control, test) = input.load(config)?;
    analyze(&control, &test, config)
}
