//! Console and JSON rendering of the experiment results

use crate::dataset::Group;
use crate::hypothesis::{MetricAssessment, TestOutcome, Verdict};
use crate::metrics::Metric;
use crate::summary::GroupSummary;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// One JSON document for machine parsing
    Json,
}

/// Everything the analysis produced
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub significance_level: f64,
    pub control: GroupSummary,
    pub test: GroupSummary,
    pub assessments: Vec<MetricAssessment>,
}

impl ExperimentReport {
    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_report_string()),
            OutputFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "=== A/B Test: {} ({}) vs {} ({}) ===\n\n",
            Group::Control,
            self.control.source,
            Group::Test,
            self.test.source
        ));

        for summary in [&self.control, &self.test] {
            report.push_str(&describe(summary));
        }
        report.push_str(&self.ratios());

        for assessment in &self.assessments {
            report.push_str(&assessment_section(assessment, self.significance_level));
        }

        report
    }

    fn ratios(&self) -> String {
        let mut section = format!(
            "{:<18} {:>12} {:>12}\n",
            "Ratio of means", "control", "test"
        );
        for metric in [
            Metric::ClickThroughRate,
            Metric::PurchasePerClick,
            Metric::EarningPerClick,
        ] {
            let control = self.control.ratio(metric).unwrap_or(f64::NAN);
            let test = self.test.ratio(metric).unwrap_or(f64::NAN);
            section.push_str(&format!(
                "{:<18} {:>12.5} {:>12.5}\n",
                metric.name(),
                control,
                test
            ));
        }
        section.push('\n');
        section
    }
}

fn describe(summary: &GroupSummary) -> String {
    let mut section = format!(
        "📊 Descriptive statistics: {} group ({} rows)\n",
        summary.group, summary.rows
    );
    section.push_str(&format!(
        "{:<11} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    ));
    for c in &summary.columns {
        section.push_str(&format!(
            "{:<11} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            c.column.header(),
            c.count,
            c.mean,
            c.std,
            c.min,
            c.p25,
            c.median,
            c.p75,
            c.max
        ));
    }

    if summary.total_missing() == 0 {
        section.push_str("Missing values: none\n\n");
    } else {
        let missing: Vec<String> = summary
            .missing
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(column, n)| format!("{}={}", column, n))
            .collect();
        section.push_str(&format!("Missing values: {}\n\n", missing.join(", ")));
    }

    section
}

fn stat_line(outcome: &TestOutcome) -> String {
    format!(
        "Test Stat = {:.4}, p-value = {:.4}",
        outcome.statistic, outcome.pvalue
    )
}

fn h0_label(holds: bool) -> &'static str {
    if holds {
        "H0 cannot be rejected"
    } else {
        "H0 rejected"
    }
}

fn assessment_section(assessment: &MetricAssessment, alpha: f64) -> String {
    let metric = assessment.metric;
    let mut section = format!("--- {} ---\n", metric);
    section.push_str(&format!(
        "n: control={}, test={}; mean: control={:.5}, test={:.5}\n",
        assessment.control_n, assessment.test_n, assessment.control_mean, assessment.test_mean
    ));

    section.push_str("Normality (Shapiro-Wilk, H0: normal distribution)\n");
    for check in &assessment.assumptions.normality {
        section.push_str(&format!(
            "  {:<8} {} -> {}\n",
            format!("{}:", check.group),
            stat_line(&check.outcome),
            h0_label(check.normal)
        ));
    }

    match &assessment.assumptions.homogeneity {
        Some(check) => {
            section.push_str(&format!(
                "Variance homogeneity (Levene, center={}, H0: equal variances)\n",
                check.center
            ));
            section.push_str(&format!(
                "  {} -> {}\n",
                stat_line(&check.outcome),
                h0_label(check.homogeneous)
            ));
        }
        None => {
            section.push_str("Variance homogeneity: skipped (normality not satisfied)\n");
        }
    }

    section.push_str(&format!("{} (H0: M1 = M2)\n", assessment.test));
    section.push_str(&format!("  {}\n", stat_line(&assessment.outcome)));

    let conclusion = match assessment.verdict {
        Verdict::Significant { leader } => format!(
            "H0 rejected: statistically significant difference in {} (p < {}); {} group is higher",
            metric, alpha, leader
        ),
        Verdict::NotSignificant => format!(
            "H0 cannot be rejected: no statistically significant difference in {} (alpha = {})",
            metric, alpha
        ),
    };
    section.push_str(&format!("Conclusion: {}\n\n", conclusion));

    section
}
