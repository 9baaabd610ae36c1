// Test selection: assumption checks decide between parametric and
// non-parametric comparison
//
//   normal | homogeneous | test
//   -------+-------------+-----------------------------
//   yes    | yes         | Student t (pooled variance)
//   yes    | no          | Welch t
//   no     | (skipped)   | Mann-Whitney U
//
// "Normal" requires both groups to pass Shapiro-Wilk.

use super::normality::shapiro_wilk;
use super::outcome::{mean_variance, Result as StatsResult, StatsError, TestOutcome};
use super::rank::mann_whitney_u;
use super::ttest::ttest_ind;
use super::variance::{levene, LeveneCenter};
use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, Group};
use crate::metrics::Metric;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

/// Two-sample test applied to a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Independent two-sample t-test, equal variances
    StudentT,
    /// Independent two-sample t-test, unequal variances
    WelchT,
    /// Wilcoxon rank-sum
    MannWhitneyU,
}

impl TestKind {
    pub fn is_parametric(&self) -> bool {
        !matches!(self, TestKind::MannWhitneyU)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestKind::StudentT => "Independent two-sample t-test (equal variances)",
            TestKind::WelchT => "Welch's t-test (unequal variances)",
            TestKind::MannWhitneyU => "Mann-Whitney U test",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the comparison test from the assumption results
///
/// `homogeneous` is `None` when homogeneity was not tested, which only
/// happens when normality already failed.
pub fn select_test(normal: bool, homogeneous: Option<bool>) -> TestKind {
    match (normal, homogeneous) {
        (false, _) => TestKind::MannWhitneyU,
        (true, Some(false)) => TestKind::WelchT,
        (true, _) => TestKind::StudentT,
    }
}

/// Shapiro-Wilk result for one group
#[derive(Debug, Clone, Serialize)]
pub struct NormalityCheck {
    pub group: Group,
    pub outcome: TestOutcome,
    pub normal: bool,
}

/// Levene result across both groups
#[derive(Debug, Clone, Serialize)]
pub struct HomogeneityCheck {
    pub center: LeveneCenter,
    pub outcome: TestOutcome,
    pub homogeneous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssumptionCheck {
    pub normality: [NormalityCheck; 2],
    pub homogeneity: Option<HomogeneityCheck>,
}

impl AssumptionCheck {
    pub fn normal(&self) -> bool {
        self.normality.iter().all(|check| check.normal)
    }

    pub fn homogeneous(&self) -> Option<bool> {
        self.homogeneity.as_ref().map(|check| check.homogeneous)
    }

    pub fn selected_test(&self) -> TestKind {
        select_test(self.normal(), self.homogeneous())
    }
}

/// Run Shapiro-Wilk on each group, then Levene if both look normal
pub fn check_assumptions(
    control: &[f64],
    test: &[f64],
    config: &AnalysisConfig,
) -> StatsResult<AssumptionCheck> {
    let alpha = config.significance_level;
    let normality_of = |group: Group, sample: &[f64]| -> StatsResult<NormalityCheck> {
        let outcome = shapiro_wilk(sample)?;
        Ok(NormalityCheck {
            group,
            outcome,
            normal: !outcome.rejects_null(alpha),
        })
    };

    let normality = [
        normality_of(Group::Control, control)?,
        normality_of(Group::Test, test)?,
    ];

    let homogeneity = if normality.iter().all(|check| check.normal) {
        let outcome = levene(&[control, test], config.levene_center)?;
        Some(HomogeneityCheck {
            center: config.levene_center,
            outcome,
            homogeneous: !outcome.rejects_null(alpha),
        })
    } else {
        None
    };

    Ok(AssumptionCheck {
        normality,
        homogeneity,
    })
}

/// Apply the chosen two-sample test
pub fn run_test(kind: TestKind, control: &[f64], test: &[f64]) -> StatsResult<TestOutcome> {
    let outcome = match kind {
        TestKind::StudentT => ttest_ind(control, test, true)?.outcome,
        TestKind::WelchT => ttest_ind(control, test, false)?.outcome,
        TestKind::MannWhitneyU => mann_whitney_u(control, test)?.outcome,
    };
    Ok(outcome)
}

/// Decision on H0 for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Verdict {
    /// p < alpha: the groups differ; `leader` has the higher mean
    Significant { leader: Group },
    /// p >= alpha: H0 cannot be rejected
    NotSignificant,
}

/// Full assessment of one metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricAssessment {
    pub metric: Metric,
    pub control_n: usize,
    pub test_n: usize,
    pub control_mean: f64,
    pub test_mean: f64,
    pub assumptions: AssumptionCheck,
    pub test: TestKind,
    pub outcome: TestOutcome,
    pub verdict: Verdict,
}

/// Check assumptions, select the test and decide on H0 for `metric`
///
/// # Example
/// ```
/// use abtest::config::AnalysisConfig;
/// use abtest::dataset::{Dataset, Group, Observation};
/// use abtest::hypothesis::assess_metric;
/// use abtest::metrics::Metric;
///
/// let rows = |purchases: &[f64]| -> Vec<Observation> {
///     purchases.iter().map(|&p| Observation::new(1000.0, 50.0, p, 100.0)).collect()
/// };
/// let control = Dataset::new(Group::Control, "control", rows(&[9.0, 10.0, 11.0, 10.5, 9.5, 10.2]));
/// let test = Dataset::new(Group::Test, "test", rows(&[9.2, 10.1, 10.9, 10.4, 9.6, 10.0]));
///
/// let assessment =
///     assess_metric(Metric::Purchase, &control, &test, &AnalysisConfig::default()).unwrap();
/// assert!(assessment.test.is_parametric());
/// ```
pub fn assess_metric(
    metric: Metric,
    control: &Dataset,
    test: &Dataset,
    config: &AnalysisConfig,
) -> Result<MetricAssessment> {
    let control_sample = metric.sample(control);
    let test_sample = metric.sample(test);

    for (group, sample) in [(Group::Control, &control_sample), (Group::Test, &test_sample)] {
        if sample.len() < config.min_sample_size {
            let err = StatsError::InsufficientData {
                required: config.min_sample_size,
                actual: sample.len(),
            };
            return Err(anyhow::Error::new(err)
                .context(format!("{} sample for {} is too small", group, metric)));
        }
    }

    let assumptions = check_assumptions(&control_sample, &test_sample, config)
        .with_context(|| format!("Assumption checks failed for {}", metric))?;

    let kind = assumptions.selected_test();
    tracing::info!(
        metric = metric.name(),
        normal = assumptions.normal(),
        homogeneous = ?assumptions.homogeneous(),
        "Selected {}",
        kind
    );

    let outcome = run_test(kind, &control_sample, &test_sample)
        .with_context(|| format!("{} failed for {}", kind, metric))?;

    let (control_mean, _) = mean_variance(&control_sample);
    let (test_mean, _) = mean_variance(&test_sample);

    let verdict = if outcome.rejects_null(config.significance_level) {
        let leader = if test_mean > control_mean {
            Group::Test
        } else {
            Group::Control
        };
        Verdict::Significant { leader }
    } else {
        Verdict::NotSignificant
    };

    Ok(MetricAssessment {
        metric,
        control_n: control_sample.len(),
        test_n: test_sample.len(),
        control_mean,
        test_mean,
        assumptions,
        test: kind,
        outcome,
        verdict,
    })
}
