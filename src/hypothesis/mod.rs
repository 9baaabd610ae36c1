// Assumption checks and two-sample hypothesis tests
//
// Decision procedure for comparing a metric between the control and test
// groups:
// 1. Shapiro-Wilk on each group (normality)
// 2. Levene across groups (variance homogeneity), only if both are normal
// 3. Student t, Welch t, or Mann-Whitney U depending on 1 and 2
//
// Every test reports (statistic, p-value); H0 is rejected when p < alpha.
// All arithmetic is f64; the distributions come from statrs.

mod normality;
mod outcome;
mod rank;
mod selector;
mod ttest;
mod variance;

pub use normality::shapiro_wilk;
pub use outcome::{StatsError, TestOutcome};
pub use rank::{mann_whitney_u, MannWhitney, RankMethod};
pub use selector::{
    assess_metric, check_assumptions, run_test, select_test, AssumptionCheck, HomogeneityCheck,
    MetricAssessment, NormalityCheck, TestKind, Verdict,
};
pub use ttest::{ttest_ind, TTest};
pub use variance::{levene, LeveneCenter};
