//! abtest - A/B significance analysis for ad-bidding strategies
//!
//! Compares a control group (maximum bidding) with a test group (average
//! bidding): descriptive summary and ratios, Shapiro-Wilk and Levene
//! assumption checks, then a Student/Welch t-test or Mann-Whitney U test
//! depending on which assumptions hold.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod experiment;
pub mod hypothesis;
pub mod metrics;
pub mod report;
pub mod summary;
