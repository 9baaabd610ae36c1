//! CLI argument parsing for abtest

use crate::config::AnalysisConfig;
use crate::hypothesis::LeveneCenter;
use crate::metrics::Metric;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "abtest")]
#[command(version)]
#[command(
    about = "Compare two bidding strategies: assumption checks, test selection, significance",
    long_about = None
)]
pub struct Cli {
    /// Spreadsheet (.xlsx, .xls, .ods) with one sheet per group
    #[arg(value_name = "WORKBOOK")]
    pub workbook: Option<PathBuf>,

    /// Control group CSV (use with --test instead of WORKBOOK)
    #[arg(long = "control", value_name = "CSV")]
    pub control: Option<PathBuf>,

    /// Test group CSV (use with --control instead of WORKBOOK)
    #[arg(long = "test", value_name = "CSV")]
    pub test: Option<PathBuf>,

    /// Sheet holding the control group (default: "Control Group")
    #[arg(long = "control-sheet", value_name = "NAME")]
    pub control_sheet: Option<String>,

    /// Sheet holding the test group (default: "Test Group")
    #[arg(long = "test-sheet", value_name = "NAME")]
    pub test_sheet: Option<String>,

    /// Metric to compare; repeat for several (default: purchase, ctr, epc)
    #[arg(short = 'm', long = "metric", value_enum, value_name = "METRIC")]
    pub metrics: Vec<Metric>,

    /// Significance level for every test (default: 0.05)
    #[arg(short = 'a', long = "alpha", value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Center for Levene's test (default: median)
    #[arg(long = "levene-center", value_enum, value_name = "CENTER")]
    pub levene_center: Option<LeveneCenter>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a base configuration
    pub fn apply_overrides(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(alpha) = self.alpha {
            config.significance_level = alpha;
        }
        if let Some(center) = self.levene_center {
            config.levene_center = center;
        }
        if !self.metrics.is_empty() {
            config.metrics = self.metrics.clone();
        }
        if let Some(sheet) = &self.control_sheet {
            config.sheets.control = sheet.clone();
        }
        if let Some(sheet) = &self.test_sheet {
            config.sheets.test = sheet.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_workbook() {
        let cli = Cli::parse_from(["abtest", "ab_testing.xlsx"]);
        assert_eq!(cli.workbook, Some(PathBuf::from("ab_testing.xlsx")));
        assert!(cli.control.is_none());
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn test_cli_parses_csv_pair() {
        let cli = Cli::parse_from(["abtest", "--control", "c.csv", "--test", "t.csv"]);
        assert!(cli.workbook.is_none());
        assert_eq!(cli.control, Some(PathBuf::from("c.csv")));
        assert_eq!(cli.test, Some(PathBuf::from("t.csv")));
    }

    #[test]
    fn test_cli_repeated_metrics_and_aliases() {
        let cli = Cli::parse_from(["abtest", "ab.xlsx", "-m", "ctr", "--metric", "epc"]);
        assert_eq!(
            cli.metrics,
            vec![Metric::ClickThroughRate, Metric::EarningPerClick]
        );
    }

    #[test]
    fn test_cli_json_format() {
        let cli = Cli::parse_from(["abtest", "ab.xlsx", "--format", "json"]);
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_cli_debug_default_false() {
        let cli = Cli::parse_from(["abtest", "ab.xlsx"]);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_rejects_unknown_metric() {
        assert!(Cli::try_parse_from(["abtest", "ab.xlsx", "-m", "bounce-rate"]).is_err());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "abtest",
            "ab.xlsx",
            "--alpha",
            "0.01",
            "--levene-center",
            "mean",
            "--metric",
            "purchase",
            "--test-sheet",
            "Average Bidding",
        ]);
        let config = cli.apply_overrides(AnalysisConfig::default());
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.levene_center, LeveneCenter::Mean);
        assert_eq!(config.metrics, vec![Metric::Purchase]);
        assert_eq!(config.sheets.control, "Control Group");
        assert_eq!(config.sheets.test, "Average Bidding");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = Cli::parse_from(["abtest", "ab.xlsx"]);
        let base = AnalysisConfig::permissive();
        assert_eq!(cli.apply_overrides(base.clone()), base);
    }
}
