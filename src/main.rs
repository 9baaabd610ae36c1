use anyhow::{Context, Result};
use abtest::{cli::Cli, config::AnalysisConfig, experiment};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_overrides(base);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let input = experiment::Input::from_args(
        args.workbook.clone(),
        args.control.clone(),
        args.test.clone(),
    )?;

    let report = experiment::run(&input, &config)?;
    let output = report
        .render(args.format)
        .context("Failed to render report")?;
    println!("{}", output);

    Ok(())
}
