//! Run a dispatch experiment from a JSON config and export the results.
//!
//! Run with: cargo run -p dispatch_experiments --bin run_dispatch -- --config study/experiment.json

use std::path::PathBuf;

use clap::Parser;
use dispatch_experiments::{export_replications, run_experiment, ExperimentConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "run_dispatch", about = "Emergency fleet dispatch simulation")]
struct Cli {
    /// Experiment config (JSON).
    #[arg(short, long)]
    config: PathBuf,
    /// Overrides the config's output directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Overrides the config's worker thread count.
    #[arg(short, long)]
    threads: Option<usize>,
    /// Hide the progress bar.
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let cli = Cli::parse();
    let mut config = ExperimentConfig::load(&cli.config)?;
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if cli.threads.is_some() {
        config.threads = cli.threads;
    }
    if cli.quiet {
        config.show_progress = false;
    }

    let results = run_experiment(&config)?;
    let files = export_replications(&results, &config.output_dir)?;

    for result in &results {
        let summary = &result.summary;
        info!(
            replication = summary.replication,
            incidents = summary.incidents,
            unmet_slots = summary.unmet_slots,
            complete = summary.is_complete(),
            mean_response_secs = ?summary.mean_response_secs,
            coverage = ?summary.coverage_by_type,
            "replication summary"
        );
    }
    println!(
        "{} replication(s) written to {} ({} files)",
        results.len(),
        config.output_dir.display(),
        files.len()
    );
    Ok(())
}
