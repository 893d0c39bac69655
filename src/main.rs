//! news-dedup - Parallel News Article Deduplication
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use news_dedup::config::{CliArgs, RunConfig};
use news_dedup::inputs::load_inputs;
use news_dedup::output::write_all;
use news_dedup::pipeline::{SharedState, WorkerPool};
use news_dedup::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.articles_manifest.display().to_string(),
            config.worker_count,
            &config.output_dir.display().to_string(),
        );
    }

    let inputs = load_inputs(&config.articles_manifest, &config.aux_manifest)
        .context("Failed to load input manifests")?;
    let state = Arc::new(SharedState::new(inputs));

    let pool = WorkerPool::new(config.worker_count).context("Failed to create worker pool")?;

    let stats = if config.show_progress {
        let reporter = Arc::new(ProgressReporter::new());
        reporter.set_status("Starting workers...");

        let for_callback = Arc::clone(&reporter);
        let result = pool.run_with_progress(&state, move |progress| for_callback.update(&progress));

        match &result {
            Ok(_) => reporter.finish("Pipeline completed"),
            Err(_) => reporter.finish("Pipeline failed"),
        }
        result
    } else {
        pool.run(&state)
    }
    .context("Pipeline failed")?;

    let summary = write_all(&state, &config.output_dir).context("Failed to write results")?;

    if config.show_progress {
        print_summary(&stats, &summary.report, &config.output_dir);
    }

    if stats.files_skipped > 0 {
        info!(skipped = stats.files_skipped, "Run completed with skipped files");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("news_dedup=debug,warn")
    } else {
        EnvFilter::new("news_dedup=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
