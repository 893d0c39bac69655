//! Configuration types for news-dedup
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//!
//! Everything here is checked before the worker pool starts; a run never
//! begins with a bad worker count or a missing manifest.

use crate::error::ConfigError;
use crate::pipeline::MAX_WORKERS;
use clap::Parser;
use std::path::PathBuf;

/// Parallel news-article deduplication and aggregation
#[derive(Parser, Debug, Clone)]
#[command(
    name = "news-dedup",
    version,
    about = "Deduplicate news articles and build language, category and keyword views",
    long_about = "Reads every article file listed in the articles manifest with a pool of worker \
                  threads, drops articles whose id or title is not unique, then writes per-language \
                  and per-category id lists, an article list, keyword counts and a summary report.",
    after_help = "EXAMPLES:\n    \
        news-dedup 4 data/articles.txt data/inputs.txt\n    \
        news-dedup 8 data/articles.txt data/inputs.txt -o results/\n    \
        news-dedup 1 data/articles.txt data/inputs.txt -q"
)]
pub struct CliArgs {
    /// Number of worker threads
    #[arg(value_name = "THREADS")]
    pub workers: usize,

    /// Manifest listing the article JSON files (count header, one path per line)
    #[arg(value_name = "ARTICLES")]
    pub articles: PathBuf,

    /// Manifest naming the language, category and excluded-word list files
    #[arg(value_name = "AUX")]
    pub aux: PathBuf,

    /// Directory for result files
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Quiet mode - suppress header, progress and summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of worker threads
    pub worker_count: usize,

    /// Articles manifest path
    pub articles_manifest: PathBuf,

    /// Auxiliary manifest path
    pub aux_manifest: PathBuf,

    /// Where result files are written
    pub output_dir: PathBuf,

    /// Show header, spinner and summary
    pub show_progress: bool,
}

impl RunConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        for manifest in [&args.articles, &args.aux] {
            if !manifest.is_file() {
                return Err(ConfigError::Unreadable {
                    path: manifest.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
        }

        if !args.output_dir.is_dir() {
            return Err(ConfigError::InvalidOutputDir {
                path: args.output_dir.clone(),
                reason: "directory does not exist".to_string(),
            });
        }

        Ok(Self {
            worker_count: args.workers,
            articles_manifest: args.articles,
            aux_manifest: args.aux,
            output_dir: args.output_dir,
            show_progress: !args.quiet,
        })
    }
}
