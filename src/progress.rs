//! Progress reporting for the pipeline
//!
//! Provides real-time progress display using indicatif progress bars.

use crate::output::Report;
use crate::pipeline::{PoolProgress, RunStats};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner showing the current phase and how far it has got
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &PoolProgress) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_message(progress: &PoolProgress) -> String {
    let phase = match progress.phase {
        Some(phase) => phase.name(),
        None => "done",
    };

    format!(
        "Phase: {} | {}/{} | Rate: {:.0}/s | Skipped files: {} | Workers: {}",
        phase,
        format_number(progress.claimed as u64),
        format_number(progress.total as u64),
        progress.rate(),
        format_number(progress.files_skipped),
        progress.workers,
    )
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the run
pub fn print_summary(stats: &RunStats, report: &Report, output_dir: &Path) {
    let duration_secs = stats.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.raw_records as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Run Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {} of {} ({})",
        style("Files:").bold(),
        format_number(stats.files_loaded),
        format_number(stats.files_total as u64),
        format_size(stats.bytes_read, BINARY)
    );
    println!(
        "  {} {}",
        style("Articles:").bold(),
        format_number(stats.raw_records as u64)
    );
    println!(
        "  {} {}",
        style("Unique:").bold(),
        format_number(report.unique_articles as u64)
    );
    println!(
        "  {} {}",
        style("Duplicates:").bold(),
        format_number(report.duplicates_found as u64)
    );
    if let Some((keyword, count)) = &report.top_keyword {
        println!(
            "  {} {} ({})",
            style("Top keyword:").bold(),
            keyword,
            format_number(*count as u64)
        );
    }
    println!(
        "  {} {:.1}s ({:.0} articles/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            style("Skipped files:").yellow().bold(),
            format_number(stats.files_skipped)
        );
    }
    println!("  {} {}", style("Output:").bold(), output_dir.display());
    println!();
}

/// Print a header at the start of the run
pub fn print_header(articles: &str, workers: usize, output: &str) {
    println!();
    println!(
        "{} {}",
        style("news-dedup").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Articles:").bold(), articles);
    println!(
        "  {} {} ({} CPUs)",
        style("Workers:").bold(),
        workers,
        num_cpus::get()
    );
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Phase;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_progress_message() {
        let progress = PoolProgress {
            phase: Some(Phase::Filter),
            claimed: 1200,
            total: 5000,
            files_skipped: 2,
            workers: 8,
            elapsed: Duration::ZERO,
        };
        assert_eq!(
            progress_message(&progress),
            "Phase: filter | 1,200/5,000 | Rate: 0/s | Skipped files: 2 | Workers: 8"
        );
    }

    #[test]
    fn test_progress_message_when_done() {
        let progress = PoolProgress {
            workers: 1,
            ..Default::default()
        };
        assert!(progress_message(&progress).starts_with("Phase: done | 0/0"));
    }
}
