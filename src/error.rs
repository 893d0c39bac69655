//! Error types for news-dedup
//!
//! This module defines the error hierarchy for a batch run:
//! - Configuration errors (CLI arguments, manifests, list files)
//! - Ingestion errors (a single article file that cannot be loaded)
//! - Worker errors (barrier breaks, panics, spawn failures)
//! - Output errors (writing result files)
//!
//! Ingestion errors never abort a run: the pool logs them and moves on, so
//! they never reach `PipelineError`. Worker errors are always fatal.
//! Configuration errors surface before the pool starts.

use crate::pipeline::Phase;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Output stage errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Configuration, manifest and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// A manifest or list file could not be read
    #[error("Cannot read '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest is missing a required line
    #[error("Manifest '{path}' is missing its {what}")]
    MissingEntry { path: PathBuf, what: &'static str },

    /// Output directory error
    #[error("Invalid output directory '{path}': {reason}")]
    InvalidOutputDir { path: PathBuf, reason: String },
}

/// Failure to load one article file
#[derive(Error, Debug)]
pub enum IngestError {
    /// File missing or unreadable
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a JSON array of article objects
    #[error("Malformed article file '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    /// Path of the file that failed to load
    pub fn path(&self) -> &PathBuf {
        match self {
            IngestError::Read { path, .. } => path,
            IngestError::Malformed { path, .. } => path,
        }
    }
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker count rejected by the pool
    #[error("Worker pool needs at least one worker")]
    EmptyPool,

    /// Worker thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// A peer left the barrier; no results from this run can be trusted
    #[error("Barrier broken while worker {id} was finishing {phase} phase")]
    BarrierBroken { id: usize, phase: Phase },
}

/// Output stage errors
#[derive(Error, Debug)]
pub enum OutputError {
    /// Failed to write a result file
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for IngestError
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Result type alias for OutputError
pub type OutputResult<T> = std::result::Result<T, OutputError>;
