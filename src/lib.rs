//! news-dedup - Parallel News Article Deduplication
//!
//! Reads a batch of JSON article files, drops every article whose id or
//! title is not unique across the whole batch, then builds per-language and
//! per-category id lists plus English keyword frequencies.
//!
//! # Features
//!
//! - **Phased Worker Pool**: A fixed number of threads move through ingest,
//!   count, filter and aggregate together, separated by a reusable barrier.
//!
//! - **Dynamic Partitioning**: Work inside a phase is claimed one unit at a
//!   time from an atomic cursor, so a slow file never stalls its peers.
//!
//! - **Deterministic Output**: Every result file is sorted, so the output
//!   is identical for any worker count.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              articles manifest + auxiliary manifest              │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ inputs::load_inputs
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Worker Threads                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │Worker 0 │  │Worker 1 │  │Worker 2 │  ...    │Worker N │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       └────────────┴─────┬──────┴────────────────────┘          │
//! │                          ▼                                      │
//! │            ┌──────────────────────────┐                         │
//! │            │       SharedState        │                         │
//! │            │  raw, frequency tables,  │                         │
//! │            │  clean, indexes          │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ output::write_all
//!                               ▼
//!               ┌───────────────────────────────┐
//!               │ <lang>.txt  <category>.txt    │
//!               │ all_articles.txt              │
//!               │ keywords_count.txt            │
//!               │ reports.txt                   │
//!               └───────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! news-dedup 8 data/articles.txt data/inputs.txt -o results/
//! ```

pub mod config;
pub mod error;
pub mod inputs;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

pub use config::{CliArgs, RunConfig};
pub use error::{PipelineError, Result};
pub use model::Article;
pub use pipeline::{execute, Phase, RunStats, SharedState, WorkerPool};
