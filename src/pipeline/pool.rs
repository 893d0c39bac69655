//! Fixed-size worker pool driving the four-phase protocol
//!
//! Every worker runs the same loop:
//!
//! ```text
//! INGEST ─▶ barrier ─▶ COUNT ─▶ barrier ─▶ FILTER ─▶ barrier ─▶ AGGREGATE ─▶ barrier ─▶ DONE
//! ```
//!
//! Inside a phase a worker claims indices from that phase's cursor until the
//! bound is reached, then parks on the barrier. Bounds are read after the
//! preceding barrier, when the table they measure is frozen.
//!
//! A worker that returns early or panics drops its [`AbortOnDrop`] guard,
//! which breaks the barrier; peers then leave with
//! [`WorkerError::BarrierBroken`] and the pool reports the failure.

use crate::error::{Result, WorkerError};
use crate::pipeline::barrier::{AbortOnDrop, PhaseBarrier};
use crate::pipeline::processor::{aggregate_record, count_record, filter_record};
use crate::pipeline::source::{ArticleSource, JsonFileSource};
use crate::pipeline::state::{PipelineInputs, SharedState};
use crate::pipeline::Phase;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Published phase value once every worker has finished
const PHASE_DONE: usize = Phase::ALL.len();

/// Ingest counters shared by all workers
#[derive(Debug, Default)]
pub struct IngestStats {
    /// Files parsed successfully
    pub files_loaded: AtomicU64,

    /// Files skipped (missing, unreadable, malformed)
    pub files_skipped: AtomicU64,

    /// Bytes read from successfully parsed files
    pub bytes_read: AtomicU64,
}

impl IngestStats {
    fn record_loaded(&self, bytes: u64) {
        self.files_loaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.files_loaded.store(0, Ordering::Relaxed);
        self.files_skipped.store(0, Ordering::Relaxed);
        self.bytes_read.store(0, Ordering::Relaxed);
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub workers: usize,
    pub files_total: usize,
    pub files_loaded: u64,
    pub files_skipped: u64,
    pub bytes_read: u64,
    pub raw_records: usize,
    pub clean_records: usize,
    pub duration: Duration,
}

impl RunStats {
    /// Records excluded as duplicates
    pub fn duplicates(&self) -> usize {
        self.raw_records - self.clean_records
    }
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct PoolProgress {
    /// Phase currently running, `None` once finished
    pub phase: Option<Phase>,

    /// Units claimed in the current phase
    pub claimed: usize,

    /// Units available in the current phase
    pub total: usize,

    pub files_skipped: u64,
    pub workers: usize,
    pub elapsed: Duration,
}

impl PoolProgress {
    /// Units per second for the current phase counter
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.claimed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Pool of identical workers sharing one `SharedState`
pub struct WorkerPool {
    worker_count: usize,
    source: Arc<dyn ArticleSource>,
    stats: Arc<IngestStats>,
    phase: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create a pool of `worker_count` workers reading JSON files
    pub fn new(worker_count: usize) -> std::result::Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::EmptyPool);
        }

        Ok(Self {
            worker_count,
            source: Arc::new(JsonFileSource),
            stats: Arc::new(IngestStats::default()),
            phase: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Replace the loader used during ingest
    pub fn with_source(mut self, source: Arc<dyn ArticleSource>) -> Self {
        self.source = source;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Snapshot of the pool's progress against `state`
    pub fn progress(&self, state: &SharedState, elapsed: Duration) -> PoolProgress {
        progress_snapshot(
            state,
            &self.phase,
            &self.stats,
            self.worker_count,
            elapsed,
        )
    }

    /// Run all four phases to completion.
    ///
    /// Blocks until every worker has crossed the final barrier. Any worker
    /// failure fails the whole run.
    pub fn run(&self, state: &Arc<SharedState>) -> Result<RunStats> {
        let start = Instant::now();
        self.stats.reset();
        self.phase.store(0, Ordering::Relaxed);

        info!(
            workers = self.worker_count,
            files = state.inputs.files.len(),
            "Starting pipeline"
        );

        let barrier = Arc::new(PhaseBarrier::new(self.worker_count));
        let handles = self.spawn_workers(state, &barrier)?;
        self.join_workers(handles)?;

        let stats = RunStats {
            workers: self.worker_count,
            files_total: state.inputs.files.len(),
            files_loaded: self.stats.files_loaded.load(Ordering::Relaxed),
            files_skipped: self.stats.files_skipped.load(Ordering::Relaxed),
            bytes_read: self.stats.bytes_read.load(Ordering::Relaxed),
            raw_records: state.raw_records.len(),
            clean_records: state.clean_records.len(),
            duration: start.elapsed(),
        };

        info!(
            raw = stats.raw_records,
            unique = stats.clean_records,
            duplicates = stats.duplicates(),
            skipped_files = stats.files_skipped,
            duration_ms = stats.duration.as_millis() as u64,
            "Pipeline completed"
        );

        Ok(stats)
    }

    /// Run while invoking `progress_callback` every 100ms from a reporter
    /// thread
    pub fn run_with_progress<F>(&self, state: &Arc<SharedState>, progress_callback: F) -> Result<RunStats>
    where
        F: Fn(PoolProgress) + Send + 'static,
    {
        let start = Instant::now();
        let done = Arc::new(AtomicBool::new(false));

        let progress_handle = {
            let done = Arc::clone(&done);
            let state = Arc::clone(state);
            let phase = Arc::clone(&self.phase);
            let stats = Arc::clone(&self.stats);
            let workers = self.worker_count;

            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    progress_callback(progress_snapshot(&state, &phase, &stats, workers, start.elapsed()));
                    thread::sleep(Duration::from_millis(100));
                }
            })
        };

        let result = self.run(state);

        done.store(true, Ordering::SeqCst);
        let _ = progress_handle.join();

        result
    }

    fn spawn_workers(
        &self,
        state: &Arc<SharedState>,
        barrier: &Arc<PhaseBarrier>,
    ) -> Result<Vec<JoinHandle<std::result::Result<(), WorkerError>>>> {
        let mut handles = Vec::with_capacity(self.worker_count);

        for id in 0..self.worker_count {
            let state = Arc::clone(state);
            let barrier_for_worker = Arc::clone(barrier);
            let source = Arc::clone(&self.source);
            let stats = Arc::clone(&self.stats);
            let phase = Arc::clone(&self.phase);

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || {
                    let guard = AbortOnDrop::new(&barrier_for_worker);
                    let result = worker_loop(
                        id,
                        &state,
                        source.as_ref(),
                        &barrier_for_worker,
                        &stats,
                        &phase,
                    );
                    if result.is_ok() {
                        guard.disarm();
                    }
                    result
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Peers already running would wait for a worker that never comes
                    barrier.abort();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(WorkerError::SpawnFailed {
                        id,
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
        }

        debug!(count = handles.len(), "Workers spawned");
        Ok(handles)
    }

    fn join_workers(&self, handles: Vec<JoinHandle<std::result::Result<(), WorkerError>>>) -> Result<()> {
        let mut root_cause: Option<WorkerError> = None;
        let mut broken: Option<WorkerError> = None;

        for (id, handle) in handles.into_iter().enumerate() {
            let failure = match handle.join() {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(payload) => WorkerError::Panicked {
                    id,
                    message: panic_message(payload.as_ref()),
                },
            };

            error!(worker = id, error = %failure, "Worker failed");
            // Peers released by a broken barrier are a symptom; keep the cause
            if matches!(failure, WorkerError::BarrierBroken { .. }) {
                broken.get_or_insert(failure);
            } else {
                root_cause.get_or_insert(failure);
            }
        }

        match root_cause.or(broken) {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Per-worker protocol
fn worker_loop(
    id: usize,
    state: &SharedState,
    source: &dyn ArticleSource,
    barrier: &PhaseBarrier,
    stats: &IngestStats,
    published_phase: &AtomicUsize,
) -> std::result::Result<(), WorkerError> {
    debug!(worker = id, "Worker started");

    for phase in Phase::ALL {
        let units = run_phase(id, phase, state, source, stats);
        debug!(worker = id, phase = %phase, units = units, "Phase work finished");

        match barrier.wait() {
            Ok(true) => {
                published_phase.store(phase.index() + 1, Ordering::Relaxed);
                debug!(phase = %phase, "All workers crossed barrier");
            }
            Ok(false) => {}
            Err(_) => return Err(WorkerError::BarrierBroken { id, phase }),
        }
    }

    debug!(worker = id, "Worker finished");
    Ok(())
}

/// Process every unit this worker claims in `phase`, returning how many
fn run_phase(
    id: usize,
    phase: Phase,
    state: &SharedState,
    source: &dyn ArticleSource,
    stats: &IngestStats,
) -> usize {
    let cursor = state.cursor(phase);
    let mut units = 0;

    match phase {
        Phase::Ingest => {
            let files = &state.inputs.files;
            while let Some(idx) = cursor.claim_below(files.len()) {
                let path = &files[idx];
                match source.load(path) {
                    Ok(loaded) => {
                        stats.record_loaded(loaded.bytes);
                        debug!(worker = id, path = %path.display(), records = loaded.articles.len(), "Loaded article file");
                        state.raw_records.extend(loaded.articles.into_iter().map(Arc::new));
                    }
                    Err(e) => {
                        stats.record_skipped();
                        warn!(worker = id, path = %e.path().display(), error = %e, "Skipping article file");
                    }
                }
                units += 1;
            }
        }
        Phase::Count => {
            let raw = state.raw_records.read();
            while let Some(idx) = cursor.claim_below(raw.len()) {
                count_record(state, &raw[idx]);
                units += 1;
            }
        }
        Phase::Filter => {
            let raw = state.raw_records.read();
            while let Some(idx) = cursor.claim_below(raw.len()) {
                filter_record(state, &raw[idx]);
                units += 1;
            }
        }
        Phase::Aggregate => {
            let clean = state.clean_records.read();
            while let Some(idx) = cursor.claim_below(clean.len()) {
                aggregate_record(state, &clean[idx]);
                units += 1;
            }
        }
    }

    units
}

fn progress_snapshot(
    state: &SharedState,
    published_phase: &AtomicUsize,
    stats: &IngestStats,
    workers: usize,
    elapsed: Duration,
) -> PoolProgress {
    let current = published_phase.load(Ordering::Relaxed);
    let phase = if current >= PHASE_DONE {
        None
    } else {
        Phase::from_index(current)
    };

    let (claimed, total) = match phase {
        Some(phase) => {
            let total = state.phase_bound(phase);
            (state.cursor(phase).claimed(total), total)
        }
        None => (0, 0),
    };

    PoolProgress {
        phase,
        claimed,
        total,
        files_skipped: stats.files_skipped.load(Ordering::Relaxed),
        workers,
        elapsed,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

/// Build a `SharedState` from `inputs` and run a pool of `workers` over it
pub fn execute(inputs: PipelineInputs, workers: usize) -> Result<(Arc<SharedState>, RunStats)> {
    let state = Arc::new(SharedState::new(inputs));
    let pool = WorkerPool::new(workers)?;
    let stats = pool.run(&state)?;
    Ok((state, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IngestError, IngestResult, PipelineError};
    use crate::model::Article;
    use crate::pipeline::source::LoadedFile;
    use std::path::{Path, PathBuf};

    /// Serves canned articles keyed by file name; unknown names fail
    struct FixtureSource {
        files: Vec<(&'static str, Vec<Article>)>,
    }

    impl ArticleSource for FixtureSource {
        fn load(&self, path: &Path) -> IngestResult<LoadedFile> {
            let name = path.to_string_lossy();
            self.files
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, articles)| LoadedFile {
                    articles: articles.clone(),
                    bytes: 10,
                })
                .ok_or_else(|| IngestError::Read {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no fixture"),
                })
        }
    }

    struct PanickingSource;

    impl ArticleSource for PanickingSource {
        fn load(&self, _path: &Path) -> IngestResult<LoadedFile> {
            panic!("loader exploded");
        }
    }

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.into(),
            title: title.into(),
            language: "english".into(),
            ..Default::default()
        }
    }

    fn inputs(files: &[&str]) -> PipelineInputs {
        PipelineInputs {
            files: files.iter().map(PathBuf::from).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(WorkerError::EmptyPool)));
    }

    #[test]
    fn test_unreadable_files_are_skipped() {
        let source = FixtureSource {
            files: vec![("good", vec![article("1", "X"), article("2", "Y")])],
        };
        let state = Arc::new(SharedState::new(inputs(&["good", "missing"])));
        let pool = WorkerPool::new(3).unwrap().with_source(Arc::new(source));

        let stats = pool.run(&state).unwrap();
        assert_eq!(stats.files_loaded, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.raw_records, 2);
        assert_eq!(stats.clean_records, 2);
        assert_eq!(stats.bytes_read, 10);
    }

    #[test]
    fn test_duplicate_id_across_files_drops_both() {
        let source = FixtureSource {
            files: vec![
                ("a", vec![article("A", "First"), article("B", "Second")]),
                ("b", vec![article("A", "Third")]),
            ],
        };
        let state = Arc::new(SharedState::new(inputs(&["a", "b"])));
        let pool = WorkerPool::new(2).unwrap().with_source(Arc::new(source));

        let stats = pool.run(&state).unwrap();
        assert_eq!(stats.raw_records, 3);
        assert_eq!(stats.duplicates(), 2);

        let clean = state.clean_snapshot();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].id, "B");
    }

    #[test]
    fn test_panicking_worker_fails_the_run() {
        let state = Arc::new(SharedState::new(inputs(&["a", "b", "c", "d"])));
        let pool = WorkerPool::new(4).unwrap().with_source(Arc::new(PanickingSource));

        let err = pool.run(&state).unwrap_err();
        match err {
            PipelineError::Worker(WorkerError::Panicked { message, .. }) => {
                assert_eq!(message, "loader exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_progress_reports_done_after_run() {
        let state = Arc::new(SharedState::new(inputs(&[])));
        let pool = WorkerPool::new(2).unwrap();

        let before = pool.progress(&state, Duration::ZERO);
        assert_eq!(before.phase, Some(Phase::Ingest));

        pool.run(&state).unwrap();
        let after = pool.progress(&state, Duration::from_secs(1));
        assert_eq!(after.phase, None);
        assert_eq!(after.workers, 2);
    }

    #[test]
    fn test_progress_rate() {
        let progress = PoolProgress {
            claimed: 500,
            elapsed: Duration::from_secs(5),
            ..Default::default()
        };
        assert!((progress.rate() - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_execute_with_no_files() {
        let (state, stats) = execute(inputs(&[]), 4).unwrap();
        assert_eq!(stats.raw_records, 0);
        assert!(state.clean_records.is_empty());
        assert!(state.keyword_frequency.is_empty());
    }
}
