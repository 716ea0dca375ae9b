use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::config::{WorkerConfig, WorkerMode};
use crate::matcher::CandidateStream;
use crate::metrics;

use super::pipeline::{panic_message, process_batch};
use super::types::{BatchFailure, BatchRequest, BatchStage, FailureKind, RankedBatch};

/// Runs a batch somewhere and hands back one response.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    /// Name of this execution strategy
    fn name(&self) -> &str;

    /// Run the batch to completion. No partial delivery, no retries.
    async fn execute(&self, request: BatchRequest) -> Result<RankedBatch, BatchFailure>;
}

/// Runs the pipeline directly on the calling task.
pub struct InlineExecutor;

impl InlineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InlineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchExecutor for InlineExecutor {
    fn name(&self) -> &str {
        "inline"
    }

    async fn execute(&self, request: BatchRequest) -> Result<RankedBatch, BatchFailure> {
        let started = Instant::now();
        let outcome = process_batch(request);
        observe_duration(self.name(), started);
        outcome
    }
}

/// Spawns one OS thread per batch and awaits its single response.
///
/// The request is moved into the thread; nothing is shared with it. A
/// worker that panics or exits without answering fails the batch.
pub struct WorkerExecutor {
    thread_name: String,
}

impl WorkerExecutor {
    pub fn new() -> Self {
        Self {
            thread_name: "streamsift-worker".to_string(),
        }
    }

    pub fn with_thread_name(name: impl Into<String>) -> Self {
        Self {
            thread_name: name.into(),
        }
    }

    /// Spawn a worker running `job` and wait for its answer.
    async fn run_on_worker<F>(&self, input_size: usize, job: F) -> Result<RankedBatch, BatchFailure>
    where
        F: FnOnce() -> Result<RankedBatch, BatchFailure> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                // The receiver may be gone if the caller timed out.
                let _ = tx.send(job());
            })
            .map_err(|e| {
                error!(error = %e, "Failed to spawn batch worker");
                metrics::BATCHES_TOTAL
                    .with_label_values(&[FailureKind::WorkerSpawn.as_str()])
                    .inc();
                BatchFailure::new(
                    FailureKind::WorkerSpawn,
                    format!("failed to spawn worker thread: {}", e),
                    BatchStage::Received,
                    input_size,
                )
            })?;

        debug!(thread = %self.thread_name, "Batch handed to worker");

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                // The sender was dropped without a message: the worker died.
                // Joining may still wait on thread teardown, so keep it off the runtime.
                let message = match tokio::task::spawn_blocking(move || handle.join()).await {
                    Ok(Err(payload)) => {
                        format!("worker panicked: {}", panic_message(payload.as_ref()))
                    }
                    Ok(Ok(())) => "worker exited without a response".to_string(),
                    Err(e) => format!("worker could not be joined: {}", e),
                };
                warn!(%message, "Batch worker terminated abnormally");
                metrics::BATCHES_TOTAL
                    .with_label_values(&[FailureKind::WorkerTerminated.as_str()])
                    .inc();
                Err(BatchFailure::new(
                    FailureKind::WorkerTerminated,
                    message,
                    BatchStage::PerItemProcessing,
                    input_size,
                ))
            }
        }
    }
}

impl Default for WorkerExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchExecutor for WorkerExecutor {
    fn name(&self) -> &str {
        "thread"
    }

    async fn execute(&self, request: BatchRequest) -> Result<RankedBatch, BatchFailure> {
        let started = Instant::now();
        let input_size = request.results.len();
        let outcome = self
            .run_on_worker(input_size, move || process_batch(request))
            .await;
        observe_duration(self.name(), started);
        outcome
    }
}

fn observe_duration(executor: &str, started: Instant) {
    metrics::BATCH_DURATION
        .with_label_values(&[executor])
        .observe(started.elapsed().as_secs_f64());
}

/// Factory function to create a batch executor from config
pub fn create_executor(config: &WorkerConfig) -> Box<dyn BatchExecutor> {
    match config.mode {
        WorkerMode::Inline => Box::new(InlineExecutor::new()),
        WorkerMode::Thread => Box::new(WorkerExecutor::new()),
    }
}

/// Run a batch under a caller-side deadline.
///
/// The deadline covers the whole call. An abandoned worker thread finishes
/// on its own and its answer is discarded.
pub async fn execute_with_timeout(
    executor: &dyn BatchExecutor,
    request: BatchRequest,
    timeout: Duration,
) -> Result<RankedBatch, BatchFailure> {
    let input_size = request.results.len();
    match tokio::time::timeout(timeout, executor.execute(request)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                executor = executor.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Batch timed out"
            );
            metrics::BATCHES_TOTAL
                .with_label_values(&[FailureKind::Timeout.as_str()])
                .inc();
            Err(BatchFailure::new(
                FailureKind::Timeout,
                format!("batch did not finish within {:?}", timeout),
                BatchStage::PerItemProcessing,
                input_size,
            ))
        }
    }
}

/// Run a batch and substitute an empty list on failure.
pub async fn rank_or_empty(executor: &dyn BatchExecutor, request: BatchRequest) -> Vec<CandidateStream> {
    match executor.execute(request).await {
        Ok(batch) => batch.candidates,
        Err(failure) => {
            error!(
                kind = %failure.kind,
                stage = %failure.stage,
                input_size = failure.input_size,
                error = %failure.message,
                "Batch failed, returning no candidates"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchStats;
    use crate::matcher::ExpectedMetadata;
    use crate::testing::fixtures::{batch_request, info_hash, raw_result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request() -> BatchRequest {
        batch_request(
            ExpectedMetadata::movie("The Matrix", Some(1999)),
            vec![
                raw_result("The.Matrix.1999.1080p.BluRay.x264-GROUP", "abc123"),
                raw_result("Heat.1995.720p", "def456"),
            ],
        )
    }

    #[test]
    fn test_create_executor_inline() {
        let config = WorkerConfig {
            mode: WorkerMode::Inline,
            ..Default::default()
        };
        assert_eq!(create_executor(&config).name(), "inline");
    }

    #[test]
    fn test_create_executor_thread() {
        let config = WorkerConfig {
            mode: WorkerMode::Thread,
            ..Default::default()
        };
        assert_eq!(create_executor(&config).name(), "thread");
    }

    #[tokio::test]
    async fn test_inline_and_worker_agree() {
        let inline = InlineExecutor::new().execute(request()).await.unwrap();
        let worker = WorkerExecutor::new().execute(request()).await.unwrap();

        let inline_hashes: Vec<_> = inline.candidates.iter().map(|c| c.info_hash.clone()).collect();
        let worker_hashes: Vec<_> = worker.candidates.iter().map(|c| c.info_hash.clone()).collect();
        assert_eq!(inline_hashes, vec![info_hash("abc123")]);
        assert_eq!(inline_hashes, worker_hashes);
    }

    #[tokio::test]
    async fn test_worker_forwards_batch_failure() {
        let mut req = request();
        req.config.max_result_count = 0;

        let failure = WorkerExecutor::new().execute(req).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidConfig);
        assert_eq!(failure.input_size, 2);
    }

    #[tokio::test]
    async fn test_worker_panic_is_terminated_failure() {
        let executor = WorkerExecutor::with_thread_name("panicking-worker");
        let failure = executor
            .run_on_worker(7, || panic!("worker blew up"))
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::WorkerTerminated);
        assert_eq!(failure.input_size, 7);
        assert!(failure.message.contains("worker blew up"));
    }

    struct SlowThreadExit;

    impl Drop for SlowThreadExit {
        fn drop(&mut self) {
            std::thread::sleep(Duration::from_millis(300));
        }
    }

    thread_local! {
        static SLOW_EXIT: SlowThreadExit = const { SlowThreadExit };
    }

    #[tokio::test]
    async fn test_worker_teardown_does_not_block_runtime() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let failure = WorkerExecutor::with_thread_name("slow-exit-worker")
            .run_on_worker(1, || {
                SLOW_EXIT.with(|_| ());
                panic!("worker blew up")
            })
            .await
            .unwrap_err();
        ticker.abort();

        assert_eq!(failure.kind, FailureKind::WorkerTerminated);
        assert!(failure.message.contains("worker blew up"));
        // The single-threaded runtime kept ticking while the worker tore down.
        assert!(ticks.load(Ordering::SeqCst) >= 10);
    }

    struct SlowExecutor;

    #[async_trait]
    impl BatchExecutor for SlowExecutor {
        fn name(&self) -> &str {
            "slow"
        }

        async fn execute(&self, _request: BatchRequest) -> Result<RankedBatch, BatchFailure> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(RankedBatch {
                candidates: Vec::new(),
                stats: BatchStats::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_execute_with_timeout_fails_slow_batch() {
        let failure = execute_with_timeout(&SlowExecutor, request(), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.input_size, 2);
    }

    #[tokio::test]
    async fn test_execute_with_timeout_passes_fast_batch() {
        let batch = execute_with_timeout(&InlineExecutor::new(), request(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(batch.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_rank_or_empty_substitutes_empty_list() {
        let mut req = request();
        req.config.min_size_mb = -5.0;
        assert!(rank_or_empty(&InlineExecutor::new(), req).await.is_empty());

        let candidates = rank_or_empty(&WorkerExecutor::new(), request()).await;
        assert_eq!(candidates.len(), 1);
    }
}
