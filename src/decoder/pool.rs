//! Decoder pool: ownership and lifecycle of the workers.
//!
//! The pool owns the shared job queue, the stop signal, and the handles of
//! every spawned worker. It is the surface the front end talks to:
//! [`submit`](DecoderPool::submit) to enqueue work,
//! [`start`](DecoderPool::start) to spin up workers,
//! [`stop`](DecoderPool::stop) to drain and refuse new jobs, and
//! [`join`](DecoderPool::join) to wait for the workers to exit.

use super::config::DecoderConfig;
use super::error::SubmitError;
use super::job::{DecodeJob, JobArgs, JobId, OnFinish};
use super::queue::JobQueue;
use super::traits::DecodeServices;
use super::worker::Worker;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// A fixed-size pool of independent decode workers sharing one job queue
/// and one stop signal.
pub struct DecoderPool {
    config: DecoderConfig,
    services: DecodeServices,
    queue: Arc<JobQueue>,
    stop: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next_worker_id: AtomicUsize,
}

impl DecoderPool {
    /// Creates a pool with no workers running yet.
    pub fn new(config: DecoderConfig, services: DecodeServices) -> Self {
        Self {
            config,
            services,
            queue: Arc::new(JobQueue::new()),
            stop: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
            next_worker_id: AtomicUsize::new(0),
        }
    }

    /// Spawns `count` workers onto the current Tokio runtime and returns
    /// immediately.
    ///
    /// Calling `start` again adds more workers to the same queue.
    pub fn start(&self, count: usize) {
        let mut workers = self.workers.lock();
        for _ in 0..count {
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            let worker = Worker::new(
                id,
                Arc::clone(&self.queue),
                self.stop.clone(),
                self.config.clone(),
                self.services.clone(),
            );
            workers.push(tokio::spawn(worker.run()));
        }
        info!(spawned = count, total = workers.len(), "decode workers started");
    }

    /// Enqueues a decode job without blocking.
    ///
    /// The completion handler is invoked exactly once, from worker context,
    /// at an unspecified future time. Completion order across workers is
    /// unordered when the pool has more than one worker.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Stopping`] once [`stop`](DecoderPool::stop)
    /// has been called; no job submitted after stop is ever started.
    pub fn submit(
        &self,
        source_path: impl Into<PathBuf>,
        on_finish: OnFinish,
        args: JobArgs,
    ) -> Result<JobId, SubmitError> {
        if self.stop.is_cancelled() {
            return Err(SubmitError::Stopping);
        }

        let job = DecodeJob::new(source_path, on_finish, args);
        let id = job.id.clone();
        debug!(job = %id, path = %job.source_path.display(), "decode job submitted");
        self.queue.submit(job);
        Ok(id)
    }

    /// Signals all workers to stop accepting new jobs.
    ///
    /// In-flight jobs run to completion and already-queued jobs are drained;
    /// only pickup of newly submitted work stops. Idempotent.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            info!("decoder pool stopping, draining queued jobs");
        }
        self.stop.cancel();
    }

    /// Returns true once [`stop`](DecoderPool::stop) has been called.
    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Waits for every spawned worker to exit.
    ///
    /// Workers exit after the stop signal is set and the queue yields no
    /// further jobs, so call [`stop`](DecoderPool::stop) first (or use
    /// [`shutdown`](DecoderPool::shutdown)).
    pub async fn join(&self) {
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(err) = handle.await {
                error!(error = %err, "decode worker task failed");
            }
        }
    }

    /// Convenience for `stop()` followed by `join()`.
    pub async fn shutdown(&self) {
        self.stop();
        self.join().await;
    }

    /// Number of jobs currently queued (excludes in-flight jobs).
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Number of workers spawned so far.
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }
}

impl std::fmt::Debug for DecoderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderPool")
            .field("queue_depth", &self.queue_depth())
            .field("worker_count", &self.worker_count())
            .field("is_stopping", &self.is_stopping())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::traits::{
        AudioInfo, AudioProbe, DemodPipeline, PacketParser, ParseError, PipelineError,
        PipelineFactory, ProbeError,
    };
    use std::path::Path;

    struct FailingProbe;

    impl AudioProbe for FailingProbe {
        fn probe(&self, _: &Path) -> Result<AudioInfo, ProbeError> {
            Err(ProbeError::new("not a wav file"))
        }
    }

    struct FailingFactory;

    impl PipelineFactory for FailingFactory {
        fn create(
            &self,
            _: &Path,
            _: u32,
        ) -> Result<Box<dyn DemodPipeline>, PipelineError> {
            Err(PipelineError::new("unused in pool tests"))
        }
    }

    struct NullParser;

    impl PacketParser for NullParser {
        fn parse(&self, _: &str) -> Result<(serde_json::Value, Vec<String>), ParseError> {
            Ok((serde_json::json!({}), vec![]))
        }
    }

    fn test_pool() -> DecoderPool {
        DecoderPool::new(
            DecoderConfig {
                take_timeout: std::time::Duration::from_millis(10),
                ..Default::default()
            },
            DecodeServices {
                probe: Arc::new(FailingProbe),
                pipelines: Arc::new(FailingFactory),
                parser: Arc::new(NullParser),
            },
        )
    }

    fn noop() -> OnFinish {
        Arc::new(|_, _, _, _| {})
    }

    #[tokio::test]
    async fn test_submit_before_start_queues() {
        let pool = test_pool();
        pool.submit("/captures/a.wav", noop(), serde_json::json!({}))
            .unwrap();
        assert_eq!(pool.queue_depth(), 1);
        assert_eq!(pool.worker_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_rejects_submit() {
        let pool = test_pool();
        pool.stop();
        pool.stop();
        assert!(pool.is_stopping());

        let err = pool
            .submit("/captures/late.wav", noop(), serde_json::json!({}))
            .unwrap_err();
        assert_eq!(err, SubmitError::Stopping);
        assert_eq!(pool.queue_depth(), 0);
    }

    #[tokio::test]
    async fn test_start_twice_adds_workers() {
        let pool = test_pool();
        pool.start(2);
        pool.start(1);
        assert_eq!(pool.worker_count(), 3);

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_join_completes_after_stop() {
        let pool = test_pool();
        pool.start(2);
        pool.stop();

        tokio::time::timeout(std::time::Duration::from_secs(2), pool.join())
            .await
            .expect("workers did not exit after stop");
    }
}
