//! Worker execution loop.
//!
//! A worker repeatedly claims jobs from the shared queue and drives each
//! through the per-job protocol: probe the recording, run one pipeline
//! instance, poll for completion, extract results, report. The loop is a
//! small state machine:
//!
//! ```text
//! Idle -> Running -> Polling -> Extracting -> Reporting -> Idle
//!   \
//!    -> Stopped   (stop signal observed and the queue yielded nothing)
//! ```
//!
//! # Failure isolation
//!
//! Nothing escapes the loop. Errors and panics during job execution are
//! caught at the job boundary, logged, and delivered to the job's
//! completion handler as an error value with an empty result; the worker
//! then returns to Idle. A panicking completion handler is caught the same
//! way so it cannot take the worker down with it.
//!
//! # Completion polling
//!
//! The external pipeline does not reliably signal its own completion, so
//! the worker compares the pipeline's consumed-frame count against the
//! probed frame total at a fixed poll interval and issues an explicit
//! `stop()` + `wait()` once the threshold is reached. This is a documented
//! workaround for the external framework, bounded by `max_poll_wait` and
//! the per-job deadline so a stuck pipeline cannot hold a worker forever.

use super::config::DecoderConfig;
use super::error::DecodeError;
use super::extract::extract_results;
use super::job::DecodeJob;
use super::packet::DecodeResult;
use super::queue::JobQueue;
use super::traits::{DecodeServices, DemodPipeline};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// One unit of job execution, bound to the shared queue and stop signal
/// for its entire lifetime.
pub(crate) struct Worker {
    id: usize,
    queue: Arc<JobQueue>,
    stop: CancellationToken,
    config: DecoderConfig,
    services: DecodeServices,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        queue: Arc<JobQueue>,
        stop: CancellationToken,
        config: DecoderConfig,
        services: DecodeServices,
    ) -> Self {
        Self {
            id,
            queue,
            stop,
            config,
            services,
        }
    }

    /// Runs the worker until the stop signal is observed and the queue is
    /// drained.
    pub(crate) async fn run(self) {
        info!(worker = self.id, "decode worker started");

        loop {
            // Once stopping, drain without sleeping on the queue.
            let timeout = if self.stop.is_cancelled() {
                Duration::ZERO
            } else {
                self.config.take_timeout
            };

            match self.queue.take(timeout).await {
                Some(job) => self.process(job).await,
                None => {
                    if self.stop.is_cancelled() {
                        break;
                    }
                }
            }
        }

        info!(worker = self.id, "decode worker stopped");
    }

    /// Processes one claimed job end to end, reporting exactly once.
    async fn process(&self, job: DecodeJob) {
        let started = Instant::now();
        let queued_ms = (Utc::now() - job.submitted_at).num_milliseconds();
        info!(
            worker = self.id,
            job = %job.id,
            path = %job.source_path.display(),
            queued_ms,
            "decode job claimed"
        );

        let outcome = AssertUnwindSafe(self.execute(&job)).catch_unwind().await;

        let (result, error) = match outcome {
            Ok(Ok(result)) => {
                info!(
                    worker = self.id,
                    job = %job.id,
                    raw_packets = result.raw_packets.len(),
                    corrected_packets = result.corrected_packets.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "decode job finished"
                );
                (result, None)
            }
            Ok(Err(err)) => {
                warn!(worker = self.id, job = %job.id, error = %err, "decode job failed");
                (DecodeResult::new(), Some(err))
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(worker = self.id, job = %job.id, panic = %message, "decode job panicked");
                (DecodeResult::new(), Some(DecodeError::Panicked(message)))
            }
        };

        self.report(&job, &result, error.as_ref());
    }

    /// Invokes the completion handler, containing any panic it raises.
    fn report(&self, job: &DecodeJob, result: &DecodeResult, error: Option<&DecodeError>) {
        let call = std::panic::catch_unwind(AssertUnwindSafe(|| {
            (job.on_finish)(&job.source_path, result, &job.args, error)
        }));

        if call.is_err() {
            error!(worker = self.id, job = %job.id, "completion handler panicked");
        }
    }

    /// Runs probe, pipeline, polling and extraction for one job.
    async fn execute(&self, job: &DecodeJob) -> Result<DecodeResult, DecodeError> {
        let deadline = self.config.job_deadline.map(|d| Instant::now() + d);

        let info = self.services.probe.probe(&job.source_path)?;
        debug!(
            worker = self.id,
            job = %job.id,
            sample_rate = info.sample_rate,
            frames = info.frames,
            duration_secs = info.duration_secs,
            "recording probed"
        );

        // One pipeline instance per job; discarded after extraction.
        let mut pipeline = self
            .services
            .pipelines
            .create(&job.source_path, info.sample_rate)?;
        pipeline.start()?;

        self.await_completion(pipeline.as_mut(), info.frames, deadline)
            .await?;

        extract_results(pipeline.as_ref(), self.services.parser.as_ref())
    }

    /// Polls consumed-frame progress until the pipeline has read the whole
    /// recording, then stops it.
    ///
    /// A recording with zero frames terminates immediately without ever
    /// sleeping. Exceeding `max_poll_wait` or the job deadline tears the
    /// pipeline down and reports the corresponding error.
    async fn await_completion(
        &self,
        pipeline: &mut dyn DemodPipeline,
        total_frames: u64,
        deadline: Option<Instant>,
    ) -> Result<(), DecodeError> {
        let poll_started = Instant::now();

        loop {
            let consumed = pipeline.frames_consumed();
            if consumed >= total_frames {
                break;
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    self.teardown(pipeline);
                    return Err(DecodeError::DeadlineExceeded(
                        self.config.job_deadline.unwrap_or_default(),
                    ));
                }
            }

            if poll_started.elapsed() >= self.config.max_poll_wait {
                self.teardown(pipeline);
                return Err(DecodeError::Stalled(self.config.max_poll_wait));
            }

            trace!(
                worker = self.id,
                consumed,
                total_frames,
                "pipeline progress"
            );
            tokio::time::sleep(self.config.poll_interval).await;
        }

        pipeline.stop()?;
        pipeline.wait()?;
        Ok(())
    }

    /// Best-effort pipeline teardown on the error paths.
    fn teardown(&self, pipeline: &mut dyn DemodPipeline) {
        if let Err(err) = pipeline.stop() {
            warn!(worker = self.id, error = %err, "pipeline stop failed during teardown");
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
