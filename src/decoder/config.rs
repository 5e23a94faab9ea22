//! Decoder configuration.
//!
//! This module contains the [`DecoderConfig`] struct and related constants
//! for configuring the worker pool and the completion-polling workaround.

use std::time::Duration;

// =============================================================================
// Configuration Constants
// =============================================================================

/// Default bounded wait on the job queue before re-checking the stop signal.
pub const DEFAULT_TAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default delay between pipeline progress checks.
///
/// Pipeline throughput varies with recording length, so this is
/// configuration rather than a constant baked into the worker.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default ceiling on the whole polling phase.
///
/// A pipeline that never reaches its frame-count threshold is torn down and
/// reported as stalled instead of blocking a worker forever.
pub const DEFAULT_MAX_POLL_WAIT: Duration = Duration::from_secs(300);

/// Default whole-job deadline (probe through extraction).
pub const DEFAULT_JOB_DEADLINE: Duration = Duration::from_secs(900);

// =============================================================================
// Decoder Configuration
// =============================================================================

/// Configuration for the decoder pool and its workers.
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    /// How long a worker blocks on `JobQueue::take` before re-checking the
    /// stop signal.
    pub take_timeout: Duration,

    /// Delay between pipeline progress checks while waiting for completion.
    pub poll_interval: Duration,

    /// Ceiling on the polling phase; exceeding it reports
    /// [`DecodeError::Stalled`](super::DecodeError::Stalled).
    pub max_poll_wait: Duration,

    /// Optional deadline over a whole job; exceeding it tears the pipeline
    /// down and reports
    /// [`DecodeError::DeadlineExceeded`](super::DecodeError::DeadlineExceeded).
    /// `None` disables the deadline.
    pub job_deadline: Option<Duration>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            take_timeout: DEFAULT_TAKE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_wait: DEFAULT_MAX_POLL_WAIT,
            job_deadline: Some(DEFAULT_JOB_DEADLINE),
        }
    }
}
