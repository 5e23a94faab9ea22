//! Decode Worker Pool
//!
//! This module provides the decode-job orchestration framework: a bounded
//! pool of independent workers pulling jobs off a shared FIFO queue,
//! running each through an externally supplied signal-processing pipeline,
//! and reporting extracted packet records to a caller-supplied completion
//! handler exactly once per job.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DecoderPool                            │
//! │  submit jobs, start/stop workers, await drain               │
//! ├─────────────────────────────────────────────────────────────┤
//! │   JobQueue (FIFO)          CancellationToken (stop signal)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Worker 0     Worker 1     ...     Worker N-1               │
//! │  take → probe → pipeline run → poll → extract → report      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Job**: one decode request - a source recording path, a completion
//!   handler, and an opaque argument bag returned to the handler verbatim.
//!
//! - **Worker**: an independent execution loop. One pipeline instance is
//!   created per job and discarded after extraction; failures are isolated
//!   at the job boundary and never kill the worker or stall the queue.
//!
//! - **Completion polling**: the pipeline does not reliably terminate on
//!   its own, so workers poll its consumed-frame count against the probed
//!   frame total and then stop it explicitly. Poll interval, stall ceiling
//!   and per-job deadline live in [`DecoderConfig`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use decodeq::decoder::{DecoderPool, DecoderConfig, DecodeServices, OnFinish};
//!
//! let services = DecodeServices {
//!     probe: Arc::new(WavProbe),
//!     pipelines: Arc::new(FmDemodFactory::default()),
//!     parser: Arc::new(TelemetryParser),
//! };
//!
//! let pool = DecoderPool::new(DecoderConfig::default(), services);
//! pool.start(2);
//!
//! let on_finish: OnFinish = Arc::new(|path, result, args, error| {
//!     // deliver email / publish packets / record the failure
//! });
//! pool.submit("captures/pass-001.wav", on_finish, serde_json::json!({
//!     "email": "observer@example.org",
//!     "post_publicly": true,
//! }))?;
//!
//! // Later: drain and exit.
//! pool.shutdown().await;
//! ```

mod config;
mod error;
mod extract;
mod job;
mod packet;
mod pool;
mod queue;
mod traits;
mod worker;

// Configuration
pub use config::{
    DecoderConfig, DEFAULT_JOB_DEADLINE, DEFAULT_MAX_POLL_WAIT, DEFAULT_POLL_INTERVAL,
    DEFAULT_TAKE_TIMEOUT,
};

// Errors
pub use error::{DecodeError, SubmitError};

// Job types
pub use job::{DecodeJob, JobArgs, JobId, OnFinish};

// Result types
pub use packet::{CorrectedPacket, DecodeResult};

// Queue
pub use queue::JobQueue;

// Pool
pub use pool::DecoderPool;

// Result extraction
pub use extract::extract_results;

// Collaborator traits (implemented by the signal-processing stack)
pub use traits::{
    AudioInfo, AudioPreprocessor, AudioProbe, DecodeServices, DemodPipeline, Detection,
    DetectionLog, PacketParser, ParseError, PipelineError, PipelineFactory, ProbeError,
};
