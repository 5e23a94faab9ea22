//! Core traits for the decoder framework.
//!
//! This module contains the abstract traits that define the contracts between
//! the worker pool and the external signal-processing stack. These traits
//! enable dependency injection and testability: the real implementations wrap
//! the demodulator flowgraph and the packet-field parser, while tests supply
//! scripted fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Decoder Pool                             │
//! │                                                              │
//! │  Workers depend on these trait abstractions:                 │
//! │  • AudioProbe - Sample rate / frame count of a recording     │
//! │  • PipelineFactory - One demod pipeline per job              │
//! │  • DemodPipeline - Start/stop/progress of one pipeline run   │
//! │  • DetectionLog - Ordered packet detections from a run       │
//! │  • PacketParser - Structured fields from a corrected payload │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline is treated as an opaque, non-reentrant service: exactly one
//! [`DemodPipeline`] instance exists per job, created by the worker and
//! discarded after result extraction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// Audio Probe Trait
// ============================================================================

/// Basic properties of a recorded audio capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Recording length in seconds.
    pub duration_secs: f64,
    /// Total number of audio frames in the file.
    pub frames: u64,
}

/// Trait for probing audio file metadata.
///
/// The probed frame count is the completion threshold for the polling loop:
/// a pipeline run is considered finished once its input stage has consumed
/// at least this many frames.
pub trait AudioProbe: Send + Sync + 'static {
    /// Reads sample rate, duration and frame count from a recording.
    fn probe(&self, path: &Path) -> Result<AudioInfo, ProbeError>;
}

/// Errors from audio metadata probing.
#[derive(Debug, Clone)]
pub struct ProbeError {
    /// Human-readable error message.
    pub message: String,
}

impl ProbeError {
    /// Creates a new probe error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProbeError {}

// ============================================================================
// Demod Pipeline Traits
// ============================================================================

/// A single packet detection emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Payload bytes of the detection.
    pub payload: Vec<u8>,
    /// For corrected-log records: the originating raw payload carried as
    /// metadata on the same record. `None` on raw-log records.
    pub raw: Option<Vec<u8>>,
}

impl Detection {
    /// Creates a raw detection (no associated metadata).
    pub fn raw(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            raw: None,
        }
    }

    /// Creates a corrected detection carrying its originating raw payload.
    pub fn corrected(payload: impl Into<Vec<u8>>, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            raw: Some(raw.into()),
        }
    }
}

/// An ordered, append-only, indexable log of detections accumulated during
/// one pipeline run.
pub trait DetectionLog: Send {
    /// Number of records accumulated so far.
    fn count(&self) -> usize;

    /// Returns the record at index `i`, or `None` if out of range.
    fn get(&self, i: usize) -> Option<Detection>;
}

/// One demodulator pipeline run, scoped to a single recording.
///
/// The pipeline does not reliably signal its own completion; callers detect
/// it by polling [`frames_consumed`](DemodPipeline::frames_consumed) against
/// the recording's total frame count and then issuing an explicit
/// `stop()` + `wait()`.
///
/// # Important
///
/// All methods must return promptly - the demodulation itself runs on the
/// pipeline's own threads. A worker calls these from async context and a
/// long-blocking implementation would stall that worker.
pub trait DemodPipeline: Send {
    /// Starts the pipeline run.
    fn start(&mut self) -> Result<(), PipelineError>;

    /// Requests the pipeline to stop processing.
    fn stop(&mut self) -> Result<(), PipelineError>;

    /// Blocks until the pipeline has acknowledged the stop.
    fn wait(&mut self) -> Result<(), PipelineError>;

    /// Number of audio frames the input stage has consumed so far.
    fn frames_consumed(&self) -> u64;

    /// Ordered log of raw (pre-correction) packet detections.
    fn raw_log(&self) -> &dyn DetectionLog;

    /// Ordered log of error-corrected packet detections.
    ///
    /// Each record carries the corrected payload plus its originating raw
    /// payload as metadata (see [`Detection::raw`]).
    fn corrected_log(&self) -> &dyn DetectionLog;
}

/// Trait for constructing one pipeline instance per job.
pub trait PipelineFactory: Send + Sync + 'static {
    /// Creates a pipeline scoped to `path` at the probed sample rate.
    fn create(&self, path: &Path, sample_rate: u32)
        -> Result<Box<dyn DemodPipeline>, PipelineError>;
}

/// Errors from pipeline construction or control.
#[derive(Debug, Clone)]
pub struct PipelineError {
    /// Human-readable error message.
    pub message: String,
}

impl PipelineError {
    /// Creates a new pipeline error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PipelineError {}

// ============================================================================
// Packet Parser Trait
// ============================================================================

/// Trait for parsing a corrected payload into structured packet fields.
pub trait PacketParser: Send + Sync + 'static {
    /// Parses a hex-encoded corrected payload.
    ///
    /// Returns the structured record plus a list of decode-error strings.
    /// A non-empty error list is not a failure: the packet is still
    /// reported, it is just ineligible for downstream publication.
    fn parse(&self, corrected_hex: &str) -> Result<(serde_json::Value, Vec<String>), ParseError>;
}

/// Errors from packet parsing.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// Audio Preprocessor Trait
// ============================================================================

/// Trait for audio preprocessing performed before submission.
///
/// Consumed by the front end that accepts uploads, not by the workers:
/// recordings are converted to the canonical encoding and optionally sliced
/// to a time range before a decode job is submitted for them.
pub trait AudioPreprocessor: Send + Sync + 'static {
    /// Converts a recording to the canonical encoding.
    ///
    /// Returns the path of the converted file alongside its audio info.
    fn convert(&self, path: &Path) -> Result<(PathBuf, AudioInfo), ProbeError>;

    /// Slices a recording to `[start_s, stop_s]` in place, overwriting the
    /// file. `None` bounds reference the start/end of the file.
    ///
    /// Returns the new duration in seconds.
    fn slice(
        &self,
        path: &Path,
        start_s: Option<f64>,
        stop_s: Option<f64>,
        sample_rate: u32,
    ) -> Result<f64, ProbeError>;
}

// ============================================================================
// Service Bundle
// ============================================================================

/// Bundle of collaborator handles a worker needs to process jobs.
#[derive(Clone)]
pub struct DecodeServices {
    /// Audio metadata probe.
    pub probe: Arc<dyn AudioProbe>,
    /// Per-job pipeline constructor.
    pub pipelines: Arc<dyn PipelineFactory>,
    /// Corrected-payload parser.
    pub parser: Arc<dyn PacketParser>,
}

impl std::fmt::Debug for DecodeServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeServices").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::new("unreadable wav header");
        assert_eq!(format!("{}", err), "unreadable wav header");
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::new("flowgraph refused to start");
        assert_eq!(format!("{}", err), "flowgraph refused to start");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("truncated payload");
        assert_eq!(format!("{}", err), "truncated payload");
    }

    #[test]
    fn test_detection_constructors() {
        let raw = Detection::raw(vec![0xde, 0xad]);
        assert_eq!(raw.payload, vec![0xde, 0xad]);
        assert!(raw.raw.is_none());

        let corrected = Detection::corrected(vec![0x01], vec![0x02]);
        assert_eq!(corrected.payload, vec![0x01]);
        assert_eq!(corrected.raw, Some(vec![0x02]));
    }

    #[test]
    fn test_audio_info_copy() {
        let info = AudioInfo {
            sample_rate: 48_000,
            duration_secs: 2.5,
            frames: 120_000,
        };
        let copy = info;
        assert_eq!(copy, info);
    }
}
