//! Error types for the decoder framework.
//!
//! Errors are categorized by the phase of job execution they arise in.
//! Every variant is downgraded to a reported error value at the job
//! boundary - nothing here is fatal to a worker or the pool.

use super::traits::{ParseError, PipelineError, ProbeError};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while processing one decode job.
///
/// A `DecodeError` is delivered to the job's completion handler together
/// with an empty (or partial) result; it never escapes the worker loop.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Audio metadata probe failed
    #[error("audio probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// Pipeline construction or control failed
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Pipeline never reached the frame-count threshold
    #[error("pipeline stalled: no terminal progress after {0:?}")]
    Stalled(Duration),

    /// Whole-job deadline expired
    #[error("job exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// Reading the detection logs failed
    #[error("result extraction failed: {0}")]
    Extraction(String),

    /// Packet parser rejected a corrected payload
    #[error("packet parse failed: {0}")]
    Parse(#[from] ParseError),

    /// Job execution panicked (contained at the job boundary)
    #[error("decode job panicked: {0}")]
    Panicked(String),
}

/// Errors from job submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The pool has been stopped; no new jobs are accepted
    #[error("decoder pool is stopping, job rejected")]
    Stopping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Probe(ProbeError::new("bad header"));
        assert_eq!(format!("{}", err), "audio probe failed: bad header");

        let err = DecodeError::Stalled(Duration::from_secs(300));
        assert_eq!(
            format!("{}", err),
            "pipeline stalled: no terminal progress after 300s"
        );

        let err = DecodeError::DeadlineExceeded(Duration::from_secs(900));
        assert_eq!(format!("{}", err), "job exceeded deadline of 900s");

        let err = DecodeError::Panicked("boom".to_string());
        assert_eq!(format!("{}", err), "decode job panicked: boom");
    }

    #[test]
    fn test_decode_error_from_collaborator_errors() {
        let err: DecodeError = PipelineError::new("no flowgraph").into();
        assert!(matches!(err, DecodeError::Pipeline(_)));

        let err: DecodeError = ParseError::new("short packet").into();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn test_submit_error_display() {
        assert_eq!(
            format!("{}", SubmitError::Stopping),
            "decoder pool is stopping, job rejected"
        );
    }
}
