//! Decode job descriptor and related types.
//!
//! A job is one decode request: a path to a recorded audio capture, a
//! completion handler, and an opaque argument bag that is passed back to
//! the handler untouched. Jobs are immutable once submitted and owned
//! exclusively by the queue until claimed by exactly one worker.

use super::error::DecodeError;
use super::packet::DecodeResult;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a decode job.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct JobId(String);

impl JobId {
    /// Creates a job ID with the given string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a unique auto-generated job ID.
    ///
    /// The ID format is `decode-{counter}` where counter is a monotonically
    /// increasing number.
    pub fn auto() -> Self {
        let counter = JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("decode-{}", counter))
    }

    /// Returns the string value of this job ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque argument bag carried through a job untouched.
///
/// Plain serializable data rather than captured state: the submitter packs
/// whatever it needs to resume its own work (email address, station name,
/// publication flags, ...) and gets it back verbatim in the completion
/// handler.
pub type JobArgs = serde_json::Value;

/// Completion handler invoked exactly once per job, from worker context.
///
/// Receives the job's source path, the decode result (empty on failure),
/// the original argument bag, and the error if the job failed. Handlers
/// run synchronously inside the worker loop and must not block
/// indefinitely - a slow handler delays that worker's return to the queue.
pub type OnFinish =
    Arc<dyn Fn(&Path, &DecodeResult, &JobArgs, Option<&DecodeError>) + Send + Sync>;

/// One decode request.
pub struct DecodeJob {
    /// Unique job identifier.
    pub id: JobId,

    /// Path to the recorded audio capture. The file's lifecycle (creation,
    /// deletion) belongs to the submitter, not the pool.
    pub source_path: PathBuf,

    /// Completion handler, invoked exactly once.
    pub on_finish: OnFinish,

    /// Opaque argument bag passed back to the handler.
    pub args: JobArgs,

    /// Submission timestamp, for queue-latency logging.
    pub submitted_at: DateTime<Utc>,
}

impl DecodeJob {
    /// Creates a new job with an auto-generated ID.
    pub fn new(source_path: impl Into<PathBuf>, on_finish: OnFinish, args: JobArgs) -> Self {
        Self {
            id: JobId::auto(),
            source_path: source_path.into(),
            on_finish,
            args,
            submitted_at: Utc::now(),
        }
    }
}

impl fmt::Debug for DecodeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeJob")
            .field("id", &self.id)
            .field("source_path", &self.source_path)
            .field("args", &self.args)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_handler() -> OnFinish {
        Arc::new(|_, _, _, _| {})
    }

    #[test]
    fn test_job_id_new() {
        let id = JobId::new("decode-test");
        assert_eq!(id.as_str(), "decode-test");
    }

    #[test]
    fn test_job_id_auto_unique() {
        let id1 = JobId::auto();
        let id2 = JobId::auto();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("decode-"));
    }

    #[test]
    fn test_job_id_display() {
        let id = JobId::new("decode-42");
        assert_eq!(format!("{}", id), "decode-42");
        assert_eq!(format!("{:?}", id), "JobId(decode-42)");
    }

    #[test]
    fn test_decode_job_new() {
        let job = DecodeJob::new(
            "/captures/pass-001.wav",
            noop_handler(),
            serde_json::json!({"station_name": "brown-gs"}),
        );

        assert_eq!(job.source_path, PathBuf::from("/captures/pass-001.wav"));
        assert_eq!(job.args["station_name"], "brown-gs");
        assert!(job.submitted_at <= Utc::now());
    }

    #[test]
    fn test_decode_job_debug_omits_handler() {
        let job = DecodeJob::new("/captures/x.wav", noop_handler(), serde_json::json!({}));
        let debug = format!("{:?}", job);
        assert!(debug.contains("x.wav"));
        assert!(!debug.contains("on_finish"));
    }
}
