//! decodeq - Decode-job orchestration for recorded satellite audio captures
//!
//! This library runs decode jobs (paths to finite, already-captured audio
//! recordings) through an externally supplied signal-processing pipeline and
//! reports extracted packet records to a caller-supplied completion handler.
//!
//! # High-Level API
//!
//! The [`decoder`] module provides the worker-pool facade:
//!
//! ```ignore
//! use decodeq::decoder::{DecoderPool, DecoderConfig, DecodeServices};
//!
//! let pool = DecoderPool::new(DecoderConfig::default(), services);
//! pool.start(2);
//!
//! pool.submit("capture.wav", on_finish, serde_json::json!({}))?;
//!
//! // Later: drain and shut down.
//! pool.stop();
//! pool.join().await;
//! ```

pub mod decoder;
pub mod logging;

/// Version of the decodeq library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
