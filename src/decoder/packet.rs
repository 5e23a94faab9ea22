//! Decode result types.
//!
//! A [`DecodeResult`] is produced fresh for every job and handed to the
//! job's completion handler exactly once; it is never mutated afterwards.
//! Payloads are hex-encoded byte-strings, in the order the pipeline emitted
//! them.

use serde::{Deserialize, Serialize};

/// Results of one decode job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeResult {
    /// Hex-encoded payloads of all raw (pre-correction) packet detections.
    pub raw_packets: Vec<String>,

    /// All detections that passed error correction, with parse results.
    pub corrected_packets: Vec<CorrectedPacket>,
}

impl DecodeResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the job produced no detections at all.
    pub fn is_empty(&self) -> bool {
        self.raw_packets.is_empty() && self.corrected_packets.is_empty()
    }
}

/// A raw packet after error correction, paired with its parse result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectedPacket {
    /// Hex-encoded raw payload the correction started from.
    pub raw: String,

    /// Hex-encoded corrected payload.
    pub corrected: String,

    /// Structured record produced by the packet parser.
    pub parsed: serde_json::Value,

    /// Decode-error strings reported by the parser, in order.
    ///
    /// Packets with decode errors are reported, not dropped.
    pub decode_errs: Vec<String>,
}

impl CorrectedPacket {
    /// Returns true if the packet decoded cleanly and is eligible for
    /// downstream publication (a concern of the web layer, not the pool).
    pub fn is_publishable(&self) -> bool {
        self.decode_errs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_result_empty() {
        let result = DecodeResult::new();
        assert!(result.is_empty());
        assert_eq!(result.raw_packets.len(), 0);
        assert_eq!(result.corrected_packets.len(), 0);
    }

    #[test]
    fn test_decode_result_not_empty_with_raw_only() {
        let result = DecodeResult {
            raw_packets: vec!["deadbeef".to_string()],
            corrected_packets: vec![],
        };
        assert!(!result.is_empty());
    }

    #[test]
    fn test_corrected_packet_publishable() {
        let clean = CorrectedPacket {
            raw: "00".to_string(),
            corrected: "01".to_string(),
            parsed: serde_json::json!({"callsign": "WL9XZE"}),
            decode_errs: vec![],
        };
        assert!(clean.is_publishable());

        let errored = CorrectedPacket {
            decode_errs: vec!["bad preamble field".to_string()],
            ..clean.clone()
        };
        assert!(!errored.is_publishable());
    }

    #[test]
    fn test_decode_result_serializes() {
        let result = DecodeResult {
            raw_packets: vec!["ab".to_string()],
            corrected_packets: vec![CorrectedPacket {
                raw: "ab".to_string(),
                corrected: "ac".to_string(),
                parsed: serde_json::json!({}),
                decode_errs: vec![],
            }],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["raw_packets"][0], "ab");
        assert_eq!(json["corrected_packets"][0]["corrected"], "ac");
    }
}
