//! Result extraction.
//!
//! After a pipeline run terminates, its two accumulated detection logs are
//! walked in emission order: the raw log becomes `raw_packets`, and each
//! corrected record is paired with its originating raw payload and handed
//! to the packet parser. No re-sorting happens here.

use super::error::DecodeError;
use super::packet::{CorrectedPacket, DecodeResult};
use super::traits::{DemodPipeline, PacketParser};

/// Builds the [`DecodeResult`] from a terminated pipeline's detection logs.
///
/// The returned sequences match the respective log counts at the time of
/// extraction; corrected packets with decode errors are kept.
pub fn extract_results(
    pipeline: &dyn DemodPipeline,
    parser: &dyn PacketParser,
) -> Result<DecodeResult, DecodeError> {
    let raw_log = pipeline.raw_log();
    let mut raw_packets = Vec::with_capacity(raw_log.count());
    for i in 0..raw_log.count() {
        let detection = raw_log
            .get(i)
            .ok_or_else(|| DecodeError::Extraction(format!("raw detection {i} missing")))?;
        raw_packets.push(hex::encode(&detection.payload));
    }

    let corrected_log = pipeline.corrected_log();
    let mut corrected_packets = Vec::with_capacity(corrected_log.count());
    for i in 0..corrected_log.count() {
        let detection = corrected_log
            .get(i)
            .ok_or_else(|| DecodeError::Extraction(format!("corrected detection {i} missing")))?;

        let corrected = hex::encode(&detection.payload);
        let raw = detection.raw.as_deref().map(hex::encode).unwrap_or_default();
        let (parsed, decode_errs) = parser.parse(&corrected)?;

        corrected_packets.push(CorrectedPacket {
            raw,
            corrected,
            parsed,
            decode_errs,
        });
    }

    Ok(DecodeResult {
        raw_packets,
        corrected_packets,
    })
}
