//! Payload size and compression ratio estimation
//!
//! Purely observational: measures how many bytes a segment and its encoded
//! form take in a given serialization and reports the ratio between them.

use crate::config::SizeFormat;
use crate::error::Result;
use crate::model::{EncodedSegment, Segment};
use serde::Serialize;

fn serialized_len<T: Serialize>(value: &T, format: SizeFormat) -> Result<usize> {
    let len = match format {
        SizeFormat::Json => serde_json::to_vec(value)?.len(),
        SizeFormat::Bincode => bincode::serialized_size(value)? as usize,
    };
    Ok(len)
}

/// Serialized size of a raw segment in bytes.
pub fn estimate_size(segment: &Segment, format: SizeFormat) -> Result<usize> {
    serialized_len(segment, format)
}

/// Serialized size of an encoded segment in bytes.
pub fn estimate_compressed_size(encoded: &EncodedSegment, format: SizeFormat) -> Result<usize> {
    serialized_len(encoded, format)
}

/// Byte ratio `raw / encoded`. Values above 1.0 mean the encoding is smaller.
/// Returns 0.0 when the encoded size is zero.
pub fn compression_ratio(segment: &Segment, encoded: &EncodedSegment, format: SizeFormat) -> Result<f64> {
    Ok(SizeReport::measure(segment, encoded, format)?.ratio)
}

/// Size figures for one segment, as reported by the codec and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeReport {
    pub original_size: usize,
    pub compressed_size: usize,
    pub ratio: f64,
}

impl SizeReport {
    pub fn measure(segment: &Segment, encoded: &EncodedSegment, format: SizeFormat) -> Result<Self> {
        let original_size = estimate_size(segment, format)?;
        let compressed_size = estimate_compressed_size(encoded, format)?;
        let ratio = if compressed_size > 0 { original_size as f64 / compressed_size as f64 } else { 0.0 };
        Ok(Self { original_size, compressed_size, ratio })
    }
}
