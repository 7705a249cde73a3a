//! Delta encoder
//!
//! Sorts a segment's samples, picks a base timestamp and base coordinate,
//! runs the adaptive sampler and stores every retained sample as a
//! precision-reduced offset from the base.

use crate::config::SamplerConfig;
use crate::model::{
    Acceleration, BaseLocation, CompactRotation, CompactSensorData, CompressedPoint, CompressedSegment,
    EncodedSegment, LocationDelta, RawSample, Segment, SensorData,
};
use crate::rounding::{round_to, ACCELERATION_DECIMALS, CONFIDENCE_DECIMALS, COORDINATE_DECIMALS, ROTATION_DECIMALS};
use crate::sampler::AdaptiveSampler;

pub struct DeltaEncoder {
    sampler: AdaptiveSampler,
}

impl DeltaEncoder {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            sampler: AdaptiveSampler::new(config),
        }
    }

    /// Compress a segment. An empty segment is passed through untouched.
    ///
    /// The input is never modified; compressing the same segment twice gives
    /// identical output.
    pub fn compress(&self, segment: &Segment) -> EncodedSegment {
        if segment.points.is_empty() {
            log::debug!("Segment {} has no points, passing through", segment.id);
            return EncodedSegment::Passthrough(segment.clone());
        }

        let mut sorted = segment.points.clone();
        // Stable: equal timestamps keep their capture order
        sorted.sort_by_key(|sample| sample.timestamp);

        let base_timestamp = sorted[0].timestamp;
        let base_location = find_base_location(&sorted);

        let retained = self.sampler.sample(&sorted);
        let compressed_points: Vec<CompressedPoint> = retained
            .iter()
            .map(|sample| encode_point(sample, base_timestamp, &base_location))
            .collect();

        let original_point_count = segment.points.len();
        let compression_ratio = original_point_count as f64 / compressed_points.len() as f64;

        log::debug!(
            "Compressed segment {}: {} -> {} points (ratio {:.2})",
            segment.id,
            original_point_count,
            compressed_points.len(),
            compression_ratio
        );

        EncodedSegment::Compressed(CompressedSegment {
            id: segment.id.clone(),
            vehicle_id: segment.vehicle_id.clone(),
            user_id: segment.user_id.clone(),
            start_time: segment.start_time,
            end_time: segment.end_time,
            synced: segment.synced,
            base_timestamp,
            base_location,
            compressed_points,
            compression_ratio,
            original_point_count,
        })
    }
}

impl Default for DeltaEncoder {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

/// First usable coordinate in temporal order, `(0, 0)` when no sample has one.
fn find_base_location(sorted: &[RawSample]) -> BaseLocation {
    sorted
        .iter()
        .find_map(|sample| sample.usable_location())
        .map(|loc| BaseLocation {
            latitude: loc.latitude,
            longitude: loc.longitude,
        })
        .unwrap_or_default()
}

fn encode_point(sample: &RawSample, base_timestamp: i64, base: &BaseLocation) -> CompressedPoint {
    let l = sample
        .usable_location()
        .map(|loc| LocationDelta {
            lat: round_to(loc.latitude - base.latitude, COORDINATE_DECIMALS),
            lng: round_to(loc.longitude - base.longitude, COORDINATE_DECIMALS),
            acc: loc.accuracy.filter(|acc| acc.is_finite()),
            src: loc.source.clone(),
        })
        .filter(|delta| delta.lat.is_finite() && delta.lng.is_finite());

    CompressedPoint {
        // Wrapping keeps the offset exactly reversible for any pair of i64 timestamps
        t: sample.timestamp.wrapping_sub(base_timestamp),
        m: u8::from(sample.is_moving),
        c: encode_confidence(sample.confidence),
        l,
        s: sample.sensor_data.as_ref().map(encode_sensor_data),
    }
}

/// A non-finite confidence is stored as 0.0, i.e. no confidence at all.
fn encode_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        round_to(confidence, CONFIDENCE_DECIMALS)
    } else {
        0.0
    }
}

/// Readings with any non-finite component are dropped; JSON has no
/// representation for them.
fn encode_sensor_data(data: &SensorData) -> CompactSensorData {
    CompactSensorData {
        a: data
            .acceleration
            .filter(|accel| accel.x.is_finite() && accel.y.is_finite() && accel.z.is_finite())
            .map(|accel| Acceleration {
                x: round_to(accel.x, ACCELERATION_DECIMALS),
                y: round_to(accel.y, ACCELERATION_DECIMALS),
                z: round_to(accel.z, ACCELERATION_DECIMALS),
            }),
        r: data
            .rotation
            .filter(|rot| rot.alpha.is_finite() && rot.beta.is_finite() && rot.gamma.is_finite())
            .map(|rot| CompactRotation {
                a: round_to(rot.alpha, ROTATION_DECIMALS),
                b: round_to(rot.beta, ROTATION_DECIMALS),
                g: round_to(rot.gamma, ROTATION_DECIMALS),
            }),
    }
}

/// Compress with the default sampler thresholds.
pub fn compress(segment: &Segment) -> EncodedSegment {
    DeltaEncoder::default().compress(segment)
}
