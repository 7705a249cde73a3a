//! Delta decoder
//!
//! Rebuilds absolute samples from a compressed segment. Decoding reproduces
//! the samples the encoder retained, at the encoder's precision; samples the
//! sampler dropped are gone and are never interpolated back.

use crate::model::{
    CompactSensorData, CompressedPoint, CompressedSegment, EncodedSegment, Location, RawSample,
    Rotation, Segment, SensorData,
};

/// Decode an encoder output. A pass-through segment is returned as-is.
pub fn decompress(encoded: &EncodedSegment) -> Segment {
    match encoded {
        EncodedSegment::Compressed(compressed) => decompress_segment(compressed),
        EncodedSegment::Passthrough(segment) => segment.clone(),
    }
}

pub fn decompress_segment(compressed: &CompressedSegment) -> Segment {
    let points: Vec<RawSample> = compressed
        .compressed_points
        .iter()
        .map(|point| decode_point(point, compressed))
        .collect();

    log::debug!(
        "Decompressed segment {}: {} points (originally {})",
        compressed.id,
        points.len(),
        compressed.original_point_count
    );

    Segment {
        id: compressed.id.clone(),
        vehicle_id: compressed.vehicle_id.clone(),
        user_id: compressed.user_id.clone(),
        start_time: compressed.start_time,
        end_time: compressed.end_time,
        points,
        synced: compressed.synced,
    }
}

fn decode_point(point: &CompressedPoint, compressed: &CompressedSegment) -> RawSample {
    let base = &compressed.base_location;
    RawSample {
        timestamp: compressed.base_timestamp.wrapping_add(point.t),
        is_moving: point.m == 1,
        confidence: point.c,
        location: point.l.as_ref().map(|delta| Location {
            latitude: base.latitude + delta.lat,
            longitude: base.longitude + delta.lng,
            accuracy: delta.acc,
            source: delta.src.clone(),
        }),
        sensor_data: point.s.as_ref().map(decode_sensor_data),
    }
}

fn decode_sensor_data(compact: &CompactSensorData) -> SensorData {
    SensorData {
        acceleration: compact.a,
        rotation: compact.r.map(|r| Rotation {
            alpha: r.a,
            beta: r.b,
            gamma: r.g,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Acceleration, BaseLocation, CompactRotation, LocationDelta};

    fn compressed(points: Vec<CompressedPoint>) -> CompressedSegment {
        CompressedSegment {
            id: "trip-9".to_string(),
            vehicle_id: "truck-2".to_string(),
            user_id: "u-1".to_string(),
            start_time: 100,
            end_time: 900,
            synced: true,
            base_timestamp: 1_000,
            base_location: BaseLocation { latitude: 40.0, longitude: -74.0 },
            original_point_count: points.len(),
            compression_ratio: 1.0,
            compressed_points: points,
        }
    }

    #[test]
    fn test_restores_absolute_values() {
        let input = compressed(vec![
            CompressedPoint { t: 0, m: 0, c: 0.9, l: None, s: None },
            CompressedPoint {
                t: 250,
                m: 1,
                c: 0.75,
                l: Some(LocationDelta { lat: 0.5, lng: -0.25, acc: Some(3.0), src: Some("gps".to_string()) }),
                s: Some(CompactSensorData {
                    a: Some(Acceleration { x: 0.1, y: 0.2, z: 9.8 }),
                    r: Some(CompactRotation { a: 1.5, b: 2.5, g: -3.5 }),
                }),
            },
        ]);

        let segment = decompress(&EncodedSegment::Compressed(input));
        assert_eq!(segment.id, "trip-9");
        assert_eq!(segment.vehicle_id, "truck-2");
        assert_eq!((segment.start_time, segment.end_time), (100, 900));
        assert!(segment.synced);
        assert_eq!(segment.points.len(), 2);

        let first = &segment.points[0];
        assert_eq!(first.timestamp, 1_000);
        assert!(!first.is_moving);
        assert!(first.location.is_none());
        assert!(first.sensor_data.is_none());

        let second = &segment.points[1];
        assert_eq!(second.timestamp, 1_250);
        assert!(second.is_moving);
        assert_eq!(second.confidence, 0.75);
        let location = second.location.as_ref().unwrap();
        assert_eq!((location.latitude, location.longitude), (40.5, -74.25));
        assert_eq!(location.accuracy, Some(3.0));
        assert_eq!(location.source.as_deref(), Some("gps"));
        let data = second.sensor_data.as_ref().unwrap();
        assert_eq!(data.rotation, Some(Rotation { alpha: 1.5, beta: 2.5, gamma: -3.5 }));
        assert_eq!(data.acceleration.map(|a| a.z), Some(9.8));
    }

    #[test]
    fn test_partial_sensor_data_stays_partial() {
        let input = compressed(vec![CompressedPoint {
            t: 0,
            m: 1,
            c: 1.0,
            l: None,
            s: Some(CompactSensorData { a: None, r: None }),
        }]);
        let segment = decompress_segment(&input);
        assert_eq!(segment.points[0].sensor_data, Some(SensorData::default()));
    }

    #[test]
    fn test_offsets_wrap_instead_of_overflowing() {
        let mut input = compressed(vec![CompressedPoint { t: i64::MAX, m: 0, c: 1.0, l: None, s: None }]);
        input.base_timestamp = i64::MAX;
        let segment = decompress_segment(&input);
        assert_eq!(segment.points[0].timestamp, i64::MAX.wrapping_add(i64::MAX));
    }

    #[test]
    fn test_passthrough_returned_unchanged() {
        let segment = Segment {
            id: "empty".to_string(),
            vehicle_id: "v".to_string(),
            user_id: "u".to_string(),
            start_time: 0,
            end_time: 0,
            points: Vec::new(),
            synced: false,
        };
        let encoded = EncodedSegment::Passthrough(segment.clone());
        assert_eq!(decompress(&encoded), segment);
        // Repeated decodes are side-effect free
        assert_eq!(decompress(&encoded), decompress(&encoded));
    }
}
