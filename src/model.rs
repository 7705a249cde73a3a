//! Trip telemetry data shapes
//!
//! Raw samples as delivered by the capture side, the segment that groups them
//! into one trip, and the compact delta-encoded form produced by the encoder.
//! Optional sensor fields stay optional end to end: a missing location is
//! `None`, never a `(0, 0)` placeholder.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A position fix attached to a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Degrees, [-90, 90].
    pub latitude: f64,
    /// Degrees, [-180, 180].
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Provider tag, e.g. "gps" or "network".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            source: None,
        }
    }

    /// A fix whose coordinates can take part in delta arithmetic.
    ///
    /// Non-finite coordinates would poison the base location and every delta
    /// taken against it, so they are treated as if no fix was recorded.
    pub fn is_usable(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Planar distance in raw degree space (no great-circle correction).
    pub fn planar_distance(&self, other: &Location) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlon = self.longitude - other.longitude;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

/// Three-axis accelerometer reading. The unit is whatever the capture device
/// reports and is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Device orientation rates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Acceleration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

/// One inertial/location observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSample {
    /// Milliseconds since an arbitrary epoch.
    pub timestamp: i64,
    pub is_moving: bool,
    /// Motion classification confidence, [0, 1].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_data: Option<SensorData>,
}

impl RawSample {
    pub fn new(timestamp: i64, is_moving: bool, confidence: f64) -> Self {
        Self {
            timestamp,
            is_moving,
            confidence,
            location: None,
            sensor_data: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_sensor_data(mut self, sensor_data: SensorData) -> Self {
        self.sensor_data = Some(sensor_data);
        self
    }

    /// The location, if present and usable for delta arithmetic.
    pub fn usable_location(&self) -> Option<&Location> {
        self.location.as_ref().filter(|loc| loc.is_usable())
    }

    /// Acceleration magnitude, if an acceleration reading is present.
    pub fn acceleration_magnitude(&self) -> Option<f64> {
        self.sensor_data
            .as_ref()
            .and_then(|data| data.acceleration)
            .map(|accel| accel.magnitude())
    }
}

/// One logical trip's ordered set of raw telemetry samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub vehicle_id: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
    /// Insertion order; not trusted to be sorted.
    pub points: Vec<RawSample>,
    #[serde(default)]
    pub synced: bool,
}

/// Reference coordinate that location deltas are taken against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location delta against [`BaseLocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDelta {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompactRotation {
    pub a: f64,
    pub b: f64,
    pub g: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompactSensorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Acceleration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<CompactRotation>,
}

/// A delta/precision-reduced sample record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedPoint {
    /// Milliseconds since the segment's base timestamp.
    pub t: i64,
    /// 1 when moving, 0 otherwise.
    pub m: u8,
    /// Confidence at 2 decimals.
    pub c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<LocationDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<CompactSensorData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedSegment {
    pub id: String,
    pub vehicle_id: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub synced: bool,
    pub base_timestamp: i64,
    pub base_location: BaseLocation,
    pub compressed_points: Vec<CompressedPoint>,
    pub compression_ratio: f64,
    pub original_point_count: usize,
}

/// Output of the encoder.
///
/// An empty segment is not compressed at all and travels as-is. Serialization
/// is untagged, so readers tell the two shapes apart by the presence of
/// `compressedPoints`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedSegment {
    Compressed(CompressedSegment),
    Passthrough(Segment),
}

impl<'de> Deserialize<'de> for EncodedSegment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        // Pick the shape up front so field errors are reported for that shape
        if value.get("compressedPoints").is_some() {
            CompressedSegment::deserialize(value)
                .map(EncodedSegment::Compressed)
                .map_err(|e| de::Error::custom(format!("invalid compressed segment: {}", e)))
        } else {
            Segment::deserialize(value)
                .map(EncodedSegment::Passthrough)
                .map_err(|e| de::Error::custom(format!("invalid segment: {}", e)))
        }
    }
}

impl EncodedSegment {
    pub fn is_compressed(&self) -> bool {
        matches!(self, EncodedSegment::Compressed(_))
    }

    pub fn as_compressed(&self) -> Option<&CompressedSegment> {
        match self {
            EncodedSegment::Compressed(compressed) => Some(compressed),
            EncodedSegment::Passthrough(_) => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EncodedSegment::Compressed(compressed) => &compressed.id,
            EncodedSegment::Passthrough(segment) => &segment.id,
        }
    }

    /// Number of sample records carried.
    pub fn point_count(&self) -> usize {
        match self {
            EncodedSegment::Compressed(compressed) => compressed.compressed_points.len(),
            EncodedSegment::Passthrough(segment) => segment.points.len(),
        }
    }
}

impl From<CompressedSegment> for EncodedSegment {
    fn from(compressed: CompressedSegment) -> Self {
        EncodedSegment::Compressed(compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optionals_are_omitted() {
        let sample = RawSample::new(1_000, true, 0.9);
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"timestamp":1000,"isMoving":true,"confidence":0.9}"#);
    }

    #[test]
    fn test_sample_parses_without_optionals() {
        let json = r#"{"timestamp":5,"isMoving":false,"confidence":0.5}"#;
        let sample: RawSample = serde_json::from_str(json).unwrap();
        assert!(sample.location.is_none());
        assert!(sample.sensor_data.is_none());
        assert!(!sample.is_moving);
    }

    #[test]
    fn test_non_finite_location_is_unusable() {
        let sample = RawSample::new(0, false, 1.0).with_location(Location::new(f64::NAN, 10.0));
        assert!(sample.location.is_some());
        assert!(sample.usable_location().is_none());
    }

    #[test]
    fn test_acceleration_magnitude() {
        let data = SensorData {
            acceleration: Some(Acceleration { x: 3.0, y: 4.0, z: 0.0 }),
            rotation: None,
        };
        let sample = RawSample::new(0, true, 1.0).with_sensor_data(data);
        assert_eq!(sample.acceleration_magnitude(), Some(5.0));
        assert_eq!(RawSample::new(0, true, 1.0).acceleration_magnitude(), None);
    }

    #[test]
    fn test_untagged_shapes_are_distinguished() {
        let passthrough = r#"{"id":"s","vehicleId":"v","userId":"u","startTime":0,"endTime":0,"points":[],"synced":false}"#;
        let encoded: EncodedSegment = serde_json::from_str(passthrough).unwrap();
        assert!(!encoded.is_compressed());

        let compressed = r#"{"id":"s","vehicleId":"v","userId":"u","startTime":0,"endTime":0,"synced":true,
            "baseTimestamp":10,"baseLocation":{"latitude":1.0,"longitude":2.0},
            "compressedPoints":[{"t":0,"m":1,"c":0.5}],"compressionRatio":1.0,"originalPointCount":1}"#;
        let encoded: EncodedSegment = serde_json::from_str(compressed).unwrap();
        assert!(encoded.is_compressed());
        assert_eq!(encoded.point_count(), 1);
        assert_eq!(encoded.id(), "s");
    }

    #[test]
    fn test_malformed_compressed_payload_reports_field() {
        let json = r#"{"id":"s","vehicleId":"v","userId":"u","startTime":0,"endTime":0,
            "baseTimestamp":10,"baseLocation":{"latitude":1.0,"longitude":2.0},
            "compressedPoints":[{"m":1,"c":0.5}],"compressionRatio":1.0,"originalPointCount":1}"#;
        let err = serde_json::from_str::<EncodedSegment>(json).unwrap_err().to_string();
        assert!(err.contains("invalid compressed segment"), "{}", err);
        assert!(err.contains("missing field `t`"), "{}", err);
    }

    #[test]
    fn test_malformed_passthrough_reports_field() {
        let json = r#"{"id":"s","vehicleId":"v","userId":"u","startTime":0,"endTime":0}"#;
        let err = serde_json::from_str::<EncodedSegment>(json).unwrap_err().to_string();
        assert!(err.contains("missing field `points`"), "{}", err);
    }
}
