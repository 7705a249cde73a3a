//! # tripcodec
//!
//! Compression codec for vehicle trip telemetry. A trip ([`Segment`]) is a
//! time series of samples carrying a motion classification and, optionally, a
//! position fix and inertial sensor readings. The codec reduces it in two
//! stages:
//!
//! - **Adaptive sampling**: steady stretches are thinned out while turns,
//!   stops, starts, acceleration bursts and motion-state transitions are
//!   kept. A sample is also forced every 30 seconds so gaps stay bounded.
//! - **Delta encoding**: every retained sample is stored as an offset from the
//!   trip's first timestamp and first position fix, with coordinates kept at
//!   6 decimals, acceleration and confidence at 2, rotation at 1.
//!
//! Decoding restores absolute values within those precision bounds. It does
//! not restore samples dropped by the sampler: the decoded trip has exactly as
//! many points as the sampler kept.
//!
//! ## Quick Start
//!
//! ```rust
//! use tripcodec::{compress, decompress, RawSample, Location, Segment};
//!
//! let segment = Segment {
//!     id: "trip-1".to_string(),
//!     vehicle_id: "van-7".to_string(),
//!     user_id: "driver-3".to_string(),
//!     start_time: 0,
//!     end_time: 20_000,
//!     points: vec![
//!         RawSample::new(0, false, 0.91).with_location(Location::new(52.52, 13.405)),
//!         RawSample::new(10_000, true, 0.88).with_location(Location::new(52.5201, 13.4052)),
//!     ],
//!     synced: false,
//! };
//!
//! let encoded = compress(&segment);
//! assert!(encoded.is_compressed());
//!
//! let restored = decompress(&encoded);
//! assert_eq!(restored.points.len(), 2);
//! assert_eq!(restored.points[1].timestamp, 10_000);
//! ```
//!
//! ### Batches and statistics
//!
//! ```rust
//! use tripcodec::{CodecConfig, RawSample, Segment, TripCodec};
//!
//! let codec = TripCodec::new(CodecConfig::default()).unwrap();
//! let segments: Vec<Segment> = (0..4)
//!     .map(|n| Segment {
//!         id: format!("trip-{}", n),
//!         vehicle_id: "bus".to_string(),
//!         user_id: "op".to_string(),
//!         start_time: 0,
//!         end_time: 120_000,
//!         points: (0..120).map(|i| RawSample::new(i * 1_000, true, 0.9)).collect(),
//!         synced: false,
//!     })
//!     .collect();
//!
//! let encoded = codec.compress_batch(&segments).unwrap();
//! let stats = codec.batch_stats(&segments, &encoded).unwrap();
//! assert!(stats.ratio > 1.0);
//! ```

pub mod cli;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod model;
pub mod pipeline;
pub mod rounding;
pub mod sampler;

pub use config::{CodecConfig, SamplerConfig, SizeFormat};
pub use decoder::decompress;
pub use encoder::{compress, DeltaEncoder};
pub use error::{Result, TelemetryError};
pub use estimator::{compression_ratio, estimate_compressed_size, estimate_size, SizeReport};
pub use model::{
    Acceleration, BaseLocation, CompressedPoint, CompressedSegment, EncodedSegment, Location,
    RawSample, Rotation, Segment, SensorData,
};
pub use pipeline::{CompressionStats, TripCodec};
pub use sampler::{adaptive_sample, AdaptiveSampler};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
