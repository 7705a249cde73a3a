use crate::config::CodecConfig;
use crate::decoder;
use crate::encoder::DeltaEncoder;
use crate::error::Result;
use crate::estimator::SizeReport;
use crate::model::{EncodedSegment, Segment};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;

/// Aggregate figures for one or more compressed segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
	pub segments: usize,
	pub original_points: usize,
	pub retained_points: usize,
	/// `original_points / retained_points`
	pub point_ratio: f64,
	pub original_size: usize,
	pub compressed_size: usize,
	/// `original_size / compressed_size`
	pub ratio: f64,
}

impl CompressionStats {
	pub fn new(original_points: usize, retained_points: usize, sizes: SizeReport) -> Self {
		let point_ratio = if retained_points > 0 { original_points as f64 / retained_points as f64 } else { 1.0 };
		Self {
			segments: 1,
			original_points,
			retained_points,
			point_ratio,
			original_size: sizes.original_size,
			compressed_size: sizes.compressed_size,
			ratio: sizes.ratio,
		}
	}

	/// Combine per-segment stats into totals.
	pub fn merge(parts: &[CompressionStats]) -> Self {
		let original_points = parts.iter().map(|s| s.original_points).sum();
		let retained_points = parts.iter().map(|s| s.retained_points).sum();
		let original_size: usize = parts.iter().map(|s| s.original_size).sum();
		let compressed_size: usize = parts.iter().map(|s| s.compressed_size).sum();
		let ratio = if compressed_size > 0 { original_size as f64 / compressed_size as f64 } else { 0.0 };
		let mut merged = Self::new(
			original_points,
			retained_points,
			SizeReport { original_size, compressed_size, ratio },
		);
		merged.segments = parts.iter().map(|s| s.segments).sum();
		merged
	}
}

/// Codec front door: configured encoder, decoder and size accounting.
pub struct TripCodec {
	config: CodecConfig,
	encoder: DeltaEncoder,
}

impl TripCodec {
	pub fn new(config: CodecConfig) -> Result<Self> {
		config.validate()?;
		let encoder = DeltaEncoder::new(config.sampler);
		Ok(Self { config, encoder })
	}

	pub fn config(&self) -> &CodecConfig {
		&self.config
	}

	pub fn compress(&self, segment: &Segment) -> EncodedSegment {
		self.encoder.compress(segment)
	}

	/// Decoding never restores samples the sampler dropped.
	pub fn decompress(&self, encoded: &EncodedSegment) -> Segment {
		decoder::decompress(encoded)
	}

	pub fn compress_with_stats(&self, segment: &Segment) -> Result<(EncodedSegment, CompressionStats)> {
		let encoded = self.compress(segment);
		let stats = self.stats(segment, &encoded)?;
		Ok((encoded, stats))
	}

	pub fn stats(&self, segment: &Segment, encoded: &EncodedSegment) -> Result<CompressionStats> {
		let sizes = SizeReport::measure(segment, encoded, self.config.size_format)?;
		Ok(CompressionStats::new(segment.points.len(), encoded.point_count(), sizes))
	}

	/// Compress independent segments in parallel. Output order matches input.
	pub fn compress_batch(&self, segments: &[Segment]) -> Result<Vec<EncodedSegment>> {
		self.compress_batch_with_progress(segments, &ProgressBar::hidden())
	}

	pub fn compress_batch_with_progress(&self, segments: &[Segment], pb: &ProgressBar) -> Result<Vec<EncodedSegment>> {
		let pool = self.thread_pool()?;
		let encoded = pool.install(|| {
			segments
				.par_iter()
				.map(|segment| {
					let encoded = self.encoder.compress(segment);
					pb.inc(1);
					encoded
				})
				.collect::<Vec<_>>()
		});
		log::info!("Compressed {} segments on {} threads", encoded.len(), self.config.threads);
		Ok(encoded)
	}

	/// Decompress independent segments in parallel. Output order matches input.
	pub fn decompress_batch(&self, encoded: &[EncodedSegment]) -> Result<Vec<Segment>> {
		self.decompress_batch_with_progress(encoded, &ProgressBar::hidden())
	}

	pub fn decompress_batch_with_progress(&self, encoded: &[EncodedSegment], pb: &ProgressBar) -> Result<Vec<Segment>> {
		let pool = self.thread_pool()?;
		let segments = pool.install(|| {
			encoded
				.par_iter()
				.map(|item| {
					let segment = decoder::decompress(item);
					pb.inc(1);
					segment
				})
				.collect::<Vec<_>>()
		});
		log::info!("Decompressed {} segments on {} threads", segments.len(), self.config.threads);
		Ok(segments)
	}

	/// Totals across a batch; `segments` and `encoded` are paired by index.
	pub fn batch_stats(&self, segments: &[Segment], encoded: &[EncodedSegment]) -> Result<CompressionStats> {
		let parts = segments
			.iter()
			.zip(encoded)
			.map(|(segment, item)| self.stats(segment, item))
			.collect::<Result<Vec<_>>>()?;
		Ok(CompressionStats::merge(&parts))
	}

	fn thread_pool(&self) -> Result<rayon::ThreadPool> {
		Ok(rayon::ThreadPoolBuilder::new().num_threads(self.config.threads).build()?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::RawSample;

	fn trip(id: &str, count: usize) -> Segment {
		Segment {
			id: id.to_string(),
			vehicle_id: "bus-12".to_string(),
			user_id: "op-4".to_string(),
			start_time: 0,
			end_time: count as i64 * 1_000,
			points: (0..count).map(|i| RawSample::new(i as i64 * 1_000, true, 0.9)).collect(),
			synced: false,
		}
	}

	#[test]
	fn test_batch_preserves_order() {
		let codec = TripCodec::new(CodecConfig::default().with_threads(2)).unwrap();
		let segments: Vec<Segment> = (0..16).map(|i| trip(&format!("trip-{}", i), 40 + i)).collect();

		let encoded = codec.compress_batch(&segments).unwrap();
		let ids: Vec<&str> = encoded.iter().map(|e| e.id()).collect();
		let expected: Vec<String> = (0..16).map(|i| format!("trip-{}", i)).collect();
		assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());

		let decoded = codec.decompress_batch(&encoded).unwrap();
		for (original, restored) in segments.iter().zip(&decoded) {
			assert_eq!(original.id, restored.id);
			assert_eq!(restored.points.len(), encoded.iter().find(|e| e.id() == original.id).unwrap().point_count());
		}
	}

	#[test]
	fn test_batch_matches_single() {
		let codec = TripCodec::new(CodecConfig::default()).unwrap();
		let segments = vec![trip("a", 5), trip("b", 120), trip("c", 0)];
		let batch = codec.compress_batch(&segments).unwrap();
		let single: Vec<EncodedSegment> = segments.iter().map(|s| codec.compress(s)).collect();
		assert_eq!(batch, single);
	}

	#[test]
	fn test_stats() {
		let codec = TripCodec::new(CodecConfig::default()).unwrap();
		let segment = trip("stats", 100);
		let (encoded, stats) = codec.compress_with_stats(&segment).unwrap();
		assert_eq!(stats.segments, 1);
		assert_eq!(stats.original_points, 100);
		assert_eq!(stats.retained_points, encoded.point_count());
		assert!(stats.point_ratio > 1.0);
		assert!(stats.ratio > 1.0);
	}

	#[test]
	fn test_merge_totals() {
		let codec = TripCodec::new(CodecConfig::default()).unwrap();
		let segments = vec![trip("x", 3), trip("y", 200)];
		let encoded = codec.compress_batch(&segments).unwrap();
		let totals = codec.batch_stats(&segments, &encoded).unwrap();
		assert_eq!(totals.segments, 2);
		assert_eq!(totals.original_points, 203);
		assert_eq!(totals.retained_points, encoded.iter().map(|e| e.point_count()).sum::<usize>());
	}

	#[test]
	fn test_invalid_config_rejected() {
		assert!(TripCodec::new(CodecConfig::default().with_threads(0)).is_err());
	}
}
