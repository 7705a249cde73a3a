use crate::error::TelemetryError;
use std::str::FromStr;

/// Thresholds driving the adaptive sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Sequences of at most this many points are never reduced.
    pub min_points: usize,
    /// Force a sample once this many milliseconds passed since the last kept one.
    pub max_gap_ms: i64,
    /// Acceleration magnitude variance above which a sample is kept.
    pub variance_threshold: f64,
    /// Planar degree distance above which a sample is kept (~11 m at the equator).
    pub location_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            max_gap_ms: 30_000,
            variance_threshold: 0.5,
            location_threshold: 0.0001,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.max_gap_ms < 0 {
            return Err(TelemetryError::Config(format!("max_gap_ms must be non-negative, got {}", self.max_gap_ms)));
        }
        if !(self.variance_threshold >= 0.0) {
            return Err(TelemetryError::Config(format!("variance_threshold must be non-negative, got {}", self.variance_threshold)));
        }
        if !(self.location_threshold >= 0.0) {
            return Err(TelemetryError::Config(format!("location_threshold must be non-negative, got {}", self.location_threshold)));
        }
        Ok(())
    }
}

/// Serialization used when measuring payload sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeFormat {
    #[default]
    Json,
    Bincode,
}

impl FromStr for SizeFormat {
    type Err = TelemetryError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(SizeFormat::Json),
            "bincode" => Ok(SizeFormat::Bincode),
            _ => Err(TelemetryError::Config(format!("Invalid size format: {}", s))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodecConfig {
    pub sampler: SamplerConfig,
    pub size_format: SizeFormat,
    /// Worker threads for batch operations.
    pub threads: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            size_format: SizeFormat::Json,
            threads: num_cpus::get(),
        }
    }
}

impl CodecConfig {
    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_size_format(mut self, size_format: SizeFormat) -> Self {
        self.size_format = size_format;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.threads == 0 {
            return Err(TelemetryError::Config("threads must be at least 1".to_string()));
        }
        self.sampler.validate()
    }
}
