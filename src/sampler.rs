//! Adaptive, feature-preserving subsampling
//!
//! Steady stretches of a trip (constant heading, constant speed, no state
//! change) are highly redundant. The sampler walks the sequence and keeps a
//! sample only when something analytically interesting happened since the last
//! kept one: a long enough gap, a burst of acceleration variance, a position
//! change, or a motion-state transition. Endpoints are always kept.

use crate::config::SamplerConfig;
use crate::model::RawSample;

/// Running acceleration magnitude statistics over the window
/// `[last kept, current]` (Welford's algorithm).
#[derive(Debug, Default, Clone, Copy)]
struct MagnitudeWindow {
    count: usize,
    mean: f64,
    m2: f64,
}

impl MagnitudeWindow {
    fn starting_at(sample: &RawSample) -> Self {
        let mut window = Self::default();
        window.push(sample);
        window
    }

    /// Samples without a (finite) acceleration reading do not contribute.
    fn push(&mut self, sample: &RawSample) {
        let Some(magnitude) = sample.acceleration_magnitude().filter(|m| m.is_finite()) else {
            return;
        };
        self.count += 1;
        let delta = magnitude - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (magnitude - self.mean);
    }

    /// Population variance; 0 with fewer than two readings.
    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0)
        }
    }
}

/// Why a sample was retained. Mostly useful for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    Endpoint,
    TimeGap,
    Variance,
    LocationChange,
    StateTransition,
}

pub struct AdaptiveSampler {
    config: SamplerConfig,
}

impl AdaptiveSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Reduce `points` to a temporally ordered subsequence.
    ///
    /// Expects `points` already sorted by timestamp. Inputs at or below the
    /// configured floor come back unchanged.
    pub fn sample(&self, points: &[RawSample]) -> Vec<RawSample> {
        if points.len() <= self.config.min_points {
            return points.to_vec();
        }
        let kept = self.select(points);
        log::debug!("Adaptive sampling kept {} of {} points", kept.len(), points.len());
        kept.into_iter().map(|(i, _)| points[i].clone()).collect()
    }

    /// Indices of retained samples, in order.
    pub fn sample_indices(&self, points: &[RawSample]) -> Vec<usize> {
        if points.len() <= self.config.min_points {
            return (0..points.len()).collect();
        }
        self.select(points).into_iter().map(|(i, _)| i).collect()
    }

    /// Indices of retained samples paired with the rule that retained them.
    pub fn explain(&self, points: &[RawSample]) -> Vec<(usize, KeepReason)> {
        if points.len() <= self.config.min_points {
            return (0..points.len()).map(|i| (i, KeepReason::Endpoint)).collect();
        }
        self.select(points)
    }

    fn select(&self, points: &[RawSample]) -> Vec<(usize, KeepReason)> {
        let len = points.len();
        if len == 0 {
            return Vec::new();
        }

        let mut kept = vec![(0, KeepReason::Endpoint)];
        let mut last = 0;
        let mut window = MagnitudeWindow::starting_at(&points[0]);

        for i in 1..len.saturating_sub(1) {
            window.push(&points[i]);
            if let Some(reason) = self.keep_reason(&points[last], &points[i], window.variance()) {
                kept.push((i, reason));
                last = i;
                window = MagnitudeWindow::starting_at(&points[i]);
            }
        }

        if len > 1 && last != len - 1 {
            kept.push((len - 1, KeepReason::Endpoint));
        }
        kept
    }

    fn keep_reason(&self, last: &RawSample, current: &RawSample, variance: f64) -> Option<KeepReason> {
        let elapsed = current.timestamp.saturating_sub(last.timestamp);
        if elapsed > self.config.max_gap_ms {
            return Some(KeepReason::TimeGap);
        }
        if variance > self.config.variance_threshold {
            return Some(KeepReason::Variance);
        }
        let location_change = match (last.usable_location(), current.usable_location()) {
            (Some(from), Some(to)) => from.planar_distance(to),
            _ => 0.0,
        };
        if location_change > self.config.location_threshold {
            return Some(KeepReason::LocationChange);
        }
        if current.is_moving != last.is_moving {
            return Some(KeepReason::StateTransition);
        }
        None
    }
}

impl Default for AdaptiveSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

/// Sample with the default thresholds.
pub fn adaptive_sample(points: &[RawSample]) -> Vec<RawSample> {
    AdaptiveSampler::default().sample(points)
}
