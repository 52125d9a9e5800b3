// src/pipeline/metrics.rs
//
// Pipeline observability. Counters for every stage of the sample flow,
// cheap enough to update from the worker on every tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    /// Gravity readings obtained from the sensor.
    pub samples_read: Arc<AtomicU64>,
    /// Ticks where the sensor had no reading yet.
    pub empty_reads: Arc<AtomicU64>,
    /// Classification passes executed.
    pub classification_passes: Arc<AtomicU64>,
    /// Defensive branch: samples no quadrant claimed.
    pub unmatched_samples: Arc<AtomicU64>,
    /// State changes actually forwarded to subscribers.
    pub orientation_changes: Arc<AtomicU64>,
    /// Re-emissions swallowed by the duplicate filter.
    pub duplicates_suppressed: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            samples_read: Arc::new(AtomicU64::new(0)),
            empty_reads: Arc::new(AtomicU64::new(0)),
            classification_passes: Arc::new(AtomicU64::new(0)),
            unmatched_samples: Arc::new(AtomicU64::new(0)),
            orientation_changes: Arc::new(AtomicU64::new(0)),
            duplicates_suppressed: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Samples per second since the pipeline was created.
    pub fn sample_rate(&self) -> f64 {
        let samples = self.samples_read.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            samples as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            samples_read: self.samples_read.load(Ordering::Relaxed),
            empty_reads: self.empty_reads.load(Ordering::Relaxed),
            classification_passes: self.classification_passes.load(Ordering::Relaxed),
            unmatched_samples: self.unmatched_samples.load(Ordering::Relaxed),
            orientation_changes: self.orientation_changes.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            sample_rate: self.sample_rate(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub samples_read: u64,
    pub empty_reads: u64,
    pub classification_passes: u64,
    pub unmatched_samples: u64,
    pub orientation_changes: u64,
    pub duplicates_suppressed: u64,
    pub sample_rate: f64,
    pub elapsed_secs: f64,
}
