// src/pipeline/mod.rs

pub mod bus;
pub mod metrics;
pub mod orchestrator;

pub use bus::OrientationBus;
pub use metrics::{MetricsSummary, PipelineMetrics};
pub use orchestrator::{OrientationPipeline, PipelineState};
