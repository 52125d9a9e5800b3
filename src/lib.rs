//! Device Orientation Detection Engine
//!
//! Converts a continuous stream of gravity readings into a stable
//! discrete orientation state, suppressing sensor jitter near quadrant
//! boundaries.
//!
//! The flow: a raw 3-axis gravity sample is projected onto the screen
//! plane, buffered in a fixed-capacity ring, matched against four
//! angular quadrants, and resolved through a hysteresis bias that
//! penalizes flips across the portrait/landscape family boundary.
//! Subscribers receive the resulting state stream with consecutive
//! duplicates removed.
//!
//! # Example
//!
//! ```ignore
//! use orientation_detection::sensor::{self, SimulatedGravitySensor};
//! use orientation_detection::{OrientationPipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! let sim = Arc::new(SimulatedGravitySensor::new());
//! sim.set_gravity(0.0, -0.98, 0.1, 0);
//! sensor::install_default(sim);
//!
//! let pipeline = OrientationPipeline::new(PipelineConfig::default());
//! let orientations = pipeline.subscribe();
//! pipeline.start();
//!
//! // orientations.recv() now yields each state change exactly once.
//! ```

pub mod classifier;
pub mod config;
pub mod pipeline;
pub mod ring_buffer;
pub mod sensor;
pub mod types;

// Re-export commonly used types
pub use classifier::ClassifierSession;
pub use pipeline::{
    MetricsSummary, OrientationBus, OrientationPipeline, PipelineMetrics, PipelineState,
};
pub use ring_buffer::BoundedRing;
pub use sensor::{GravitySensor, SensorError, SharedSensor, SimulatedGravitySensor};
pub use types::{Config, GravityReading, OrientationState, OrientationVector, PipelineConfig};
