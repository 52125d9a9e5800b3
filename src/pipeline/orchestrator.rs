// src/pipeline/orchestrator.rs
//
// OrientationPipeline: one serial classification worker per instance.
// Each tick reads the latest gravity sample, folds it into the bounded
// history window, classifies the window mean, and hands the result to
// the bus. Lifecycle transitions are serialized by a mutex; the shared
// sensor handle is retained while running and released on stop.

use crate::classifier::ClassifierSession;
use crate::pipeline::bus::OrientationBus;
use crate::pipeline::metrics::PipelineMetrics;
use crate::ring_buffer::BoundedRing;
use crate::sensor::{self, GravitySensor, SharedSensor};
use crate::types::{GravityReading, OrientationState, OrientationVector, PipelineConfig};
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Stopped,
    Running,
}

enum SensorBinding {
    /// Resolve the process-wide default handle at start() time.
    Default,
    /// Explicit handle shared with other pipeline instances.
    Shared(Arc<SharedSensor>),
    /// Caller-owned sensor; never started or stopped by the pipeline.
    External(Arc<dyn GravitySensor>),
}

#[derive(Clone)]
enum SampleSource {
    Shared(Arc<SharedSensor>),
    External(Arc<dyn GravitySensor>),
}

impl SampleSource {
    fn gravity(&self) -> Option<GravityReading> {
        match self {
            Self::Shared(shared) => shared.gravity(),
            Self::External(sensor) => sensor.gravity(),
        }
    }
}

struct Lifecycle {
    state: PipelineState,
    worker: Option<JoinHandle<()>>,
    /// Shared handle we hold an observer count on while running.
    retained: Option<Arc<SharedSensor>>,
}

pub struct OrientationPipeline {
    config: PipelineConfig,
    binding: SensorBinding,
    bus: Arc<Mutex<OrientationBus>>,
    metrics: PipelineMetrics,
    lifecycle: Mutex<Lifecycle>,
    stop_flag: Arc<AtomicBool>,
}

impl OrientationPipeline {
    /// Pipeline on the process-wide default sensor handle.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_binding(config, SensorBinding::Default)
    }

    /// Pipeline sharing an explicit handle with other instances. The
    /// underlying hardware starts with the first running pipeline and
    /// stops with the last.
    pub fn with_shared(config: PipelineConfig, shared: Arc<SharedSensor>) -> Self {
        Self::with_binding(config, SensorBinding::Shared(shared))
    }

    /// Pipeline on a caller-owned sensor. The caller keeps the sensor's
    /// lifecycle; this pipeline only reads from it.
    pub fn with_sensor(config: PipelineConfig, sensor: Arc<dyn GravitySensor>) -> Self {
        Self::with_binding(config, SensorBinding::External(sensor))
    }

    fn with_binding(config: PipelineConfig, binding: SensorBinding) -> Self {
        Self {
            config,
            binding,
            bus: Arc::new(Mutex::new(OrientationBus::new())),
            metrics: PipelineMetrics::new(),
            lifecycle: Mutex::new(Lifecycle {
                state: PipelineState::Stopped,
                worker: None,
                retained: None,
            }),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> Receiver<OrientationState> {
        self.bus.lock().unwrap().subscribe()
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn state(&self) -> PipelineState {
        self.lifecycle.lock().unwrap().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// Begin sampling. No-op when already running, when no default
    /// handle is installed, or when the sensor reports unavailable.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().unwrap();
        if lifecycle.state == PipelineState::Running {
            debug!("start ignored: pipeline already running");
            return;
        }

        let source = match &self.binding {
            SensorBinding::Default => {
                let Some(shared) = sensor::default_shared() else {
                    debug!("start ignored: no default gravity sensor installed");
                    return;
                };
                if !shared.retain() {
                    debug!("start ignored: gravity sensor unavailable");
                    return;
                }
                lifecycle.retained = Some(shared.clone());
                SampleSource::Shared(shared)
            }
            SensorBinding::Shared(shared) => {
                if !shared.retain() {
                    debug!("start ignored: gravity sensor unavailable");
                    return;
                }
                lifecycle.retained = Some(shared.clone());
                SampleSource::Shared(shared.clone())
            }
            SensorBinding::External(external) => {
                if !external.is_available() {
                    debug!("start ignored: gravity sensor unavailable");
                    return;
                }
                SampleSource::External(external.clone())
            }
        };

        self.stop_flag.store(false, Ordering::SeqCst);
        let worker = Worker {
            interval: Duration::from_millis(self.config.sample_interval_ms),
            buffer_capacity: self.config.buffer_capacity,
            source,
            bus: self.bus.clone(),
            metrics: self.metrics.clone(),
            stop: self.stop_flag.clone(),
        };
        lifecycle.worker = Some(thread::spawn(move || worker.run()));
        lifecycle.state = PipelineState::Running;
        info!(
            "orientation pipeline running at {} ms per sample",
            self.config.sample_interval_ms
        );
    }

    /// Stop sampling. Safe to call from any thread; once this returns,
    /// no further classification pass runs and no further value is
    /// delivered. No-op when already stopped. The shared handle's
    /// observer count is released only after the worker has been joined.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().unwrap();
        if lifecycle.state == PipelineState::Stopped {
            debug!("stop ignored: pipeline already stopped");
            return;
        }

        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(worker) = lifecycle.worker.take() {
            if worker.join().is_err() {
                warn!("classification worker panicked");
            }
        }
        if let Some(shared) = lifecycle.retained.take() {
            shared.release();
        }
        lifecycle.state = PipelineState::Stopped;
        info!("orientation pipeline stopped");
    }
}

impl Drop for OrientationPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The serial classification worker. The session and sample window are
/// owned here; the only shared pieces are the bus, the metrics, and the
/// stop flag.
struct Worker {
    interval: Duration,
    buffer_capacity: usize,
    source: SampleSource,
    bus: Arc<Mutex<OrientationBus>>,
    metrics: PipelineMetrics,
    stop: Arc<AtomicBool>,
}

impl Worker {
    fn run(self) {
        let mut session = ClassifierSession::new();
        let mut window: BoundedRing<GravityReading> = BoundedRing::new(self.buffer_capacity);

        while !self.stop.load(Ordering::SeqCst) {
            self.tick(&mut session, &mut window);
            thread::sleep(self.interval);
        }
    }

    fn tick(&self, session: &mut ClassifierSession, window: &mut BoundedRing<GravityReading>) {
        let Some(reading) = self.source.gravity() else {
            self.metrics.inc(&self.metrics.empty_reads);
            return;
        };
        self.metrics.inc(&self.metrics.samples_read);
        window.append(reading);

        let vector = window_mean(window);
        self.metrics.inc(&self.metrics.classification_passes);
        let Some(state) = session.classify(vector) else {
            self.metrics.inc(&self.metrics.unmatched_samples);
            return;
        };

        let delivered = self.bus.lock().unwrap().publish(state);
        if delivered {
            self.metrics.inc(&self.metrics.orientation_changes);
            info!("orientation -> {}", state.as_str());
        } else {
            self.metrics.inc(&self.metrics.duplicates_suppressed);
        }
    }
}

/// Screen-plane mean over the buffered window. Single-sample spikes die
/// here before they reach the classifier.
fn window_mean(window: &BoundedRing<GravityReading>) -> OrientationVector {
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    for reading in window.iter() {
        let v = reading.screen_projection();
        x += v.x;
        y += v.y;
    }
    let n = window.len() as f32;
    OrientationVector::new(x / n, y / n)
}
