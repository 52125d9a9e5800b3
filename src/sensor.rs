// src/sensor.rs
//
// Sensor collaborator boundary: the trait the platform motion source
// implements, a process-wide shared handle with observer reference
// counting, and a simulated source for tests and the demo binary.

use crate::types::GravityReading;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("motion sensing hardware unavailable")]
    Unavailable,
    #[error("sensor failed to start: {0}")]
    StartFailed(String),
}

/// The platform gravity source. Implementations must tolerate start/stop
/// being driven from any thread; `gravity()` hands out the latest 3-axis
/// reading on demand.
pub trait GravitySensor: Send + Sync {
    fn is_available(&self) -> bool;
    fn start(&self) -> Result<(), SensorError>;
    fn stop(&self);
    fn gravity(&self) -> Option<GravityReading>;
}

/// A sensor handle shared by any number of pipelines.
///
/// The underlying hardware is started exactly when the observer count
/// goes 0 -> 1 and stopped exactly when it returns to 0. Count mutation
/// and the start/stop call happen inside one critical section, so
/// concurrent retain/release from different pipelines cannot lose
/// updates or double-start the hardware.
pub struct SharedSensor {
    sensor: Arc<dyn GravitySensor>,
    observers: Mutex<usize>,
}

impl SharedSensor {
    pub fn new(sensor: Arc<dyn GravitySensor>) -> Arc<Self> {
        Arc::new(Self {
            sensor,
            observers: Mutex::new(0),
        })
    }

    pub fn is_available(&self) -> bool {
        self.sensor.is_available()
    }

    pub fn gravity(&self) -> Option<GravityReading> {
        self.sensor.gravity()
    }

    pub fn observer_count(&self) -> usize {
        *self.observers.lock().unwrap()
    }

    /// Register one observer, starting the hardware on the 0 -> 1
    /// transition. Returns false (count untouched) when the sensor is
    /// unavailable or refuses to start.
    pub fn retain(&self) -> bool {
        let mut observers = self.observers.lock().unwrap();

        if *observers == 0 {
            if !self.sensor.is_available() {
                debug!("gravity sensor unavailable; observer not registered");
                return false;
            }
            if let Err(err) = self.sensor.start() {
                warn!("gravity sensor failed to start: {}", err);
                return false;
            }
            info!("gravity sensor started");
        }

        *observers += 1;
        true
    }

    /// Drop one observer, stopping the hardware on the 1 -> 0 transition.
    pub fn release(&self) {
        let mut observers = self.observers.lock().unwrap();

        if *observers == 0 {
            warn!("sensor release without a matching retain");
            return;
        }

        *observers -= 1;
        if *observers == 0 {
            self.sensor.stop();
            info!("gravity sensor stopped");
        }
    }
}

static DEFAULT_SENSOR: OnceCell<Arc<SharedSensor>> = OnceCell::new();

/// Install the process-wide default sensor handle. The first call wins;
/// returns false (leaving the existing handle in place) on later calls.
pub fn install_default(sensor: Arc<dyn GravitySensor>) -> bool {
    DEFAULT_SENSOR.set(SharedSensor::new(sensor)).is_ok()
}

/// The process-wide default handle, if one has been installed.
pub fn default_shared() -> Option<Arc<SharedSensor>> {
    DEFAULT_SENSOR.get().cloned()
}

/// In-process gravity source with a settable reading. Stands in for the
/// platform sensor in the demo binary and in tests.
pub struct SimulatedGravitySensor {
    reading: Mutex<Option<GravityReading>>,
    running: AtomicBool,
}

impl SimulatedGravitySensor {
    pub fn new() -> Self {
        Self {
            reading: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    pub fn set_gravity(&self, x: f32, y: f32, z: f32, timestamp_ms: u64) {
        *self.reading.lock().unwrap() = Some(GravityReading::new(x, y, z, timestamp_ms));
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedGravitySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl GravitySensor for SimulatedGravitySensor {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&self) -> Result<(), SensorError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn gravity(&self) -> Option<GravityReading> {
        *self.reading.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    /// Counts hardware start/stop calls so tests can assert the refcount
    /// transitions exactly.
    struct CountingSensor {
        available: bool,
        starts: AtomicU32,
        stops: AtomicU32,
    }

    impl CountingSensor {
        fn new(available: bool) -> Self {
            Self {
                available,
                starts: AtomicU32::new(0),
                stops: AtomicU32::new(0),
            }
        }
    }

    impl GravitySensor for CountingSensor {
        fn is_available(&self) -> bool {
            self.available
        }

        fn start(&self) -> Result<(), SensorError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn gravity(&self) -> Option<GravityReading> {
            Some(GravityReading::new(0.0, -1.0, 0.0, 0))
        }
    }

    #[test]
    fn test_retain_starts_hardware_once() {
        let sensor = Arc::new(CountingSensor::new(true));
        let shared = SharedSensor::new(sensor.clone());

        assert!(shared.retain());
        assert!(shared.retain());
        assert_eq!(shared.observer_count(), 2);
        assert_eq!(sensor.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_stops_hardware_only_at_zero() {
        let sensor = Arc::new(CountingSensor::new(true));
        let shared = SharedSensor::new(sensor.clone());

        shared.retain();
        shared.retain();

        shared.release();
        assert_eq!(sensor.stops.load(Ordering::SeqCst), 0);

        shared.release();
        assert_eq!(sensor.stops.load(Ordering::SeqCst), 1);
        assert_eq!(shared.observer_count(), 0);
    }

    #[test]
    fn test_retain_unavailable_sensor_is_noop() {
        let sensor = Arc::new(CountingSensor::new(false));
        let shared = SharedSensor::new(sensor.clone());

        assert!(!shared.retain());
        assert_eq!(shared.observer_count(), 0);
        assert_eq!(sensor.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_retain_start_failure_leaves_count_untouched() {
        struct FailingSensor;
        impl GravitySensor for FailingSensor {
            fn is_available(&self) -> bool {
                true
            }
            fn start(&self) -> Result<(), SensorError> {
                Err(SensorError::StartFailed("hardware wedged".to_string()))
            }
            fn stop(&self) {}
            fn gravity(&self) -> Option<GravityReading> {
                None
            }
        }

        let shared = SharedSensor::new(Arc::new(FailingSensor));
        assert!(!shared.retain());
        assert_eq!(shared.observer_count(), 0);
    }

    #[test]
    fn test_release_without_retain_is_noop() {
        let sensor = Arc::new(CountingSensor::new(true));
        let shared = SharedSensor::new(sensor.clone());

        shared.release();
        assert_eq!(shared.observer_count(), 0);
        assert_eq!(sensor.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_restart_after_full_release() {
        let sensor = Arc::new(CountingSensor::new(true));
        let shared = SharedSensor::new(sensor.clone());

        shared.retain();
        shared.release();
        shared.retain();

        assert_eq!(sensor.starts.load(Ordering::SeqCst), 2);
        assert_eq!(sensor.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_retain_release_settles() {
        let sensor = Arc::new(CountingSensor::new(true));
        let shared = SharedSensor::new(sensor.clone());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if shared.retain() {
                            shared.release();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.observer_count(), 0);
        assert_eq!(
            sensor.starts.load(Ordering::SeqCst),
            sensor.stops.load(Ordering::SeqCst),
            "every start must have a matching stop"
        );
    }

    #[test]
    fn test_simulated_sensor_reading() {
        let sensor = SimulatedGravitySensor::new();
        assert!(sensor.gravity().is_none());

        sensor.set_gravity(0.1, -0.9, 0.0, 42);
        let reading = sensor.gravity().unwrap();
        assert_eq!(reading.timestamp_ms, 42);
        assert!((reading.y + 0.9).abs() < 1e-6);

        sensor.start().unwrap();
        assert!(sensor.is_running());
        sensor.stop();
        assert!(!sensor.is_running());
    }
}
