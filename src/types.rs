// src/types.rs

use serde::{Deserialize, Serialize};

/// Discrete device orientation, as published to subscribers.
///
/// Each state has a fixed canonical unit vector: the gravity direction
/// (projected onto the screen plane) when the device rests exactly in that
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrientationState {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl OrientationState {
    /// Gravity direction for a device resting exactly in this orientation.
    pub fn canonical_vector(&self) -> OrientationVector {
        match self {
            Self::Portrait => OrientationVector::new(0.0, -1.0),
            Self::PortraitUpsideDown => OrientationVector::new(0.0, 1.0),
            Self::LandscapeRight => OrientationVector::new(-1.0, 0.0),
            Self::LandscapeLeft => OrientationVector::new(1.0, 0.0),
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }

    /// Whether `other` belongs to the opposite family (portrait vs
    /// landscape). Same-family states never oppose each other, so
    /// Portrait and PortraitUpsideDown are not opposites for this test.
    pub fn opposes(&self, other: OrientationState) -> bool {
        self.is_landscape() != other.is_landscape()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::PortraitUpsideDown => "portrait_upside_down",
            Self::LandscapeLeft => "landscape_left",
            Self::LandscapeRight => "landscape_right",
        }
    }
}

/// A gravity reading projected onto the device's screen plane.
///
/// Components are normalized, roughly in [-1, 1]. Created per sample,
/// immutable, consumed synchronously by the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationVector {
    pub x: f32,
    pub y: f32,
}

impl OrientationVector {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: OrientationVector) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Raw 3-axis gravity sample as produced by the sensor collaborator.
#[derive(Debug, Clone, Copy)]
pub struct GravityReading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub timestamp_ms: u64,
}

impl GravityReading {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ms: u64) -> Self {
        Self { x, y, z, timestamp_ms }
    }

    /// Project onto the screen plane, dropping the axis perpendicular to
    /// the display.
    pub fn screen_projection(&self) -> OrientationVector {
        OrientationVector::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fixed sampling cadence; one classification pass per interval.
    /// Bursts of sensor updates inside an interval coalesce to the newest.
    pub sample_interval_ms: u64,
    /// Capacity of the rolling gravity-sample window.
    pub buffer_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 50,
            buffer_capacity: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_vectors_are_axis_aligned_units() {
        let states = [
            OrientationState::Portrait,
            OrientationState::PortraitUpsideDown,
            OrientationState::LandscapeLeft,
            OrientationState::LandscapeRight,
        ];

        for state in states {
            let v = state.canonical_vector();
            assert!(
                (v.x.abs() + v.y.abs() - 1.0).abs() < 1e-6,
                "{:?} vector is not an axis-aligned unit",
                state
            );
            assert!(v.x == 0.0 || v.y == 0.0);
        }
    }

    #[test]
    fn test_canonical_vectors_are_distinct() {
        let states = [
            OrientationState::Portrait,
            OrientationState::PortraitUpsideDown,
            OrientationState::LandscapeLeft,
            OrientationState::LandscapeRight,
        ];

        for a in states {
            for b in states {
                if a != b {
                    assert_ne!(a.canonical_vector(), b.canonical_vector());
                }
            }
        }
    }

    #[test]
    fn test_family_opposition() {
        use OrientationState::*;

        assert!(Portrait.opposes(LandscapeLeft));
        assert!(LandscapeRight.opposes(PortraitUpsideDown));
        // Same family is never opposite, even at 180 degrees.
        assert!(!Portrait.opposes(PortraitUpsideDown));
        assert!(!LandscapeLeft.opposes(LandscapeRight));
        assert!(!Portrait.opposes(Portrait));
    }

    #[test]
    fn test_distance_to() {
        let a = OrientationVector::new(0.0, -1.0);
        let b = OrientationVector::new(1.0, 0.0);
        assert!((a.distance_to(b) - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn test_screen_projection_drops_z() {
        let reading = GravityReading::new(0.3, -0.9, 0.4, 1000);
        let v = reading.screen_projection();
        assert_eq!(v.x, 0.3);
        assert_eq!(v.y, -0.9);
    }
}
