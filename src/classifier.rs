// src/classifier.rs
//
// Quadrant classification with hysteresis damping.
//
// A gravity vector is matched against four overlapping angular sectors,
// each bounded by the canonical vectors of two adjacent orientation
// states. The first matching sector yields two candidate states; the
// hysteresis bias then penalizes the candidate that would flip the
// previous state across the portrait/landscape family boundary.

use crate::types::{OrientationState, OrientationVector};
use tracing::debug;

// ============================================================================
// HYSTERESIS
// ============================================================================

/// Distance multiplier applied to the candidate whose family (portrait vs
/// landscape) differs from the previously emitted state. A small tilt
/// toward the opposite family must overcome a 4x handicap before it wins.
const HYSTERESIS_BIAS: f32 = 4.0;

/// One of four angular sectors around the origin, bounded by the canonical
/// vectors of two adjacent orientation states. `former` wins distance ties.
#[derive(Debug, Clone, Copy)]
pub struct Quadrant {
    pub former: OrientationState,
    pub latter: OrientationState,
}

/// The four quadrants in fixed rotational order. Together they cover the
/// plane exactly once per classification pass; the first match wins.
pub const QUADRANTS: [Quadrant; 4] = [
    Quadrant {
        former: OrientationState::LandscapeRight,
        latter: OrientationState::Portrait,
    },
    Quadrant {
        former: OrientationState::PortraitUpsideDown,
        latter: OrientationState::LandscapeRight,
    },
    Quadrant {
        former: OrientationState::LandscapeLeft,
        latter: OrientationState::PortraitUpsideDown,
    },
    Quadrant {
        former: OrientationState::Portrait,
        latter: OrientationState::LandscapeLeft,
    },
];

impl Quadrant {
    /// Membership test against the axis-aligned bounding rectangle of the
    /// two canonical vectors: half-open on the low side, closed on the
    /// high side. The asymmetry is what keeps adjacent quadrants from
    /// double-matching or leaving gaps along the axes.
    fn contains(&self, point: OrientationVector) -> bool {
        let a = self.former.canonical_vector();
        let b = self.latter.canonical_vector();
        let min_x = a.x.min(b.x);
        let max_x = a.x.max(b.x);
        let min_y = a.y.min(b.y);
        let max_y = a.y.max(b.y);

        min_x < point.x && point.x <= max_x && min_y < point.y && point.y <= max_y
    }
}

/// Per-pipeline classification state: the previously emitted orientation,
/// which feeds the hysteresis bias. Owned by exactly one pipeline worker;
/// not shared.
pub struct ClassifierSession {
    previous: OrientationState,
}

impl ClassifierSession {
    pub fn new() -> Self {
        Self {
            previous: OrientationState::Portrait,
        }
    }

    /// The last state this session emitted (initially Portrait).
    pub fn current(&self) -> OrientationState {
        self.previous
    }

    /// Classify one gravity vector.
    ///
    /// Returns the resolved orientation, updating the session's previous
    /// state on every successful pass, including passes that re-emit the
    /// same value. Duplicate suppression is the pipeline's concern, not
    /// this one's. Returns None when no quadrant claims the point, which
    /// only happens for two exact axis vectors under the boundary rule;
    /// the previous state is left untouched in that case.
    pub fn classify(&mut self, point: OrientationVector) -> Option<OrientationState> {
        let Some(quadrant) = QUADRANTS.iter().find(|q| q.contains(point)) else {
            debug!(
                "no quadrant claims ({:.3}, {:.3}); keeping {}",
                point.x,
                point.y,
                self.previous.as_str()
            );
            return None;
        };

        let resolved = self.resolve(quadrant, point);
        self.previous = resolved;
        Some(resolved)
    }

    /// Pick former or latter by biased distance; ties go to former.
    fn resolve(&self, quadrant: &Quadrant, point: OrientationVector) -> OrientationState {
        let former_distance = self.biased_distance(quadrant.former, point);
        let latter_distance = self.biased_distance(quadrant.latter, point);

        if latter_distance < former_distance {
            quadrant.latter
        } else {
            quadrant.former
        }
    }

    fn biased_distance(&self, candidate: OrientationState, point: OrientationVector) -> f32 {
        let distance = point.distance_to(candidate.canonical_vector());
        if candidate.opposes(self.previous) {
            distance * HYSTERESIS_BIAS
        } else {
            distance
        }
    }
}

impl Default for ClassifierSession {
    fn default() -> Self {
        Self::new()
    }
}
