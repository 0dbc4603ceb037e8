//! Geometry utilities for polyline path calculations.

use bevy::prelude::*;

/// Squared length below which a vector is treated as having no direction.
pub const DIRECTION_EPSILON_SQUARED: f32 = 1.0e-6;

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct LineSegment {
    /// Segment start point.
    pub start: Vec3,
    /// Segment end point.
    pub end: Vec3,
}

impl LineSegment {
    /// Create a segment from `start` to `end`.
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end.
    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    /// Length of the segment.
    pub fn length(&self) -> f32 {
        self.delta().length()
    }

    /// Point at normalized position `t` (0 = start, 1 = end).
    pub fn lerp(&self, t: f32) -> Vec3 {
        self.start + self.delta() * t
    }

    /// Normalized position of the point on the segment closest to `point`.
    ///
    /// Always in `[0, 1]`. A zero-length segment projects onto its start.
    pub fn project(&self, point: Vec3) -> f32 {
        let delta = self.delta();
        let length_squared = delta.length_squared();
        if length_squared <= f32::EPSILON {
            return 0.0;
        }
        ((point - self.start).dot(delta) / length_squared).clamp(0.0, 1.0)
    }

    /// Squared distance from `point` to the segment, with the normalized
    /// position of the closest point.
    pub fn distance_squared_to(&self, point: Vec3) -> (f32, f32) {
        let t = self.project(point);
        (self.lerp(t).distance_squared(point), t)
    }
}

/// Normalize `vector`, or return `fallback` when it is too short to have a
/// meaningful direction.
pub fn normalize_or_fallback(vector: Vec3, fallback: Vec3) -> Vec3 {
    if vector.length_squared() < DIRECTION_EPSILON_SQUARED {
        fallback
    } else {
        vector.normalize()
    }
}
