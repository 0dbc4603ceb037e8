use bevy::prelude::*;

use super::Path;

/// A cursor into a [`Path`]: a segment index plus a normalized position
/// within that segment.
///
/// Locations do not reference their path. Every query takes the path the
/// location was created for. Ordering is lexicographic on
/// `(segment_index, normalized_position)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Reflect)]
#[reflect(Default)]
pub struct PathLocation {
    /// Which segment of the path this location lies on.
    pub segment_index: usize,
    /// Position within the segment: 0 at its start, 1 at its end.
    pub normalized_position: f32,
}

impl PathLocation {
    /// Create a location on `segment_index` at `normalized_position`.
    pub fn new(segment_index: usize, normalized_position: f32) -> Self {
        Self {
            segment_index,
            normalized_position,
        }
    }

    /// The first point of a path.
    pub fn path_start() -> Self {
        Self::new(0, 0.0)
    }

    /// The last point of `path`, expressed on its last segment.
    pub fn path_end(path: &Path) -> Self {
        Self::new(path.last_segment_index(), 1.0)
    }

    /// Linearly interpolated position on the segment.
    pub fn position(&self, path: &Path) -> Vec3 {
        path.segment(self.segment_index)
            .lerp(self.normalized_position)
    }

    /// Catmull-Rom position through the segment's neighbours.
    ///
    /// Neighbour indices are clamped to the path ends so the curve never
    /// overshoots the first or last point.
    pub fn position_catmull_rom(&self, path: &Path) -> Vec3 {
        let last = path.segment_count();
        let i = self.segment_index;
        let p0 = path.point(i.saturating_sub(1));
        let p1 = path.point(i.min(last));
        let p2 = path.point((i + 1).min(last));
        let p3 = path.point((i + 2).min(last));
        catmull_rom(p0, p1, p2, p3, self.normalized_position)
    }

    /// Catmull-Rom position on a looping path, wrapping neighbour indices so
    /// the curve stays continuous across the loop point.
    pub fn position_catmull_rom_looping(&self, path: &Path) -> Vec3 {
        let i = self.segment_index;
        let p0 = path.point(path.prev_segment_index(i));
        let p1 = path.point(path.wrap_segment_index(i));
        let p2 = path.point(path.next_segment_index(i));
        let p3 = path.point(path.wrap_segment_index(i + 2));
        catmull_rom(p0, p1, p2, p3, self.normalized_position)
    }

    /// Distance back to the start of the segment.
    pub fn distance_to_segment_start(&self, path: &Path) -> f32 {
        path.segment_length(self.segment_index) * self.normalized_position
    }

    /// Distance ahead to the end of the segment.
    pub fn distance_to_segment_end(&self, path: &Path) -> f32 {
        path.segment_length(self.segment_index) * (1.0 - self.normalized_position)
    }

    /// Distance along the path from its first point to this location.
    pub fn distance_from_path_start(&self, path: &Path) -> f32 {
        path.distance_to_point(self.segment_index) + self.distance_to_segment_start(path)
    }

    /// Unsigned distance along the path between two locations, regardless of
    /// which comes first.
    pub fn distance_along_path_to(&self, path: &Path, other: &PathLocation) -> f32 {
        let (from, to) = if self <= other {
            (self, other)
        } else {
            (other, self)
        };

        if from.segment_index == to.segment_index {
            return path.segment_length(from.segment_index)
                * (to.normalized_position - from.normalized_position);
        }

        let between =
            path.distance_to_point(to.segment_index) - path.distance_to_point(from.segment_index + 1);
        from.distance_to_segment_end(path) + between + to.distance_to_segment_start(path)
    }

    /// Distance travelled moving forward from this location until `other` is
    /// reached, passing through the loop point if `other` is behind.
    ///
    /// Only meaningful across the loop point on looping paths.
    pub fn distance_along_path_in_current_direction_to(
        &self,
        path: &Path,
        other: &PathLocation,
    ) -> f32 {
        let distance = self.distance_along_path_to(path, other);
        if self <= other {
            distance
        } else {
            path.total_distance() - distance
        }
    }
}

/// Uniform Catmull-Rom interpolation between `p1` and `p2`.
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}
