use bevy::prelude::*;

use crate::geometry::LineSegment;

/// Points closer than this to the previous point are not added to a [`Path`].
pub const MIN_POINT_SPACING: f32 = 0.01;

/// An append-only polyline with cached segment lengths and cumulative
/// distances.
///
/// Consecutive points are always more than [`MIN_POINT_SPACING`] apart, so no
/// segment has zero length.
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Default)]
pub struct Path {
    points: Vec<Vec3>,
    segment_lengths: Vec<f32>,
    /// Distance along the path from point 0 to each point.
    distances: Vec<f32>,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from points, dropping any that are too close to their
    /// predecessor.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut path = Self::new();
        path.extend(points);
        path
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.segment_lengths.clear();
        self.distances.clear();
    }

    /// Append a point unless it lies within [`MIN_POINT_SPACING`] of the last
    /// point.
    pub fn add_point(&mut self, point: Vec3) {
        let Some(&last) = self.points.last() else {
            self.points.push(point);
            self.distances.push(0.0);
            return;
        };

        let delta = point.distance(last);
        if delta > MIN_POINT_SPACING {
            let previous_distance = self.distances[self.distances.len() - 1];
            self.points.push(point);
            self.segment_lengths.push(delta);
            self.distances.push(previous_distance + delta);
        }
    }

    /// Close the path by appending a copy of the first point.
    pub fn make_looping(&mut self) {
        if let Some(&first) = self.points.first() {
            self.add_point(first);
        }
    }

    /// The same route walked back to front.
    pub fn reversed(&self) -> Self {
        Self::from_points(self.points.iter().rev().copied())
    }

    /// Point `index`. Panics if out of range.
    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index]
    }

    /// All points in order.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Segment from point `index` to point `index + 1`. Panics if out of range.
    pub fn segment(&self, index: usize) -> LineSegment {
        LineSegment::new(self.points[index], self.points[index + 1])
    }

    /// Iterate over all segments in order.
    pub fn segments(&self) -> impl Iterator<Item = LineSegment> + '_ {
        self.points.windows(2).map(|w| LineSegment::new(w[0], w[1]))
    }

    /// Length of segment `index`.
    pub fn segment_length(&self, index: usize) -> f32 {
        self.segment_lengths[index]
    }

    /// Number of points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of segments (`point_count - 1`, or 0 for an empty path).
    pub fn segment_count(&self) -> usize {
        self.segment_lengths.len()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance along the path from the first point to point `index`.
    pub fn distance_to_point(&self, index: usize) -> f32 {
        self.distances[index]
    }

    /// Length of the whole path.
    pub fn total_distance(&self) -> f32 {
        debug_assert!(!self.is_empty(), "total_distance of an empty path");
        self.distances.last().copied().unwrap_or(0.0)
    }

    /// Index of the last segment. Panics on a path without segments.
    pub fn last_segment_index(&self) -> usize {
        assert!(self.segment_count() > 0, "path has no segments");
        self.segment_count() - 1
    }

    /// Wrap any segment index onto the path, treating it as a loop.
    pub fn wrap_segment_index(&self, index: usize) -> usize {
        index % self.segment_count()
    }

    /// Segment after `index`, wrapping from the last segment to the first.
    pub fn next_segment_index(&self, index: usize) -> usize {
        self.wrap_segment_index(index + 1)
    }

    /// Segment before `index`, wrapping from the first segment to the last.
    pub fn prev_segment_index(&self, index: usize) -> usize {
        let count = self.segment_count();
        (index + count - 1) % count
    }
}

impl Extend<Vec3> for Path {
    fn extend<T: IntoIterator<Item = Vec3>>(&mut self, iter: T) {
        for point in iter {
            self.add_point(point);
        }
    }
}

impl FromIterator<Vec3> for Path {
    fn from_iter<T: IntoIterator<Item = Vec3>>(iter: T) -> Self {
        Self::from_points(iter)
    }
}
