//! Free algorithms over a [`Path`] and its [`PathLocation`]s: sub-path
//! extraction, closest-location search, forward tracing and reversal.

use bevy::prelude::*;

use super::{Path, PathLocation};

/// Build the part of `path` between two locations.
///
/// The result starts at `start`'s interpolated position, keeps every path
/// point strictly between the two locations, and ends at `end`'s position.
pub fn extract_subpath(path: &Path, start: &PathLocation, end: &PathLocation) -> Path {
    debug_assert!(start.segment_index <= end.segment_index);

    let mut subpath = Path::new();
    subpath.add_point(start.position(path));
    for index in (start.segment_index + 1)..=end.segment_index {
        subpath.add_point(path.point(index));
    }
    subpath.add_point(end.position(path));
    subpath
}

/// Location on `path` closest to `position`.
///
/// Scans every segment. On exactly equal distances the lowest segment index
/// wins. A path without segments yields the path start.
pub fn find_closest_location(path: &Path, position: Vec3) -> PathLocation {
    let mut closest = PathLocation::path_start();
    let mut closest_distance_squared = f32::MAX;

    for (index, segment) in path.segments().enumerate() {
        let (distance_squared, t) = segment.distance_squared_to(position);
        if distance_squared < closest_distance_squared {
            closest_distance_squared = distance_squared;
            closest = PathLocation::new(index, t);
        }
    }

    closest
}

/// Advance `start` by `distance` along a non-looping `path`.
///
/// Never moves past the path end: an overshooting advance clamps to the last
/// segment at normalized position 1.
pub fn trace_forward(path: &Path, start: &PathLocation, distance: f32) -> PathLocation {
    let distance = distance.max(0.0);
    let to_segment_end = start.distance_to_segment_end(path);
    if distance <= to_segment_end {
        let length = path.segment_length(start.segment_index);
        let t = start.normalized_position + distance / length;
        return PathLocation::new(start.segment_index, t.min(1.0));
    }

    let mut remaining = distance - to_segment_end;
    for index in (start.segment_index + 1)..path.segment_count() {
        let length = path.segment_length(index);
        if remaining <= length {
            return PathLocation::new(index, remaining / length);
        }
        remaining -= length;
    }

    PathLocation::path_end(path)
}

/// Advance `start` by `distance` along a looping `path`, wrapping from the
/// last segment to the first.
///
/// Whole laps are discarded first, so advancing by exactly the path length
/// returns `start`.
pub fn trace_forward_looping(path: &Path, start: &PathLocation, distance: f32) -> PathLocation {
    let total = path.total_distance();
    if total <= 0.0 {
        return *start;
    }

    let distance = distance.max(0.0) % total;
    let to_segment_end = start.distance_to_segment_end(path);
    if distance <= to_segment_end {
        let length = path.segment_length(start.segment_index);
        let t = start.normalized_position + distance / length;
        return PathLocation::new(start.segment_index, t.min(1.0));
    }

    let mut remaining = distance - to_segment_end;
    let mut index = start.segment_index;
    // The wrapped advance is shorter than one lap, so this visits each
    // segment at most once.
    for _ in 0..path.segment_count() {
        index = path.next_segment_index(index);
        let length = path.segment_length(index);
        if remaining <= length {
            return PathLocation::new(index, remaining / length);
        }
        remaining -= length;
    }

    // Only reachable through rounding when the advance is a hair under a lap.
    PathLocation::new(index, 1.0)
}

/// Express `location` on the path that walks `path` back to front.
pub fn reverse_location(path: &Path, location: &PathLocation) -> PathLocation {
    PathLocation::new(
        path.last_segment_index() - location.segment_index,
        1.0 - location.normalized_position,
    )
}
