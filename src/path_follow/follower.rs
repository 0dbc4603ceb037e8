use bevy::prelude::*;

use crate::error::ParamsError;
use crate::geometry::normalize_or_fallback;
use crate::path::{
    extract_subpath, find_closest_location, reverse_location, trace_forward,
    trace_forward_looping, Path, PathLocation,
};

/// Tuning for a [`PathFollower`].
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Default)]
pub struct PathFollowerParams {
    /// Travel speed in world units per second.
    pub desired_speed: f32,
    /// How close the entity must be to the target before the target advances.
    pub path_radius: f32,
    /// Distance the look target runs ahead of the movement target.
    pub look_ahead_distance: f32,
    /// Remaining distance at which speed starts ramping down toward the stop
    /// location. Zero disables deceleration.
    pub decelerate_distance: f32,
    /// When not starting from the closest location, only this much of the
    /// path start is searched for the entry point.
    pub max_start_distance_along_non_looping_path: f32,
    /// Wrap around at the path end instead of stopping.
    pub loop_along_path: bool,
    /// Start from the location closest to the entity anywhere on the path.
    pub start_path_from_closest_location: bool,
}

impl Default for PathFollowerParams {
    fn default() -> Self {
        Self {
            desired_speed: 5.0,
            path_radius: 1.0,
            look_ahead_distance: 3.0,
            decelerate_distance: 0.0,
            max_start_distance_along_non_looping_path: 10.0,
            loop_along_path: false,
            start_path_from_closest_location: true,
        }
    }
}

impl PathFollowerParams {
    /// Set the travel speed.
    pub fn with_desired_speed(mut self, speed: f32) -> Self {
        self.desired_speed = speed;
        self
    }

    /// Set the target acceptance radius.
    pub fn with_path_radius(mut self, radius: f32) -> Self {
        self.path_radius = radius;
        self
    }

    /// Set the look-ahead distance.
    pub fn with_look_ahead_distance(mut self, distance: f32) -> Self {
        self.look_ahead_distance = distance;
        self
    }

    /// Set the deceleration distance.
    pub fn with_decelerate_distance(mut self, distance: f32) -> Self {
        self.decelerate_distance = distance;
        self
    }

    /// Set how far along the path start the entry point may be.
    pub fn with_max_start_distance(mut self, distance: f32) -> Self {
        self.max_start_distance_along_non_looping_path = distance;
        self
    }

    /// Enable or disable looping.
    pub fn with_loop_along_path(mut self, looping: bool) -> Self {
        self.loop_along_path = looping;
        self
    }

    /// Enable or disable starting from the closest location.
    pub fn with_start_from_closest_location(mut self, closest: bool) -> Self {
        self.start_path_from_closest_location = closest;
        self
    }

    /// Check that every distance and the speed are finite and non-negative.
    pub fn validate(&self) -> Result<(), ParamsError> {
        ParamsError::check_non_negative("desired_speed", self.desired_speed)?;
        ParamsError::check_non_negative("path_radius", self.path_radius)?;
        ParamsError::check_non_negative("look_ahead_distance", self.look_ahead_distance)?;
        ParamsError::check_non_negative("decelerate_distance", self.decelerate_distance)?;
        ParamsError::check_non_negative(
            "max_start_distance_along_non_looping_path",
            self.max_start_distance_along_non_looping_path,
        )?;
        Ok(())
    }
}

/// Where the followed entity is this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntityState {
    /// World position.
    pub position: Vec3,
    /// Unit facing direction, used when a steering direction is undefined.
    pub forward: Vec3,
    /// Current velocity. Informational.
    pub velocity: Vec3,
}

impl EntityState {
    /// Create a state at `position` facing `forward`, at rest.
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward,
            velocity: Vec3::ZERO,
        }
    }

    /// Set the velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Steering produced by [`PathFollower::update`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Default)]
pub struct PathFollowOutput {
    /// Unit direction toward the movement target.
    pub move_direction: Vec3,
    /// Desired speed, reduced while decelerating into the stop location.
    pub speed: f32,
    /// Point the entity should look at.
    pub look_position: Vec3,
    /// Unit direction toward `look_position`.
    pub look_direction: Vec3,
    /// Straight-line distance to the target plus path distance from the
    /// target to the stop location.
    pub distance_to_path_end: f32,
}

/// A path cursor paired with its world position.
///
/// The position is refreshed by every mutation, so the two never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Default)]
pub struct TrackedLocation {
    location: PathLocation,
    position: Vec3,
}

impl TrackedLocation {
    /// Track `location` on `path`.
    pub fn at(path: &Path, location: PathLocation) -> Self {
        Self {
            location,
            position: location.position(path),
        }
    }

    /// A cursor pinned to `position`, for paths without segments.
    pub fn fixed(position: Vec3) -> Self {
        Self {
            location: PathLocation::path_start(),
            position,
        }
    }

    /// Move the cursor to `location` on `path`.
    pub fn set(&mut self, path: &Path, location: PathLocation) {
        *self = Self::at(path, location);
    }

    /// The cursor.
    pub fn location(&self) -> PathLocation {
        self.location
    }

    /// World position of the cursor.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Re-express the cursor from `from` onto `to`, the same route walked the
    /// other way.
    fn reverse_onto(&mut self, from: &Path, to: &Path) {
        self.set(to, reverse_location(from, &self.location));
    }
}

/// Which way along the route the follower is travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Default)]
pub enum PathDirection {
    /// Walking the route in authored order.
    #[default]
    Forward,
    /// Walking the route back to front.
    Reverse,
}

impl PathDirection {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PathPair {
    forward: Path,
    reverse: Path,
}

impl PathPair {
    fn get(&self, direction: PathDirection) -> &Path {
        match direction {
            PathDirection::Forward => &self.forward,
            PathDirection::Reverse => &self.reverse,
        }
    }
}

/// Geometry for drawing a follower's state.
#[derive(Debug, Clone, Copy)]
pub struct PathFollowerDebugView<'a> {
    /// The path currently being walked.
    pub path: &'a Path,
    /// Movement target.
    pub target: Vec3,
    /// Look target.
    pub lookahead: Vec3,
    /// Stop location.
    pub final_position: Vec3,
}

/// Walks an entity along a route one tick at a time.
///
/// Holds the route in both directions and tracks three cursors on whichever
/// one is active: the movement target, the look-ahead target and the stop
/// location. Setting a stop location behind the target switches to the other
/// direction when that is the shorter way to reach it.
#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    params: PathFollowerParams,
    paths: PathPair,
    direction: PathDirection,
    target: TrackedLocation,
    lookahead: TrackedLocation,
    final_location: TrackedLocation,
    stop_at_final: bool,
    authored_loop: bool,
}

impl PathFollower {
    /// Create a follower with `params` and no route. Call [`Self::init`]
    /// before updating.
    pub fn new(params: PathFollowerParams) -> Self {
        Self {
            params,
            ..default()
        }
    }

    /// Load a route and pick the starting target for `entity`.
    ///
    /// Only `params.loop_along_path` closes the route; `authored_loop` is
    /// kept for callers and does not change the geometry. Routes with fewer
    /// than two distinct points leave the follower parked on the single
    /// point (or on the entity when the route is empty).
    pub fn init(
        &mut self,
        points: impl IntoIterator<Item = Vec3>,
        authored_loop: bool,
        params: PathFollowerParams,
        entity: &EntityState,
    ) {
        debug_assert!(params.validate().is_ok(), "invalid params: {params:?}");
        self.params = params;
        self.authored_loop = authored_loop;

        let mut forward = Path::from_points(points);
        if params.loop_along_path {
            forward.make_looping();
        }
        let reverse = forward.reversed();
        self.paths = PathPair { forward, reverse };
        self.direction = PathDirection::Forward;

        if self.is_degenerate() {
            let anchor = self
                .paths
                .forward
                .points()
                .first()
                .copied()
                .unwrap_or(entity.position);
            warn!(
                "route has {} distinct point(s), parking follower at {anchor}",
                self.paths.forward.point_count()
            );
            self.target = TrackedLocation::fixed(anchor);
            self.lookahead = self.target;
            self.final_location = self.target;
            self.stop_at_final = true;
            return;
        }

        self.reset_final_path_location();

        let path = &self.paths.forward;
        let start = if params.start_path_from_closest_location {
            find_closest_location(path, entity.position)
        } else {
            closest_location_near_start(
                path,
                params.max_start_distance_along_non_looping_path,
                entity.position,
            )
        };
        self.target.set(path, start);
        let lookahead = self.trace(path, &start, params.look_ahead_distance);
        self.lookahead.set(path, lookahead);
    }

    /// Advance the cursors for this tick and compute steering.
    pub fn update(&mut self, entity: &EntityState, elapsed_seconds: f32) -> PathFollowOutput {
        if self.is_degenerate() {
            let mut output = self.output(entity, 0.0);
            let radius = self.params.path_radius;
            if self.target.position().distance_squared(entity.position) <= radius * radius {
                output.speed = 0.0;
            }
            return output;
        }

        let path = self.paths.get(self.direction);
        let radius = self.params.path_radius;
        if self.target.position().distance_squared(entity.position) <= radius * radius {
            let previous = self.target.location();
            let advance = self.params.desired_speed * elapsed_seconds.max(0.0);
            let mut next = self.trace(path, &previous, advance);
            if self.stop_at_final && self.passes_final(path, &previous, &next, advance) {
                next = self.final_location.location();
            }
            trace!("target advanced {advance} from {previous:?} to {next:?}");
            self.target.set(path, next);
        }

        let lookahead = self.trace(path, &self.target.location(), self.params.look_ahead_distance);
        self.lookahead.set(path, lookahead);

        let path_remaining = self.path_distance_to_final(path);
        self.output(entity, path_remaining)
    }

    /// Stop at the path location closest to `position`, turning around if
    /// that is the quicker way to get there.
    pub fn set_final_path_location(&mut self, position: Vec3) {
        if self.is_degenerate() {
            return;
        }

        self.stop_at_final = true;
        let path = self.paths.get(self.direction);
        let closest = find_closest_location(path, position);
        self.final_location.set(path, closest);

        let radius = self.params.path_radius;
        let target = self.target.location();
        let near_target = self
            .final_location
            .position()
            .distance_squared(self.target.position())
            <= radius * radius;

        let flip = if near_target {
            // Already at or past the stop location: stop here.
            if closest < target {
                self.target.set(path, closest);
            }
            false
        } else if self.params.loop_along_path {
            let ahead = target.distance_along_path_in_current_direction_to(path, &closest);
            let behind = path.total_distance() - ahead;
            behind < (ahead - radius).max(0.0)
        } else {
            closest < target
        };

        debug!(
            "final location set to {closest:?} at {}, reversing: {flip}",
            self.final_location.position()
        );
        if flip {
            self.set_direction(self.direction.flipped());
        }
    }

    /// Drop any stop location: travel forward to the path end, or loop
    /// forever when looping.
    pub fn reset_final_path_location(&mut self) {
        if self.is_degenerate() {
            return;
        }

        self.set_use_reverse_path(false);
        let path = &self.paths.forward;
        self.final_location.set(path, PathLocation::path_end(path));
        self.stop_at_final = !self.params.loop_along_path;
        debug!("final location reset, stop at path end: {}", self.stop_at_final);
    }

    /// Switch between the forward and reverse path, keeping every cursor at
    /// the same world position.
    pub fn set_use_reverse_path(&mut self, use_reverse: bool) {
        self.set_direction(if use_reverse {
            PathDirection::Reverse
        } else {
            PathDirection::Forward
        });
    }

    fn set_direction(&mut self, direction: PathDirection) {
        if direction == self.direction || self.is_degenerate() {
            return;
        }

        let from = self.paths.get(self.direction);
        let to = self.paths.get(direction);
        for cursor in [
            &mut self.target,
            &mut self.lookahead,
            &mut self.final_location,
        ] {
            cursor.reverse_onto(from, to);
        }
        self.direction = direction;
        debug!("now following the {direction:?} path");
    }

    /// Change the travel speed.
    pub fn set_desired_speed(&mut self, speed: f32) {
        self.params.desired_speed = speed;
    }

    /// Current tuning.
    pub fn params(&self) -> &PathFollowerParams {
        &self.params
    }

    /// The route in authored order.
    pub fn forward_path(&self) -> &Path {
        &self.paths.forward
    }

    /// The route back to front.
    pub fn reverse_path(&self) -> &Path {
        &self.paths.reverse
    }

    /// The path the cursors currently refer to.
    pub fn active_path(&self) -> &Path {
        self.paths.get(self.direction)
    }

    /// Direction of travel.
    pub fn direction(&self) -> PathDirection {
        self.direction
    }

    /// Whether the reverse path is active.
    pub fn is_using_reverse_path(&self) -> bool {
        self.direction == PathDirection::Reverse
    }

    /// Movement target.
    pub fn target(&self) -> &TrackedLocation {
        &self.target
    }

    /// Look target.
    pub fn lookahead(&self) -> &TrackedLocation {
        &self.lookahead
    }

    /// Stop location.
    pub fn final_location(&self) -> &TrackedLocation {
        &self.final_location
    }

    /// Whether travel ends at the stop location.
    pub fn stop_at_final(&self) -> bool {
        self.stop_at_final
    }

    /// Whether the route was authored as a loop.
    pub fn is_authored_loop(&self) -> bool {
        self.authored_loop
    }

    /// Whether the route has no segments to travel along.
    pub fn is_degenerate(&self) -> bool {
        self.paths.forward.segment_count() == 0
    }

    /// Whether the movement target has reached a stop location it will not
    /// move past.
    pub fn has_reached_final_location(&self) -> bool {
        self.stop_at_final && self.target.location() == self.final_location.location()
    }

    /// Movement target on a Catmull-Rom curve through the path points instead
    /// of the polyline.
    pub fn target_position_smoothed(&self) -> Vec3 {
        if self.is_degenerate() {
            return self.target.position();
        }
        let path = self.active_path();
        let location = self.target.location();
        if self.params.loop_along_path {
            location.position_catmull_rom_looping(path)
        } else {
            location.position_catmull_rom(path)
        }
    }

    /// Geometry for debug drawing.
    pub fn debug_view(&self) -> PathFollowerDebugView<'_> {
        PathFollowerDebugView {
            path: self.active_path(),
            target: self.target.position(),
            lookahead: self.lookahead.position(),
            final_position: self.final_location.position(),
        }
    }

    fn trace(&self, path: &Path, from: &PathLocation, distance: f32) -> PathLocation {
        if self.params.loop_along_path {
            trace_forward_looping(path, from, distance)
        } else {
            trace_forward(path, from, distance)
        }
    }

    /// Whether moving the target from `previous` to `next` by `advance`
    /// reached or crossed the stop location.
    fn passes_final(
        &self,
        path: &Path,
        previous: &PathLocation,
        next: &PathLocation,
        advance: f32,
    ) -> bool {
        let final_location = self.final_location.location();
        if self.params.loop_along_path {
            previous.distance_along_path_in_current_direction_to(path, &final_location) <= advance
        } else {
            *next >= final_location
        }
    }

    fn path_distance_to_final(&self, path: &Path) -> f32 {
        let target = self.target.location();
        let final_location = self.final_location.location();
        if self.params.loop_along_path {
            target.distance_along_path_in_current_direction_to(path, &final_location)
        } else {
            target.distance_along_path_to(path, &final_location)
        }
    }

    fn output(&self, entity: &EntityState, path_remaining: f32) -> PathFollowOutput {
        let to_target = self.target.position() - entity.position;
        let distance_to_path_end = to_target.length() + path_remaining;
        let look_position = self.lookahead.position();

        PathFollowOutput {
            move_direction: normalize_or_fallback(to_target, entity.forward),
            speed: self.scaled_speed(distance_to_path_end),
            look_position,
            look_direction: normalize_or_fallback(look_position - entity.position, entity.forward),
            distance_to_path_end,
        }
    }

    fn scaled_speed(&self, remaining: f32) -> f32 {
        let speed = self.params.desired_speed;
        let decelerate = self.params.decelerate_distance;
        if self.stop_at_final && decelerate > 0.0 && remaining < decelerate {
            speed * (remaining / decelerate).clamp(0.0, 1.0)
        } else {
            speed
        }
    }
}

/// Closest location to `position` within the first `max_distance` of `path`.
///
/// The search runs on the extracted start of the path and the result is
/// mapped back by distance. Falls back to the path start when that stretch
/// has no length.
fn closest_location_near_start(path: &Path, max_distance: f32, position: Vec3) -> PathLocation {
    let start = PathLocation::path_start();
    let end = trace_forward(path, &start, max_distance);
    let subpath = extract_subpath(path, &start, &end);
    if subpath.segment_count() == 0 {
        return start;
    }

    let on_subpath = find_closest_location(&subpath, position);
    trace_forward(path, &start, on_subpath.distance_from_path_start(&subpath))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_params() -> PathFollowerParams {
        PathFollowerParams::default()
            .with_desired_speed(5.0)
            .with_path_radius(1.0)
            .with_look_ahead_distance(3.0)
    }

    fn straight_follower(entity: &EntityState) -> PathFollower {
        let mut follower = PathFollower::new(line_params());
        follower.init(
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)],
            false,
            line_params(),
            entity,
        );
        follower
    }

    fn square() -> [Vec3; 4] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 10.0),
        ]
    }

    fn looping_follower(entity: &EntityState) -> PathFollower {
        let params = line_params().with_loop_along_path(true);
        let mut follower = PathFollower::new(params);
        follower.init(square(), false, params, entity);
        follower
    }

    /// Tick with the entity sitting on the current target, as a perfectly
    /// responsive agent would.
    fn step(follower: &mut PathFollower, entity: &mut EntityState, elapsed: f32) -> PathFollowOutput {
        entity.position = follower.target().position();
        follower.update(entity, elapsed)
    }

    #[test]
    fn test_starts_at_closest_location_and_advances() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);

        assert_eq!(follower.target().location(), PathLocation::new(0, 0.0));

        let output = follower.update(&entity, 1.0);
        assert!((follower.target().position() - Vec3::new(5.0, 0.0, 0.0)).length() < 0.001);
        assert!((follower.lookahead().position() - Vec3::new(8.0, 0.0, 0.0)).length() < 0.001);
        assert!((output.move_direction - Vec3::X).length() < 0.001);
        assert!((output.look_direction - Vec3::X).length() < 0.001);
        assert_eq!(output.speed, 5.0);
        assert!((output.distance_to_path_end - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_target_waits_for_entity() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.update(&entity, 1.0);

        // Entity has not caught up, so the target holds.
        let output = follower.update(&entity, 1.0);
        assert!((follower.target().position() - Vec3::new(5.0, 0.0, 0.0)).length() < 0.001);
        assert!((output.move_direction - Vec3::X).length() < 0.001);
    }

    #[test]
    fn test_move_direction_falls_back_to_forward() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        let output = follower.update(&entity, 0.0);
        assert_eq!(output.move_direction, Vec3::Y);
    }

    #[test]
    fn test_stops_exactly_at_final_location() {
        let mut entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.set_final_path_location(Vec3::new(10.0, 0.0, 0.0));
        assert!(!follower.is_using_reverse_path());

        let mut output = follower.update(&entity, 0.0);
        for _ in 0..1000 {
            output = step(&mut follower, &mut entity, 0.07);
            assert!(follower.target().position().x <= 10.0);
            if output.distance_to_path_end == 0.0 {
                break;
            }
        }

        assert_eq!(output.distance_to_path_end, 0.0);
        assert_eq!(follower.target().position(), Vec3::new(10.0, 0.0, 0.0));
        assert!(follower.has_reached_final_location());

        // Further ticks stay put.
        step(&mut follower, &mut entity, 1.0);
        assert_eq!(follower.target().position(), Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_stops_at_final_location_mid_path() {
        let mut entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.set_final_path_location(Vec3::new(6.0, 3.0, 0.0));

        for _ in 0..20 {
            step(&mut follower, &mut entity, 0.5);
        }
        assert!((follower.target().position() - Vec3::new(6.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_deceleration_bounds() {
        let params = line_params().with_decelerate_distance(4.0);
        let mut entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = PathFollower::new(params);
        follower.init([Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], false, params, &entity);

        let mut saw_slowdown = false;
        for _ in 0..100 {
            let output = step(&mut follower, &mut entity, 0.1);
            assert!(output.speed >= 0.0 && output.speed <= 5.0);
            if output.distance_to_path_end >= 4.0 {
                assert_eq!(output.speed, 5.0);
            } else {
                saw_slowdown = true;
                let expected = 5.0 * output.distance_to_path_end / 4.0;
                assert!((output.speed - expected).abs() < 0.001);
            }
        }
        assert!(saw_slowdown);
    }

    #[test]
    fn test_no_deceleration_when_looping() {
        let params = line_params()
            .with_decelerate_distance(100.0)
            .with_loop_along_path(true);
        let mut entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = PathFollower::new(params);
        follower.init(square(), false, params, &entity);
        assert!(!follower.stop_at_final());

        for _ in 0..50 {
            let output = step(&mut follower, &mut entity, 0.3);
            assert_eq!(output.speed, 5.0);
        }
    }

    #[test]
    fn test_looping_wraps_past_loop_point() {
        let mut entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = looping_follower(&entity);
        assert_eq!(follower.forward_path().point_count(), 5);

        let segment_count = follower.active_path().segment_count();
        let mut wrapped = false;
        let mut previous = follower.target().location();
        for _ in 0..40 {
            step(&mut follower, &mut entity, 0.5);
            let location = follower.target().location();
            assert!(location.segment_index < segment_count);
            if location < previous {
                wrapped = true;
            }
            previous = location;
        }
        assert!(wrapped);
    }

    #[test]
    fn test_looping_huge_step_stays_on_path() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = looping_follower(&entity);
        // 5 * 17 = 85 = two laps of 40 plus 5.
        follower.update(&entity, 17.0);
        assert!((follower.target().position() - Vec3::new(5.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_final_behind_reverses_non_looping_path() {
        let params = line_params();
        let mut entity = EntityState::new(Vec3::new(15.0, 0.0, 0.0), Vec3::X);
        let mut follower = PathFollower::new(params);
        follower.init(
            [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
            false,
            params,
            &entity,
        );
        assert_eq!(follower.target().location(), PathLocation::new(1, 0.5));

        follower.set_final_path_location(Vec3::new(2.0, 0.0, 0.0));
        assert!(follower.is_using_reverse_path());
        assert!((follower.target().position() - Vec3::new(15.0, 0.0, 0.0)).length() < 0.001);
        assert!((follower.final_location().position() - Vec3::new(2.0, 0.0, 0.0)).length() < 0.001);

        let mut last_x = follower.target().position().x;
        for _ in 0..20 {
            step(&mut follower, &mut entity, 0.5);
            let x = follower.target().position().x;
            assert!(x <= last_x);
            last_x = x;
        }
        assert!((follower.target().position() - Vec3::new(2.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_final_ahead_keeps_direction() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.set_final_path_location(Vec3::new(7.0, 0.0, 0.0));
        assert!(!follower.is_using_reverse_path());
        assert!(follower.stop_at_final());
    }

    #[test]
    fn test_final_just_behind_target_snaps_target() {
        let params = line_params();
        let entity = EntityState::new(Vec3::new(15.0, 0.0, 0.0), Vec3::X);
        let mut follower = PathFollower::new(params);
        follower.init([Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)], false, params, &entity);

        follower.set_final_path_location(Vec3::new(14.5, 0.0, 0.0));
        assert!(!follower.is_using_reverse_path());
        assert_eq!(follower.target().location(), follower.final_location().location());
        assert!((follower.target().position() - Vec3::new(14.5, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_looping_takes_shorter_way_round() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);

        let mut follower = looping_follower(&entity);
        follower.set_final_path_location(Vec3::new(8.0, 0.0, 0.0));
        assert!(!follower.is_using_reverse_path());

        let mut follower = looping_follower(&entity);
        follower.set_final_path_location(Vec3::new(0.0, 0.0, 8.0));
        assert!(follower.is_using_reverse_path());
        let output = follower.update(&entity, 0.0);
        assert!((output.distance_to_path_end - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_looping_flip_hysteresis() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);

        // Halfway round, and just past halfway within the radius: keep going.
        for x in [10.0, 9.6] {
            let mut follower = looping_follower(&entity);
            follower.set_final_path_location(Vec3::new(x, 0.0, 10.0));
            assert!(!follower.is_using_reverse_path(), "flipped for x = {x}");
        }

        // Clearly shorter the other way.
        let mut follower = looping_follower(&entity);
        follower.set_final_path_location(Vec3::new(9.0, 0.0, 10.0));
        assert!(follower.is_using_reverse_path());
    }

    #[test]
    fn test_reset_final_returns_to_forward() {
        let params = line_params();
        let entity = EntityState::new(Vec3::new(15.0, 0.0, 0.0), Vec3::X);
        let mut follower = PathFollower::new(params);
        follower.init([Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)], false, params, &entity);
        follower.set_final_path_location(Vec3::ZERO);
        assert!(follower.is_using_reverse_path());

        follower.reset_final_path_location();
        assert!(!follower.is_using_reverse_path());
        assert!(follower.stop_at_final());
        assert_eq!(follower.final_location().position(), Vec3::new(20.0, 0.0, 0.0));
        assert!((follower.target().position() - Vec3::new(15.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_reset_final_when_looping_clears_stop() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = looping_follower(&entity);
        follower.set_final_path_location(Vec3::new(5.0, 0.0, 0.0));
        assert!(follower.stop_at_final());
        follower.reset_final_path_location();
        assert!(!follower.stop_at_final());
    }

    #[test]
    fn test_reverse_path_keeps_world_positions() {
        let entity = EntityState::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Y);
        let mut follower = looping_follower(&entity);
        follower.update(&entity, 0.0);
        let target = follower.target().position();
        let lookahead = follower.lookahead().position();
        let final_position = follower.final_location().position();

        follower.set_use_reverse_path(true);
        assert!((follower.target().position() - target).length() < 0.001);
        assert!((follower.lookahead().position() - lookahead).length() < 0.001);
        assert!((follower.final_location().position() - final_position).length() < 0.001);
    }

    #[test]
    fn test_start_near_path_start() {
        let params = line_params()
            .with_start_from_closest_location(false)
            .with_max_start_distance(12.0);
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
        ];

        let mut follower = PathFollower::new(params);
        follower.init(points, false, params, &EntityState::new(Vec3::new(25.0, 3.0, 0.0), Vec3::X));
        assert!((follower.target().position() - Vec3::new(12.0, 0.0, 0.0)).length() < 0.001);
        assert_eq!(follower.target().location().segment_index, 1);

        follower.init(points, false, params, &EntityState::new(Vec3::new(5.0, 2.0, 0.0), Vec3::X));
        assert!((follower.target().position() - Vec3::new(5.0, 0.0, 0.0)).length() < 0.001);

        let params = params.with_max_start_distance(0.0);
        follower.init(points, false, params, &EntityState::new(Vec3::new(25.0, 3.0, 0.0), Vec3::X));
        assert_eq!(follower.target().location(), PathLocation::path_start());
    }

    #[test]
    fn test_looping_start_limited_to_path_start() {
        let params = line_params()
            .with_loop_along_path(true)
            .with_start_from_closest_location(false)
            .with_max_start_distance(15.0);
        let entity = EntityState::new(Vec3::new(10.0, 5.0, 10.0), Vec3::X);
        let mut follower = PathFollower::new(params);
        follower.init(square(), false, params, &entity);
        assert!((follower.target().position() - Vec3::new(10.0, 0.0, 5.0)).length() < 0.001);
        assert_eq!(follower.target().location().segment_index, 1);

        let params = params.with_start_from_closest_location(true);
        follower.init(square(), false, params, &entity);
        assert!((follower.target().position() - Vec3::new(10.0, 0.0, 10.0)).length() < 0.001);
    }

    #[test]
    fn test_authored_loop_without_looping_stops_at_last_waypoint() {
        let params = line_params();
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = PathFollower::new(params);
        follower.init(
            [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0)],
            true,
            params,
            &entity,
        );
        assert!(follower.is_authored_loop());
        assert_eq!(follower.forward_path().point_count(), 3);
        assert!(follower.stop_at_final());
        assert_eq!(follower.final_location().position(), Vec3::new(10.0, 0.0, 10.0));

        let params = params.with_loop_along_path(true);
        follower.init(square(), false, params, &entity);
        assert!(!follower.is_authored_loop());
        assert_eq!(follower.forward_path().point_count(), 5);
        assert!(!follower.stop_at_final());
    }

    #[test]
    fn test_single_point_route_parks_on_point() {
        let params = line_params();
        let point = Vec3::new(4.0, 0.0, 3.0);
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = PathFollower::new(params);
        follower.init([point, point + Vec3::splat(0.001)], false, params, &entity);
        assert!(follower.is_degenerate());

        let output = follower.update(&entity, 1.0);
        assert_eq!(follower.target().position(), point);
        assert!((output.move_direction - Vec3::new(0.8, 0.0, 0.6)).length() < 0.001);
        assert!((output.distance_to_path_end - 5.0).abs() < 0.001);
        assert_eq!(output.speed, 5.0);

        follower.set_final_path_location(Vec3::new(100.0, 0.0, 0.0));
        follower.reset_final_path_location();
        let output = follower.update(&EntityState::new(point, Vec3::Y), 1.0);
        assert_eq!(output.speed, 0.0);
        assert_eq!(output.move_direction, Vec3::Y);
        assert_eq!(output.distance_to_path_end, 0.0);
    }

    #[test]
    fn test_empty_route_parks_on_entity() {
        let params = line_params();
        let entity = EntityState::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);
        let mut follower = PathFollower::new(params);
        follower.init([], false, params, &entity);
        assert!(follower.is_degenerate());
        let output = follower.update(&entity, 1.0);
        assert_eq!(output.speed, 0.0);
        assert_eq!(output.look_position, entity.position);
    }

    #[test]
    fn test_set_desired_speed() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.set_desired_speed(2.0);
        let output = follower.update(&entity, 1.0);
        assert_eq!(output.speed, 2.0);
        assert!((follower.target().position() - Vec3::new(2.0, 0.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_smoothed_target_on_straight_path() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.update(&entity, 1.0);
        let smoothed = follower.target_position_smoothed();
        assert!(smoothed.y.abs() < 0.001 && smoothed.z.abs() < 0.001);
    }

    #[test]
    fn test_debug_view_matches_cursors() {
        let entity = EntityState::new(Vec3::ZERO, Vec3::Y);
        let mut follower = straight_follower(&entity);
        follower.update(&entity, 1.0);
        let view = follower.debug_view();
        assert_eq!(view.path.segment_count(), 1);
        assert_eq!(view.target, follower.target().position());
        assert_eq!(view.lookahead, follower.lookahead().position());
        assert_eq!(view.final_position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_params_validation() {
        assert!(PathFollowerParams::default().validate().is_ok());
        assert!(matches!(
            PathFollowerParams::default().with_path_radius(-1.0).validate(),
            Err(ParamsError::Negative { name: "path_radius", .. })
        ));
        assert!(matches!(
            PathFollowerParams::default().with_desired_speed(f32::INFINITY).validate(),
            Err(ParamsError::NotFinite { name: "desired_speed", .. })
        ));
    }
}
