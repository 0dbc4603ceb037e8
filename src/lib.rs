//! # bevy_path_follower
//!
//! A Bevy plugin for steering entities along designer-authored waypoint routes.
//!
//! ## Features
//!
//! - Polyline paths with arc-length queries, closest-point search and tracing
//! - A path follower with a movement target, a look-ahead target and an
//!   optional stop location that decelerates the entity on approach
//! - Automatic turnaround when a stop location is quicker to reach backwards
//! - Looping routes that can be flown indefinitely
//! - Gizmo drawing of each agent's active path and markers
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_path_follower::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(PathFollowPlugin)
//!         .add_plugins(PathFollowDebugPlugin) // Optional: draws paths with gizmos
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     let route = commands
//!         .spawn(WaypointPath::new(vec![
//!             Vec3::new(-10.0, 2.0, 0.0),
//!             Vec3::new(0.0, 4.0, 5.0),
//!             Vec3::new(10.0, 2.0, 0.0),
//!         ]))
//!         .id();
//!
//!     commands.spawn((Transform::default(), PathAgent::new(route).with_speed(4.0)));
//! }
//! ```
//!
//! ## Without the ECS
//!
//! [`PathFollower`] is a plain value and can be ticked by hand:
//!
//! ```ignore
//! let mut follower = PathFollower::new(PathFollowerParams::default());
//! follower.init(points, false, PathFollowerParams::default(), &EntityState::new(pos, fwd));
//! let steering = follower.update(&EntityState::new(pos, fwd), dt);
//! ```
//!
//! ## Plugins
//!
//! - [`PathPlugin`]: Path type registration
//! - [`PathFollowPlugin`]: Steers [`PathAgent`] entities (adds [`PathPlugin`])
//! - [`PathFollowDebugPlugin`]: Gizmo drawing (optional, `debug-draw` feature)

pub mod error;
pub mod geometry;
pub mod path;
pub mod path_follow;

pub use error::ParamsError;
pub use path::PathPlugin;
pub use path_follow::{PathFollowPlugin, PathFollower, PathFollowerParams};

#[cfg(feature = "debug-draw")]
pub use path_follow::PathFollowDebugPlugin;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::error::ParamsError;
    pub use crate::geometry::LineSegment;
    pub use crate::path::{
        extract_subpath, find_closest_location, reverse_location, trace_forward,
        trace_forward_looping, Path, PathLocation, PathPlugin,
    };
    pub use crate::path_follow::{
        AgentState, EntityState, PathAgent, PathAgentCommand, PathAgentCommandKind,
        PathAgentEvent, PathAgentEventKind, PathAgentOutput, PathDirection, PathFollowOutput,
        PathFollowPlugin, PathFollowSystems, PathFollower, PathFollowerParams, PathFollowerState,
        TrackedLocation, WaypointPath,
    };

    #[cfg(feature = "debug-draw")]
    pub use crate::path_follow::{PathFollowDebugPlugin, PathFollowDebugSettings};
}
