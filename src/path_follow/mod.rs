//! Path following plugin for steering entities along designer routes.
//!
//! A [`PathFollower`] walks a route one tick at a time. It keeps a movement
//! target a little ahead of the entity, a look target further ahead, and an
//! optional stop location, and it turns around when a new stop location is
//! quicker to reach the other way. The plugin runs one follower per
//! [`PathAgent`] entity.
//!
//! # Example
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use bevy_path_follower::prelude::*;
//!
//! fn setup(mut commands: Commands) {
//!     // A designer route
//!     let route = commands.spawn(WaypointPath::looping(vec![
//!         Vec3::new(0.0, 5.0, 0.0),
//!         Vec3::new(20.0, 8.0, 0.0),
//!         Vec3::new(20.0, 5.0, 20.0),
//!     ])).id();
//!
//!     // An entity that flies it
//!     commands.spawn((
//!         Transform::default(),
//!         PathAgent::new(route).with_params(
//!             PathFollowerParams::default()
//!                 .with_desired_speed(6.0)
//!                 .with_loop_along_path(true),
//!         ),
//!     ));
//! }
//! ```

mod components;
#[cfg(feature = "debug-draw")]
mod debug;
mod follower;
mod systems;

pub use components::*;
#[cfg(feature = "debug-draw")]
pub use debug::{draw_path_agents, PathFollowDebugPlugin, PathFollowDebugSettings};
pub use follower::*;
pub use systems::{apply_path_agent_commands, initialize_path_agents, update_path_agents};

use bevy::prelude::*;

use crate::path::PathPlugin;

/// System set containing the path follow systems, for ordering against
/// movement controllers.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathFollowSystems;

/// Plugin that steers [`PathAgent`] entities along [`WaypointPath`] routes.
///
/// Add this plugin to your app, then add [`PathAgent`] components to entities
/// you want to follow a route. Send [`PathAgentCommand`] messages to set or
/// clear stop locations, and read [`PathAgentEvent`] messages to react to
/// arrivals and turnarounds.
pub struct PathFollowPlugin;

impl Plugin for PathFollowPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PathPlugin>() {
            app.add_plugins(PathPlugin);
        }

        app.register_type::<WaypointPath>()
            .register_type::<PathAgent>()
            .register_type::<AgentState>()
            .register_type::<PathAgentOutput>()
            .register_type::<PathFollowerParams>()
            .register_type::<PathFollowOutput>()
            .add_message::<PathAgentCommand>()
            .add_message::<PathAgentEvent>()
            .add_systems(
                Update,
                (
                    systems::initialize_path_agents,
                    systems::apply_path_agent_commands,
                    systems::update_path_agents,
                )
                    .chain()
                    .in_set(PathFollowSystems),
            );
    }
}
