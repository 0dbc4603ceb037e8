use bevy::prelude::*;

use super::{PathFollowOutput, PathFollower, PathFollowerParams};

/// A designer-authored route: ordered waypoints plus whether the route is
/// meant to be flown as a loop.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component, Default)]
pub struct WaypointPath {
    /// Waypoints in travel order.
    pub points: Vec<Vec3>,
    /// Whether the route was authored as a loop. Agents only wrap around it
    /// when their params set `loop_along_path`.
    pub looping: bool,
}

impl WaypointPath {
    /// Create an open route.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self {
            points,
            looping: false,
        }
    }

    /// Create a route authored as a loop.
    pub fn looping(points: Vec<Vec3>) -> Self {
        Self {
            points,
            looping: true,
        }
    }
}

/// Playback state of a path agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Default)]
pub enum AgentState {
    /// Agent is moving along its route.
    #[default]
    Following,
    /// Agent is paused and produces no movement.
    Paused,
    /// Agent has reached its stop location.
    Arrived,
}

/// Component that makes an entity follow a [`WaypointPath`].
///
/// Each frame the agent's [`PathAgentOutput`] is refreshed from its
/// [`Transform`]. With `drive_transform` set, the transform is also moved and
/// turned to follow that output.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct PathAgent {
    /// The entity holding the [`WaypointPath`] to follow.
    pub path: Entity,

    /// Follower tuning. Looping and start settings apply when the follower is
    /// (re)initialised; speed is picked up every frame.
    pub params: PathFollowerParams,

    /// Current playback state.
    pub state: AgentState,

    /// Move and rotate the entity's transform from the follower output.
    pub drive_transform: bool,

    /// Up vector used when turning toward the look direction.
    pub up_vector: Vec3,
}

impl Default for PathAgent {
    fn default() -> Self {
        Self {
            path: Entity::PLACEHOLDER,
            params: PathFollowerParams::default(),
            state: AgentState::Following,
            drive_transform: true,
            up_vector: Vec3::Y,
        }
    }
}

impl PathAgent {
    /// Create an agent following the route on `path`.
    pub fn new(path: Entity) -> Self {
        Self {
            path,
            ..default()
        }
    }

    /// Set the follower tuning.
    pub fn with_params(mut self, params: PathFollowerParams) -> Self {
        self.params = params;
        self
    }

    /// Set the travel speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.params.desired_speed = speed;
        self
    }

    /// Enable or disable driving the transform.
    pub fn with_drive_transform(mut self, drive: bool) -> Self {
        self.drive_transform = drive;
        self
    }

    /// Set the up vector for orientation.
    pub fn with_up_vector(mut self, up: Vec3) -> Self {
        self.up_vector = up;
        self
    }

    /// Resume movement.
    pub fn play(&mut self) {
        self.state = AgentState::Following;
    }

    /// Pause movement.
    pub fn pause(&mut self) {
        self.state = AgentState::Paused;
    }

    /// Whether the agent is paused.
    pub fn is_paused(&self) -> bool {
        self.state == AgentState::Paused
    }

    /// Whether the agent has reached its stop location.
    pub fn has_arrived(&self) -> bool {
        self.state == AgentState::Arrived
    }
}

/// The most recent steering computed for a [`PathAgent`].
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component, Default)]
pub struct PathAgentOutput(pub PathFollowOutput);

/// Follower state owned by the path systems.
#[derive(Component, Debug, Clone)]
pub struct PathFollowerState {
    /// The traversal engine.
    pub follower: PathFollower,
    /// Route entity the follower was built from.
    pub(crate) source: Entity,
    /// Position at the end of the previous frame, for velocity estimates.
    pub(crate) last_position: Vec3,
    /// Whether arrival has already been reported for the current stop.
    pub(crate) arrival_reported: bool,
}

/// Instruction for a single agent's follower.
#[derive(Message, Debug, Clone)]
pub struct PathAgentCommand {
    /// The entity with the [`PathAgent`] component.
    pub entity: Entity,
    /// What to do.
    pub kind: PathAgentCommandKind,
}

/// Kinds of agent instructions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathAgentCommandKind {
    /// Stop at the route location closest to this position.
    SetFinalLocation(Vec3),
    /// Clear the stop location and continue to the route end or loop.
    ResetFinalLocation,
    /// Change travel speed.
    SetDesiredSpeed(f32),
}

/// Message emitted when an agent's traversal changes.
#[derive(Message, Debug, Clone)]
pub struct PathAgentEvent {
    /// The entity with the [`PathAgent`] component.
    pub entity: Entity,
    /// The type of event.
    pub kind: PathAgentEventKind,
}

/// Types of agent events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAgentEventKind {
    /// Agent turned around to reach a new stop location.
    DirectionReversed,
    /// Agent reached its stop location.
    ReachedFinalLocation,
}
