use bevy::prelude::*;

use crate::error::ParamsError;

use super::{
    AgentState, EntityState, PathAgent, PathAgentCommand, PathAgentCommandKind, PathAgentEvent,
    PathAgentEventKind, PathAgentOutput, PathFollower, PathFollowerParams, PathFollowerState,
    WaypointPath,
};

/// Whether the params differ in anything that needs a rebuilt follower.
/// Speed is picked up every tick and never does.
fn params_need_rebuild(current: &PathFollowerParams, wanted: &PathFollowerParams) -> bool {
    let current = PathFollowerParams {
        desired_speed: wanted.desired_speed,
        ..*current
    };
    current != *wanted
}

/// Build followers for new agents, and rebuild them when the agent switches
/// route, its route changes or its params change beyond speed. A rebuild
/// drops any stop location.
pub fn initialize_path_agents(
    mut commands: Commands,
    agents: Query<(Entity, Ref<PathAgent>, &Transform, Option<&PathFollowerState>)>,
    paths: Query<Ref<WaypointPath>>,
) {
    for (entity, agent, transform, state) in &agents {
        let Ok(route) = paths.get(agent.path) else {
            continue;
        };

        let needs_init = match state {
            None => true,
            Some(state) => {
                state.source != agent.path
                    || route.is_changed()
                    || params_need_rebuild(state.follower.params(), &agent.params)
            }
        };
        if !needs_init {
            continue;
        }

        if let Err(err) = agent.params.validate() {
            if agent.is_changed() {
                warn!("path agent {entity} not started: {err}");
            }
            continue;
        }

        let entity_state = EntityState::new(transform.translation, *transform.forward());
        let mut follower = PathFollower::new(agent.params);
        follower.init(
            route.points.iter().copied(),
            route.looping,
            agent.params,
            &entity_state,
        );
        debug!(
            "path agent {entity} following {} ({} points)",
            agent.path,
            follower.forward_path().point_count()
        );

        commands.entity(entity).insert((
            PathFollowerState {
                follower,
                source: agent.path,
                last_position: transform.translation,
                arrival_reported: false,
            },
            PathAgentOutput::default(),
        ));
    }
}

/// Apply queued [`PathAgentCommand`]s to their agents' followers.
pub fn apply_path_agent_commands(
    mut requests: MessageReader<PathAgentCommand>,
    mut agents: Query<(&mut PathAgent, &mut PathFollowerState)>,
    mut events: MessageWriter<PathAgentEvent>,
) {
    for request in requests.read() {
        let Ok((mut agent, mut state)) = agents.get_mut(request.entity) else {
            warn!("path command for {} ignored: no active follower", request.entity);
            continue;
        };

        let was_reversed = state.follower.is_using_reverse_path();
        match request.kind {
            PathAgentCommandKind::SetFinalLocation(position) => {
                state.follower.set_final_path_location(position);
                state.arrival_reported = false;
            }
            PathAgentCommandKind::ResetFinalLocation => {
                state.follower.reset_final_path_location();
                state.arrival_reported = false;
            }
            PathAgentCommandKind::SetDesiredSpeed(speed) => {
                match ParamsError::check_non_negative("desired_speed", speed) {
                    Ok(()) => agent.params.desired_speed = speed,
                    Err(err) => warn!("path agent {}: {err}", request.entity),
                }
                continue;
            }
        }

        if agent.state == AgentState::Arrived {
            agent.state = AgentState::Following;
        }
        if state.follower.is_using_reverse_path() != was_reversed {
            events.write(PathAgentEvent {
                entity: request.entity,
                kind: PathAgentEventKind::DirectionReversed,
            });
        }
    }
}

/// Tick every active follower and write its output.
pub fn update_path_agents(
    mut agents: Query<(
        Entity,
        &mut PathAgent,
        &mut PathFollowerState,
        &mut PathAgentOutput,
        &mut Transform,
    )>,
    time: Res<Time>,
    mut events: MessageWriter<PathAgentEvent>,
) {
    let delta = time.delta_secs();

    for (entity, mut agent, mut state, mut output, mut transform) in &mut agents {
        if agent.is_paused() {
            continue;
        }

        if state.follower.params().desired_speed != agent.params.desired_speed {
            state.follower.set_desired_speed(agent.params.desired_speed);
        }

        let velocity = if delta > 0.0 {
            (transform.translation - state.last_position) / delta
        } else {
            Vec3::ZERO
        };
        let entity_state =
            EntityState::new(transform.translation, *transform.forward()).with_velocity(velocity);
        let steering = state.follower.update(&entity_state, delta);
        output.0 = steering;

        if agent.drive_transform {
            // Never step past the target in one frame.
            let to_target = state.follower.target().position() - transform.translation;
            let step = (steering.speed * delta).min(to_target.length());
            transform.translation += steering.move_direction * step;
            if steering.look_direction.length_squared() > 0.0 {
                transform.look_to(steering.look_direction, agent.up_vector);
            }
        }
        state.last_position = transform.translation;

        if !state.arrival_reported
            && state.follower.has_reached_final_location()
            && steering.distance_to_path_end <= agent.params.path_radius
        {
            state.arrival_reported = true;
            agent.state = AgentState::Arrived;
            events.write(PathAgentEvent {
                entity,
                kind: PathAgentEventKind::ReachedFinalLocation,
            });
        }
    }
}
