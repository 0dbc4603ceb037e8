//! Path following example.
//!
//! Demonstrates agents flying a looping route and an open route, with stop
//! locations that make an agent slow down, turn around and park.
//!
//! Run with: `cargo run --example fly_path`

use bevy::prelude::*;
use bevy_path_follower::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PathFollowPlugin)
        .add_plugins(PathFollowDebugPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_input, log_agent_events))
        .run();
}

#[derive(Component)]
pub struct AgentLabel(&'static str);

/// The agent that receives stop locations.
#[derive(Component)]
pub struct Steerable;

/// Stop locations cycled with the S key.
#[derive(Resource)]
pub struct StopLocations {
    positions: Vec<Vec3>,
    next: usize,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 25.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Lighting
    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: true,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // A closed circuit around the scene
    let circuit = commands
        .spawn(WaypointPath::looping(vec![
            Vec3::new(-12.0, 3.0, -8.0),
            Vec3::new(0.0, 6.0, -12.0),
            Vec3::new(12.0, 3.0, -8.0),
            Vec3::new(12.0, 4.0, 8.0),
            Vec3::new(0.0, 2.0, 12.0),
            Vec3::new(-12.0, 4.0, 8.0),
        ]))
        .id();

    // An open corridor through the middle
    let corridor = commands
        .spawn(WaypointPath::new(vec![
            Vec3::new(-14.0, 1.0, 0.0),
            Vec3::new(-6.0, 2.0, 3.0),
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(6.0, 2.0, -3.0),
            Vec3::new(14.0, 1.0, 0.0),
        ]))
        .id();

    // Shared mesh and materials
    let cube_mesh = meshes.add(Cuboid::new(0.8, 0.8, 1.2));

    let red_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.2, 0.2),
        ..default()
    });
    let green_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.9, 0.2),
        ..default()
    });
    let blue_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.9),
        ..default()
    });

    // Agent 1: laps the circuit (red)
    commands.spawn((
        Mesh3d(cube_mesh.clone()),
        MeshMaterial3d(red_material),
        Transform::from_xyz(-12.0, 3.0, -8.0),
        PathAgent::new(circuit).with_params(
            PathFollowerParams::default()
                .with_desired_speed(6.0)
                .with_look_ahead_distance(4.0)
                .with_loop_along_path(true),
        ),
        AgentLabel("Circuit"),
    ));

    // Agent 2: joins the circuit from outside it (green)
    commands.spawn((
        Mesh3d(cube_mesh.clone()),
        MeshMaterial3d(green_material),
        Transform::from_xyz(0.0, 10.0, 0.0),
        PathAgent::new(circuit).with_params(
            PathFollowerParams::default()
                .with_desired_speed(4.0)
                .with_start_from_closest_location(false)
                .with_max_start_distance(30.0)
                .with_loop_along_path(true),
        ),
        AgentLabel("Joiner"),
    ));

    // Agent 3: flies the corridor and takes stop locations (blue)
    commands.spawn((
        Mesh3d(cube_mesh),
        MeshMaterial3d(blue_material),
        Transform::from_xyz(-14.0, 1.0, 0.0),
        PathAgent::new(corridor).with_params(
            PathFollowerParams::default()
                .with_desired_speed(5.0)
                .with_decelerate_distance(4.0),
        ),
        AgentLabel("Corridor"),
        Steerable,
    ));

    commands.insert_resource(StopLocations {
        positions: vec![
            Vec3::new(6.0, 2.0, -3.0),
            Vec3::new(-6.0, 2.0, 3.0),
            Vec3::new(0.0, 1.5, 0.0),
        ],
        next: 0,
    });

    // Ground plane for reference
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(20.0)))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.3, 0.3),
            ..default()
        })),
        Transform::from_xyz(0.0, -1.0, 0.0),
    ));

    info!("=== Path Following Example ===");
    info!("Red cube: laps the circuit");
    info!("Green cube: joins the circuit from above");
    info!("Blue cube: flies the corridor and takes stop locations");
    info!("Controls:");
    info!("  Space  - Pause/Resume all agents");
    info!("  S      - Send the blue cube to the next stop location");
    info!("  R      - Clear the blue cube's stop location");
    info!("  G      - Toggle debug drawing");
}

fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut agents: Query<&mut PathAgent>,
    steerable: Query<Entity, With<Steerable>>,
    mut stops: ResMut<StopLocations>,
    mut debug: ResMut<PathFollowDebugSettings>,
    mut commands: MessageWriter<PathAgentCommand>,
) {
    // Space to toggle pause
    if keyboard.just_pressed(KeyCode::Space) {
        for mut agent in &mut agents {
            if agent.is_paused() {
                agent.play();
            } else {
                agent.pause();
            }
        }
    }

    // S to send the steerable agent to the next stop
    if keyboard.just_pressed(KeyCode::KeyS) && !stops.positions.is_empty() {
        let position = stops.positions[stops.next];
        stops.next = (stops.next + 1) % stops.positions.len();
        for entity in &steerable {
            commands.write(PathAgentCommand {
                entity,
                kind: PathAgentCommandKind::SetFinalLocation(position),
            });
        }
        info!("Stop location set to {position}");
    }

    // R to clear the stop
    if keyboard.just_pressed(KeyCode::KeyR) {
        for entity in &steerable {
            commands.write(PathAgentCommand {
                entity,
                kind: PathAgentCommandKind::ResetFinalLocation,
            });
        }
        info!("Stop location cleared");
    }

    if keyboard.just_pressed(KeyCode::KeyG) {
        debug.toggle();
    }
}

fn log_agent_events(mut events: MessageReader<PathAgentEvent>, labels: Query<&AgentLabel>) {
    for event in events.read() {
        let label = labels.get(event.entity).map(|l| l.0).unwrap_or("Unknown");

        match event.kind {
            PathAgentEventKind::DirectionReversed => {
                info!("[{}] Turned around", label);
            }
            PathAgentEventKind::ReachedFinalLocation => {
                info!("[{}] Reached stop location", label);
            }
        }
    }
}
