//! Gizmo drawing of each agent's active path and cursors.

use bevy::prelude::*;

use super::{PathFollowSystems, PathFollowerState};

/// Settings for path follower debug drawing.
#[derive(Resource, Debug, Clone)]
pub struct PathFollowDebugSettings {
    /// Whether anything is drawn.
    pub enabled: bool,
    /// Draw a line from each agent to its movement target.
    pub show_agent_links: bool,
    /// Radius of the target, look-ahead and stop markers.
    pub marker_radius: f32,
    /// Color of the active path.
    pub path_color: Color,
    /// Color of the movement target marker.
    pub target_color: Color,
    /// Color of the look-ahead marker.
    pub lookahead_color: Color,
    /// Color of the stop location marker.
    pub final_color: Color,
}

impl Default for PathFollowDebugSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_agent_links: true,
            marker_radius: 0.25,
            path_color: Color::srgb(0.5, 0.5, 0.5),
            target_color: Color::srgb(0.2, 0.9, 0.2),
            lookahead_color: Color::srgb(0.3, 0.5, 1.0),
            final_color: Color::srgb(1.0, 0.4, 0.4),
        }
    }
}

impl PathFollowDebugSettings {
    /// Toggle drawing on/off.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

/// Draw every agent's active path with its target, look-ahead and stop
/// markers.
pub fn draw_path_agents(
    settings: Res<PathFollowDebugSettings>,
    agents: Query<(&PathFollowerState, &Transform)>,
    mut gizmos: Gizmos,
) {
    if !settings.enabled {
        return;
    }

    for (state, transform) in &agents {
        let view = state.follower.debug_view();

        for segment in view.path.segments() {
            gizmos.line(segment.start, segment.end, settings.path_color);
        }

        let radius = settings.marker_radius;
        gizmos.sphere(Isometry3d::from_translation(view.target), radius, settings.target_color);
        gizmos.sphere(
            Isometry3d::from_translation(view.lookahead),
            radius,
            settings.lookahead_color,
        );
        if state.follower.stop_at_final() {
            gizmos.sphere(
                Isometry3d::from_translation(view.final_position),
                radius,
                settings.final_color,
            );
        }

        if settings.show_agent_links {
            gizmos.line(transform.translation, view.target, settings.target_color);
        }
    }
}

/// Plugin that draws path follower state with gizmos.
///
/// Requires gizmo support (included in `DefaultPlugins`). Toggle drawing with
/// the [`PathFollowDebugSettings`] resource.
pub struct PathFollowDebugPlugin;

impl Plugin for PathFollowDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PathFollowDebugSettings>()
            .add_systems(Update, draw_path_agents.after(PathFollowSystems));
    }
}
