//! Distance-indexed polylines and cursors into them.
//!
//! A [`Path`] caches segment lengths and cumulative distances so that length
//! and distance lookups are constant time. A [`PathLocation`] is a plain
//! `(segment, normalized position)` value that is always interpreted against
//! an explicitly passed path.

mod location;
mod polyline;
mod trace;

pub use location::*;
pub use polyline::*;
pub use trace::*;

use bevy::prelude::*;

/// Plugin that registers path types for reflection/serialization.
pub struct PathPlugin;

impl Plugin for PathPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Path>()
            .register_type::<PathLocation>();
    }
}
