//! Core plugin: shared resources and global settings.

use bevy::prelude::*;

use crate::common::tunables::Tunables;

/// Physics and timed gameplay windows step at this rate.
pub const FIXED_HZ: f64 = 60.0;

pub fn plugin(app: &mut App) {
    // Tests may seed their own tunables before the plugin runs.
    app.init_resource::<Tunables>();
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_HZ));
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
}

#[cfg(test)]
mod tests;
