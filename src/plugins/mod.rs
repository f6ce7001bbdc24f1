//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod audio;
pub mod core;
pub mod enemies;
pub mod hazards;
pub mod health;
pub mod physics;
pub mod player;
pub mod projectiles;
pub mod scene;
pub mod ui;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    // Tunables must exist before physics and the projectile pool read them.
    core::plugin(app);
    audio::plugin(app);
    scene::plugin(app);
    health::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    hazards::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    app.add_plugins(ProjectilesPlugin);
    ui::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
}
