//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `guardfall::game::configure_headless` to install gameplay plugins.
//! - every `app.update()` advances exactly one fixed step, so frame counts are time.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use guardfall::plugins::enemies::Enemy;
use guardfall::plugins::player::Player;

pub const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so sprite and scene resources exist.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

    guardfall::game::configure_headless(&mut app);
    // Match the fixed step to the manual frame exactly.
    app.insert_resource(Time::<Fixed>::from_duration(FRAME));
    // `App::run` normally finishes plugin setup; tests drive `update()` directly.
    app.finish();
    app.cleanup();
    app
}

/// Headless app after Startup has spawned the arena.
pub fn booted() -> App {
    let mut app = app_headless();
    app.update();
    app
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn player(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Player>>()
        .single(app.world())
        .expect("one player")
}

pub fn enemy_named(app: &mut App, name: &str) -> Entity {
    app.world_mut()
        .query_filtered::<(Entity, &Name), With<Enemy>>()
        .iter(app.world())
        .find(|(_, n)| n.as_str() == name)
        .map(|(e, _)| e)
        .unwrap_or_else(|| panic!("no enemy named {name}"))
}
