mod common;

use bevy::prelude::*;
use guardfall::common::state::GameState;
use guardfall::common::tunables::Tunables;
use guardfall::plugins::enemies::{Enemy, EnemyAgent};
use guardfall::plugins::projectiles::pool::ProjectilePool;
use guardfall::plugins::scene::Resettables;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();
    common::run_frames(&mut app, 3);

    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::InGame
    );
}

#[test]
fn arena_is_populated_and_registered() {
    let mut app = common::booted();

    let player = common::player(&mut app);
    let enemies = app
        .world_mut()
        .query_filtered::<Entity, With<Enemy>>()
        .iter(app.world())
        .count();
    assert_eq!(enemies, 5);

    let registry = app.world().resource::<Resettables>();
    assert_eq!(registry.len(), enemies + 1);
    assert!(registry.iter().any(|e| e == player));

    let capacity = app.world().resource::<Tunables>().projectile_pool_capacity;
    let pool = app.world().resource::<ProjectilePool>();
    assert_eq!(pool.free.len(), capacity);
}

#[test]
fn enemies_run_many_frames_without_dying() {
    let mut app = common::booted();
    common::run_frames(&mut app, 120);

    let dead = app
        .world_mut()
        .query::<&EnemyAgent>()
        .iter(app.world())
        .filter(|a| a.is_dead())
        .count();
    assert_eq!(dead, 0);
}
