mod common;

use bevy::prelude::*;
use guardfall::plugins::projectiles::pool::ProjectilePool;
use guardfall::plugins::projectiles::{Faction, ProjectileState, SpawnProjectileRequest};

fn active(app: &mut App) -> usize {
    app.world_mut()
        .query::<&ProjectileState>()
        .iter(app.world())
        .filter(|s| **s != ProjectileState::Inactive)
        .count()
}

#[test]
fn fired_projectile_returns_to_pool_after_lifetime() {
    let mut app = common::booted();
    let player = common::player(&mut app);
    let capacity = app.world().resource::<ProjectilePool>().capacity;

    app.world_mut().write_message(SpawnProjectileRequest {
        faction: Faction::Player,
        origin: Vec2::new(-360.0, -150.0),
        direction: Vec2::NEG_X,
        speed: 10.0,
        damage: 1,
        piercing: false,
        max_hits: 1,
        lifetime: 0.2,
        shooter: Some(player),
    });
    app.update();

    assert_eq!(active(&mut app), 1);
    assert_eq!(app.world().resource::<ProjectilePool>().free.len(), capacity - 1);

    common::run_frames(&mut app, 30);

    assert_eq!(active(&mut app), 0);
    assert_eq!(app.world().resource::<ProjectilePool>().free.len(), capacity);
}
