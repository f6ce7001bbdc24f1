mod common;

use bevy::prelude::*;
use guardfall::common::state::GameState;
use guardfall::plugins::enemies::{EnemyAgent, EnemyLife, EnemyState};
use guardfall::plugins::health::{DamageRequest, Health, Incapacitated};
use guardfall::plugins::player::PLAYER_SPAWN;
use guardfall::plugins::scene::{ActiveScene, SceneRequest};
use guardfall::plugins::ui::HudSnapshot;

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

#[test]
fn player_death_shows_game_over_then_restart_restores() {
    let mut app = common::booted();
    let player = common::player(&mut app);

    app.world_mut().write_message(DamageRequest {
        target: player,
        amount: 99,
        source: None,
    });
    common::run_frames(&mut app, 2);

    assert!(app.world().get::<Health>(player).unwrap().is_dead());
    assert!(app.world().get::<Incapacitated>(player).is_some());
    assert_eq!(state(&app), GameState::InGame, "game over waits for the display delay");

    // Default delay is 1.5s.
    common::run_frames(&mut app, 120);
    assert_eq!(state(&app), GameState::GameOver);

    app.world_mut().write_message(SceneRequest::RestartCurrentScene);
    common::run_frames(&mut app, 2);

    assert_eq!(state(&app), GameState::InGame);
    let health = app.world().get::<Health>(player).unwrap();
    assert_eq!(health.current(), health.max());
    assert!(app.world().get::<Incapacitated>(player).is_none());
    let x = app.world().get::<Transform>(player).unwrap().translation.x;
    assert!((x - PLAYER_SPAWN.x).abs() < 1.0);
    assert_eq!(app.world().resource::<ActiveScene>().restarts, 1);
}

#[test]
fn killed_enemy_fades_out_and_restart_revives_it() {
    let mut app = common::booted();
    let warden = common::enemy_named(&mut app, "Warden");

    app.world_mut().write_message(DamageRequest {
        target: warden,
        amount: 99,
        source: None,
    });
    common::run_frames(&mut app, 3);

    assert_eq!(app.world().get::<EnemyAgent>(warden).unwrap().state(), EnemyState::Death);
    assert!(matches!(
        app.world().get::<EnemyLife>(warden).unwrap(),
        EnemyLife::Dying { .. }
    ));

    common::run_frames(&mut app, 40);
    assert!(matches!(app.world().get::<EnemyLife>(warden).unwrap(), EnemyLife::Dormant));
    assert_eq!(*app.world().get::<Visibility>(warden).unwrap(), Visibility::Hidden);

    app.world_mut().write_message(SceneRequest::RestartCurrentScene);
    common::run_frames(&mut app, 2);

    assert!(!app.world().get::<EnemyAgent>(warden).unwrap().is_dead());
    assert!(matches!(app.world().get::<EnemyLife>(warden).unwrap(), EnemyLife::Alive));
    assert!(!app.world().get::<Health>(warden).unwrap().is_dead());
    assert!(app.world().get::<Incapacitated>(warden).is_none());
}

#[test]
fn hud_tracks_player_health() {
    let mut app = common::booted();
    common::run_frames(&mut app, 2);
    let view = app.world().resource::<HudSnapshot>().view();
    assert_eq!(view.health, (5, 5));
    assert_eq!(view.ammo, (8, 8));

    let player = common::player(&mut app);
    app.world_mut().write_message(DamageRequest {
        target: player,
        amount: 2,
        source: None,
    });
    common::run_frames(&mut app, 2);
    assert_eq!(app.world().resource::<HudSnapshot>().view().health, (3, 5));
}
