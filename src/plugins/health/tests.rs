use std::time::Duration;

use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{TestRng, drain_messages, ensure_messages, insert_time, run_system_once};

// -----------------------------------------------------------------------------
// Model
// -----------------------------------------------------------------------------

#[test]
fn damage_while_invulnerable_never_changes_hit_points() {
    let mut rng = TestRng::new(0xA11CE_0001);
    for _case in 0..2000 {
        let max = rng.range_i32(1, 20);
        let mut hp = Health::new(max, DamagePolicy::MultiHit);
        hp.set_invulnerable(true);
        for _ in 0..rng.range_i32(1, 10) {
            let outcome = hp.apply_damage(rng.range_i32(-3, 30));
            assert_eq!(outcome, DamageOutcome::Ignored);
        }
        assert_eq!(hp.current(), max);
        assert!(!hp.is_dead());
    }
}

#[test]
fn fraction_tracks_remaining_hit_points() {
    let mut hp = Health::new(4, DamagePolicy::MultiHit).with_invulnerability_window(0.0);
    assert_eq!(hp.fraction(), 1.0);
    hp.apply_damage(1);
    assert_eq!(hp.fraction(), 0.75);
    hp.apply_damage(10);
    assert_eq!(hp.fraction(), 0.0);
}

#[test]
fn damage_is_monotonic_and_death_sticks_until_reset() {
    let mut rng = TestRng::new(0xBEEF_0002);
    for _case in 0..2000 {
        let max = rng.range_i32(1, 30);
        let mut hp = Health::new(max, DamagePolicy::MultiHit).with_invulnerability_window(0.0);
        let mut prev = hp.current();
        let mut kills = 0;
        for _ in 0..40 {
            if let DamageOutcome::Killed { .. } = hp.apply_damage(rng.range_i32(0, 6)) {
                kills += 1;
            }
            assert!(hp.current() <= prev);
            assert!((0..=max).contains(&hp.current()));
            assert_eq!(hp.is_dead(), hp.current() == 0);
            if hp.is_dead() {
                assert!(!hp.heal(5));
                assert_eq!(hp.current(), 0);
            }
            prev = hp.current();
        }
        assert!(kills <= 1, "death must be reported at most once");
    }
}

#[test]
fn one_hit_kill_dies_from_full_in_one_call() {
    let mut rng = TestRng::new(0x0E_0003);
    for _case in 0..500 {
        let mut hp = Health::new(rng.range_i32(1, 100), DamagePolicy::OneHitKill);
        let outcome = hp.apply_damage(rng.range_i32(1, 5));
        assert!(matches!(outcome, DamageOutcome::Killed { .. }));
        assert!(hp.is_dead());
        assert_eq!(hp.current(), 0);
    }
}

#[test]
fn heal_is_clamped_and_refused_for_one_hit_kill() {
    let mut hp = Health::new(5, DamagePolicy::MultiHit).with_invulnerability_window(0.0);
    hp.apply_damage(3);
    assert!(hp.heal(100));
    assert_eq!(hp.current(), 5);
    assert!(!hp.heal(1), "already full");

    let mut ohk = Health::new(5, DamagePolicy::OneHitKill);
    assert!(!ohk.heal(1));
}

#[test]
fn post_hit_window_blocks_then_expires() {
    let mut hp = Health::new(5, DamagePolicy::MultiHit).with_invulnerability_window(0.5);
    assert!(matches!(hp.apply_damage(1), DamageOutcome::Damaged { current: 4, max: 5 }));
    assert!(hp.is_invulnerable());
    assert_eq!(hp.apply_damage(1), DamageOutcome::Ignored);

    hp.tick(Duration::from_millis(300));
    assert_eq!(hp.apply_damage(1), DamageOutcome::Ignored);

    hp.tick(Duration::from_millis(250));
    assert!(!hp.is_invulnerable());
    assert!(matches!(hp.apply_damage(1), DamageOutcome::Damaged { current: 3, .. }));
}

#[test]
fn reset_is_idempotent_and_revives() {
    let mut hp = Health::new(3, DamagePolicy::MultiHit);
    hp.reset();
    assert_eq!(hp.current(), 3);

    hp.apply_damage(10);
    assert!(hp.is_dead());
    hp.set_invulnerable(true);
    hp.reset();
    hp.reset();
    assert!(!hp.is_dead());
    assert!(!hp.is_invulnerable());
    assert_eq!(hp.current(), 3);
}

#[test]
fn change_snapshot_is_polled_once() {
    let mut hp = Health::new(4, DamagePolicy::MultiHit);
    assert_eq!(hp.take_changed(), Some((4, 4)));
    assert_eq!(hp.take_changed(), None);
    hp.apply_damage(1);
    assert_eq!(hp.take_changed(), Some((3, 4)));
    hp.apply_damage(1); // inside the window
    assert_eq!(hp.take_changed(), None);
}

// -----------------------------------------------------------------------------
// Timed effects
// -----------------------------------------------------------------------------

#[test]
fn hurt_flash_restores_alpha_when_done_or_cancelled() {
    let mut flash = HurtFlash::default();
    flash.start(0.9, 0.2);
    assert!(flash.is_active());

    // Mid-flicker values never exceed the base.
    for _ in 0..3 {
        let a = flash.tick(0.05).expect("still flashing");
        assert!(a <= 0.9 + 1e-6);
    }
    assert_eq!(flash.tick(0.1), Some(0.9));
    assert!(!flash.is_active());

    flash.start(1.0, 5.0);
    flash.tick(0.1);
    assert_eq!(flash.cancel(), Some(1.0));
    assert_eq!(flash.cancel(), None);
}

#[test]
fn death_consequence_fires_once_after_delay() {
    let mut dc = DeathConsequence::new(SceneRequest::ActivateGameOver, 1.0);
    assert_eq!(dc.tick(5.0), None, "not armed");
    dc.arm();
    assert_eq!(dc.tick(0.6), None);
    dc.arm(); // re-arming mid-countdown keeps the original deadline
    assert_eq!(dc.tick(0.5), Some(SceneRequest::ActivateGameOver));
    assert_eq!(dc.tick(1.0), None);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

fn pipeline_world() -> World {
    let mut world = World::new();
    ensure_messages::<DamageRequest>(&mut world);
    ensure_messages::<HealRequest>(&mut world);
    ensure_messages::<Hurt>(&mut world);
    ensure_messages::<Died>(&mut world);
    ensure_messages::<AudioCue>(&mut world);
    ensure_messages::<HealthChanged>(&mut world);
    world
}

#[test]
fn damage_requests_kill_exactly_once() {
    let mut world = pipeline_world();
    let target = world
        .spawn(Health::new(2, DamagePolicy::MultiHit).with_invulnerability_window(0.0))
        .id();

    for _ in 0..4 {
        world.write_message(DamageRequest { target, amount: 1, source: None });
    }
    run_system_once(&mut world, apply_health_requests);

    let died = drain_messages::<Died>(&mut world);
    assert_eq!(died, vec![Died { entity: target }]);
    assert_eq!(drain_messages::<Hurt>(&mut world).len(), 1);
    assert!(world.get::<Incapacitated>(target).is_some());
    assert_eq!(world.get::<Health>(target).unwrap().current(), 0);
}

#[test]
fn damage_to_entity_without_health_is_dropped() {
    let mut world = pipeline_world();
    let target = world.spawn_empty().id();
    world.write_message(DamageRequest { target, amount: 1, source: None });
    run_system_once(&mut world, apply_health_requests);
    assert!(drain_messages::<Died>(&mut world).is_empty());
}

#[test]
fn hit_starts_flash_and_publishes_change() {
    let mut world = pipeline_world();
    let target = world
        .spawn((
            Health::new(3, DamagePolicy::MultiHit),
            HurtFlash::default(),
            Sprite::from_color(Color::WHITE, Vec2::splat(8.0)),
        ))
        .id();
    world.get_mut::<Health>(target).unwrap().take_changed();

    world.write_message(DamageRequest { target, amount: 1, source: None });
    run_system_once(&mut world, apply_health_requests);
    run_system_once(&mut world, publish_health_changes);

    assert!(world.get::<HurtFlash>(target).unwrap().is_active());
    assert_eq!(
        drain_messages::<HealthChanged>(&mut world),
        vec![HealthChanged { entity: target, current: 2, max: 3 }]
    );
}

#[test]
fn dead_entity_flash_is_cancelled_and_alpha_restored() {
    let mut world = World::new();
    insert_time(&mut world, 0.05);
    let mut hp = Health::new(1, DamagePolicy::MultiHit);
    hp.apply_damage(1);
    let mut flash = HurtFlash::default();
    flash.start(1.0, 1.0);
    let mut sprite = Sprite::from_color(Color::WHITE, Vec2::splat(8.0));
    sprite.color.set_alpha(0.25);
    let e = world.spawn((hp, flash, sprite)).id();

    run_system_once(&mut world, update_hurt_flash);

    assert!(!world.get::<HurtFlash>(e).unwrap().is_active());
    assert_eq!(world.get::<Sprite>(e).unwrap().color.alpha(), 1.0);
}

#[test]
fn scene_reset_revives_registered_entities() {
    let mut world = World::new();
    ensure_messages::<SceneReset>(&mut world);
    let mut hp = Health::new(2, DamagePolicy::MultiHit);
    hp.apply_damage(5);
    let e = world
        .spawn((hp, Incapacitated, DeathConsequence::new(SceneRequest::ActivateGameOver, 1.0)))
        .id();
    world.get_mut::<DeathConsequence>(e).unwrap().arm();

    let mut registry = Resettables::default();
    registry.register(e);
    world.insert_resource(registry);
    world.write_message(SceneReset);

    run_system_once(&mut world, reset_registered_health);

    assert!(!world.get::<Health>(e).unwrap().is_dead());
    assert!(world.get::<Incapacitated>(e).is_none());
    assert!(!world.get::<DeathConsequence>(e).unwrap().is_armed());
}
