//! Enemies plugin: perception, the AI state machine, and the death lifecycle.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED (ECS)
//! ---------------------------
//! 1) FACTS live in components:
//!    - `EnemyConfig` (static data), `EnemyAgent` (state machine memory), `Health`.
//!
//! 2) RULES mutate facts in a fixed order every frame (`EnemySet`, chained):
//!    - Sense:   range, line of sight, guard area -> detection edges
//!    - Decide:  state transitions, movement intent, actions
//!    - Act:     melee -> `DamageRequest`, shots -> `SpawnProjectileRequest`
//!    - Present: tint from state, dying fade
//!
//!    Velocity is applied in `FixedUpdate` from the stored intent.
//!
//! 3) DEATH never despawns. A dead enemy fades, then goes dormant (hidden, empty
//!    collision filters) so a scene reset can revive it in place.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_firefly::prelude::Occluder2d;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::common::config::EnemyConfig;
use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::audio::AudioCue;
use crate::plugins::hazards::ContactDamage;
use crate::plugins::health::{DamagePolicy, DamageRequest, Died, Health, HurtFlash, Hurt, Incapacitated};
use crate::plugins::player::Player;
use crate::plugins::projectiles::{Faction, SpawnProjectileRequest};
use crate::plugins::scene::{Resettables, SceneReset, SceneSet, SpawnPoint};

pub mod brain;
pub mod components;
pub mod detection;
pub mod roster;

pub use brain::EnemyAgent;
pub use components::{Action, Enemy, EnemyLife, EnemyState, PatrolRoute};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnemySet {
    Sense,
    Decide,
    Act,
    Present,
}

/// Seeded so patrol choices replay identically.
#[derive(Resource)]
pub struct EnemyRng(pub ChaCha8Rng);

impl Default for EnemyRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(0x6775_6172_64))
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<EnemyRng>()
        .add_systems(Startup, spawn_enemies);

    app.configure_sets(
        Update,
        (EnemySet::Sense, EnemySet::Decide, EnemySet::Act, EnemySet::Present)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        Update,
        (
            (enemy_death_trigger, stun_on_hurt, sense_player)
                .chain()
                .in_set(EnemySet::Sense),
            think.in_set(EnemySet::Decide).run_if(any_with_component::<Player>),
            execute_actions.in_set(EnemySet::Act),
            (enemy_death_progress, tint_by_state).in_set(EnemySet::Present),
        ),
    );

    app.add_systems(
        FixedUpdate,
        apply_locomotion.run_if(in_state(GameState::InGame)),
    );

    app.add_systems(Update, reset_enemies.in_set(SceneSet::Reset));
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

#[inline]
fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::PlayerBullet],
    )
}

/// Dying bodies still rest on geometry but nothing else sees them.
#[inline]
fn dying_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::World])
}

#[inline]
fn dormant_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [] as [Layer; 0])
}

fn spawn_enemies(mut commands: Commands, mut registry: ResMut<Resettables>) {
    for spawn in roster::arena() {
        let cfg = spawn.config.validated(spawn.name);
        let route = PatrolRoute::new(spawn.route);
        let agent = EnemyAgent::new(&cfg, spawn.position, &route);

        let health = Health::new(cfg.max_health, DamagePolicy::from_one_hit_kill(cfg.one_hit_kill_mode))
            .with_invulnerability_window(cfg.invulnerability_window);

        let body = if cfg.is_stationary() {
            RigidBody::Kinematic
        } else {
            RigidBody::Dynamic
        };
        let gravity = if cfg.is_flying() || cfg.is_stationary() { 0.0 } else { 1.0 };

        let mut entity = commands.spawn((
            Name::new(spawn.name),
            Enemy,
            (agent, route, EnemyLife::Alive, health, HurtFlash::default()),
            SpawnPoint(spawn.position),
            Sprite {
                color: state_color(EnemyState::Idle),
                custom_size: Some(roster::ENEMY_SIZE),
                ..default()
            },
            Transform::from_translation(spawn.position.extend(1.0)),
            (
                body,
                GravityScale(gravity),
                LockedAxes::ROTATION_LOCKED,
                Collider::rectangle(roster::ENEMY_SIZE.x, roster::ENEMY_SIZE.y),
                enemy_layers(),
                LinearVelocity::ZERO,
            ),
            Occluder2d::rectangle(roster::ENEMY_SIZE.x, roster::ENEMY_SIZE.y),
        ));

        if cfg.touch_damage > 0 {
            entity.insert(ContactDamage::new(cfg.touch_damage, cfg.touch_cooldown, cfg.touch_knockback));
        }
        let e = entity.insert(cfg).id();

        registry.register(e);
        info!("spawned enemy `{}` at {}", spawn.name, spawn.position);
    }
}

// -----------------------------------------------------------------------------
// Sense
// -----------------------------------------------------------------------------

fn stun_on_hurt(
    mut hurt: MessageReader<Hurt>,
    mut q: Query<(&EnemyConfig, &mut EnemyAgent)>,
) {
    for ev in hurt.read() {
        if let Ok((cfg, mut agent)) = q.get_mut(ev.entity) {
            agent.stun(cfg.hit_stun);
        }
    }
}

fn sense_player(
    time: Res<Time>,
    spatial: SpatialQuery,
    q_player: Query<(&Transform, Has<Incapacitated>), With<Player>>,
    mut q: Query<(&Name, &Transform, &EnemyConfig, &mut EnemyAgent), With<Enemy>>,
    mut cues: MessageWriter<AudioCue>,
    mut warned_missing: Local<bool>,
) {
    let Ok((player_tf, incapacitated)) = q_player.single() else {
        if !*warned_missing {
            warn!("no player in scene; enemy AI is paused");
            *warned_missing = true;
        }
        return;
    };
    *warned_missing = false;

    // An incapacitated player is treated as absent.
    let player = (!incapacitated).then(|| player_tf.translation.truncate());
    let dt = time.delta_secs();

    for (name, tf, cfg, mut agent) in &mut q {
        if agent.is_dead() {
            continue;
        }
        let position = tf.translation.truncate();
        let senses = detection::sense(&spatial, cfg, position, agent.guard_center, player);
        agent.senses = senses;

        let mut memory = agent.detection;
        let event = detection::update_detection(&mut memory, &senses, cfg, dt);
        agent.detection = memory;

        if let Some(event) = event {
            info!("{name}: {event:?}");
            if agent.on_detection(event) {
                cues.write(AudioCue::EnemyAlert);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Decide
// -----------------------------------------------------------------------------

fn think(
    time: Res<Time>,
    mut rng: ResMut<EnemyRng>,
    mut q: Query<(&Transform, &EnemyConfig, &PatrolRoute, &mut EnemyAgent), With<Enemy>>,
) {
    let dt = time.delta_secs();
    for (tf, cfg, route, mut agent) in &mut q {
        agent.think(cfg, route, tf.translation.truncate(), dt, &mut rng.0);
    }
}

// -----------------------------------------------------------------------------
// Act
// -----------------------------------------------------------------------------

fn execute_actions(
    tunables: Res<Tunables>,
    q_player: Query<Entity, (With<Player>, Without<Incapacitated>)>,
    mut q: Query<(Entity, &Transform, &EnemyConfig, &mut EnemyAgent), With<Enemy>>,
    mut damage: MessageWriter<DamageRequest>,
    mut shots: MessageWriter<SpawnProjectileRequest>,
    mut cues: MessageWriter<AudioCue>,
) {
    let player = q_player.single().ok();
    for (e, tf, cfg, mut agent) in &mut q {
        let action = std::mem::take(&mut agent.intent.action);
        match action {
            Action::None => {}
            Action::Melee => {
                let Some(player) = player else { continue };
                damage.write(DamageRequest {
                    target: player,
                    amount: cfg.attack_damage,
                    source: Some(e),
                });
                cues.write(AudioCue::EnemyAttack);
            }
            Action::Shoot { target } => {
                let origin = tf.translation.truncate();
                shots.write(SpawnProjectileRequest {
                    faction: Faction::Enemy,
                    origin,
                    direction: target - origin,
                    speed: cfg.bullet_speed,
                    damage: cfg.bullet_damage,
                    piercing: false,
                    max_hits: 1,
                    lifetime: tunables.projectile_lifetime,
                    shooter: Some(e),
                });
                cues.write(AudioCue::EnemyShoot);
            }
        }
    }
}

/// Physics step: turn the stored intent into velocity.
fn apply_locomotion(
    mut q: Query<(&Name, &Transform, &EnemyConfig, &mut EnemyAgent, Option<&mut LinearVelocity>), With<Enemy>>,
) {
    for (name, tf, cfg, mut agent, vel) in &mut q {
        let Some(mut vel) = vel else {
            if !agent.warned_no_body {
                warn!("{name} has no physics body; movement disabled");
                agent.warned_no_body = true;
            }
            continue;
        };
        if agent.is_dead() || cfg.is_stationary() {
            vel.0 = Vec2::ZERO;
            continue;
        }

        let v = brain::locomotion_velocity(
            &agent.intent,
            tf.translation.truncate(),
            cfg.is_flying(),
            cfg.waypoint_tolerance,
        );
        if cfg.is_flying() {
            vel.0 = v;
        } else {
            // Ground bodies keep whatever gravity is doing.
            vel.x = v.x;
        }
    }
}

// -----------------------------------------------------------------------------
// Death lifecycle
// -----------------------------------------------------------------------------

/// Died -> AI `Death` + `Dying` fade. Stops interaction immediately.
fn enemy_death_trigger(
    mut died: MessageReader<Died>,
    mut q: Query<(
        &EnemyConfig,
        &mut EnemyAgent,
        &mut EnemyLife,
        &mut CollisionLayers,
        Option<&mut LinearVelocity>,
    ), With<Enemy>>,
) {
    for ev in died.read() {
        let Ok((cfg, mut agent, mut life, mut layers, vel)) = q.get_mut(ev.entity) else {
            continue;
        };
        if !agent.die() {
            continue;
        }
        *life = EnemyLife::Dying {
            timer: Timer::from_seconds(cfg.dying_time, TimerMode::Once),
        };
        *layers = dying_enemy_layers();
        if let Some(mut vel) = vel {
            vel.x = 0.0;
        }
    }
}

fn enemy_death_progress(
    time: Res<Time>,
    mut q: Query<(
        &mut EnemyLife,
        &mut Sprite,
        &mut Visibility,
        &mut CollisionLayers,
        Option<&mut LinearVelocity>,
    ), With<Enemy>>,
) {
    for (mut life, mut sprite, mut vis, mut layers, vel) in &mut q {
        let EnemyLife::Dying { timer } = &mut *life else {
            continue;
        };
        timer.tick(time.delta());
        sprite.color.set_alpha(1.0 - timer.fraction());

        if timer.is_finished() {
            *life = EnemyLife::Dormant;
            *vis = Visibility::Hidden;
            *layers = dormant_enemy_layers();
            if let Some(mut vel) = vel {
                vel.0 = Vec2::ZERO;
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Present
// -----------------------------------------------------------------------------

pub fn state_color(state: EnemyState) -> Color {
    match state {
        EnemyState::Idle => Color::srgb(0.75, 0.3, 0.3),
        EnemyState::Patrol => Color::srgb(0.8, 0.45, 0.3),
        EnemyState::Alert => Color::srgb(1.0, 0.85, 0.2),
        EnemyState::Chase => Color::srgb(1.0, 0.35, 0.1),
        EnemyState::Attack | EnemyState::Shoot => Color::srgb(1.0, 0.1, 0.1),
        EnemyState::Return => Color::srgb(0.6, 0.4, 0.6),
        EnemyState::Stunned => Color::srgb(0.6, 0.6, 0.9),
        EnemyState::Death => Color::srgb(0.3, 0.3, 0.3),
    }
}

/// RGB from AI state; alpha is owned by the flash and the dying fade.
fn tint_by_state(mut q: Query<(&EnemyAgent, &mut Sprite), (With<Enemy>, Changed<EnemyAgent>)>) {
    for (agent, mut sprite) in &mut q {
        let alpha = sprite.color.alpha();
        sprite.color = state_color(agent.state()).with_alpha(alpha);
    }
}

// -----------------------------------------------------------------------------
// Reset
// -----------------------------------------------------------------------------

fn reset_enemies(
    mut resets: MessageReader<SceneReset>,
    mut q: Query<(
        &EnemyConfig,
        &SpawnPoint,
        &PatrolRoute,
        &mut EnemyAgent,
        &mut EnemyLife,
        &mut Sprite,
        &mut Visibility,
        &mut CollisionLayers,
        Option<&mut LinearVelocity>,
    ), With<Enemy>>,
) {
    if resets.read().count() == 0 {
        return;
    }
    for (cfg, spawn, route, mut agent, mut life, mut sprite, mut vis, mut layers, vel) in &mut q {
        agent.reset(cfg, spawn.0, route);
        *life = EnemyLife::Alive;
        sprite.color = state_color(agent.state());
        *vis = Visibility::Inherited;
        *layers = enemy_layers();
        if let Some(mut vel) = vel {
            vel.0 = Vec2::ZERO;
        }
    }
}
