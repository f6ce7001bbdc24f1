//! Player plugin.
//!
//! Pipeline:
//! - Update / `PlayerSet::Input`: sample devices into the `PlayerInput` resource
//! - Update / `PlayerSet::Act`: duck + jump latch, gun (fire, reload)
//! - FixedUpdate: ground probes, then horizontal velocity and the latched jump
//! - Update / `PlayerSet::Animate`: pick the animation state, drive the sprite
//!
//! `PlayerInput` is the input collaborator boundary: when no keyboard or mouse
//! resources exist (headless), it is left untouched so callers can drive it.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::common::config::PlayerConfig;
use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::audio::AudioCue;
use crate::plugins::camera::MainCamera;
use crate::plugins::health::{DamagePolicy, DeathConsequence, Health, HurtFlash, Incapacitated};
use crate::plugins::projectiles::{Faction, SpawnProjectileRequest};
use crate::plugins::scene::{Resettables, SceneRequest, SceneReset, SceneSet, SpawnPoint};

pub mod animation;
pub mod controller;
pub mod gun;

pub use animation::{AnimState, PlayerAnimation};
pub use controller::Controller;
pub use gun::{Gun, TriggerResult};

pub const PLAYER_SIZE: Vec2 = Vec2::new(22.0, 32.0);
pub const PLAYER_SPAWN: Vec2 = Vec2::new(-360.0, -150.0);

#[derive(Component)]
pub struct Player;

/// One frame of polled input.
#[derive(Resource, Default, Debug, Clone)]
pub struct PlayerInput {
    /// -1..1
    pub axis: f32,
    pub jump_pressed: bool,
    pub duck_held: bool,
    pub fire_pressed: bool,
    pub fire_held: bool,
    pub reload_pressed: bool,
    pub pointer_world: Option<Vec2>,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerSet {
    Input,
    Act,
    Animate,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .add_systems(Startup, spawn);

    app.configure_sets(
        Update,
        (PlayerSet::Input, PlayerSet::Act, PlayerSet::Animate)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(Update, gather_input.in_set(PlayerSet::Input))
        .add_systems(Update, (latch_intent, shoot).chain().in_set(PlayerSet::Act))
        .add_systems(Update, animate.in_set(PlayerSet::Animate))
        .add_systems(Update, reset_player.in_set(SceneSet::Reset));

    app.add_systems(
        FixedUpdate,
        (probe_ground_contacts, apply_movement)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

fn spawn(mut commands: Commands, mut registry: ResMut<Resettables>) {
    let cfg = PlayerConfig::default().validated();
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::EnemyBullet, Layer::Hazard],
    );

    let health = Health::new(cfg.max_health, DamagePolicy::from_one_hit_kill(cfg.one_hit_kill_mode))
        .with_invulnerability_window(cfg.invulnerability_window);

    let e = commands
        .spawn((
            Name::new("Player"),
            Player,
            (
                Gun::from_config(&cfg),
                Controller::default(),
                PlayerAnimation::default(),
                health,
                HurtFlash::default(),
                DeathConsequence::new(SceneRequest::ActivateGameOver, cfg.game_over_delay),
                SpawnPoint(PLAYER_SPAWN),
            ),
            cfg,
            Sprite {
                color: Color::srgb(0.2, 0.75, 0.9),
                custom_size: Some(PLAYER_SIZE),
                ..default()
            },
            Transform::from_translation(PLAYER_SPAWN.extend(1.0)),
            (
                RigidBody::Dynamic,
                LockedAxes::ROTATION_LOCKED,
                Collider::rectangle(PLAYER_SIZE.x, PLAYER_SIZE.y),
                Friction::ZERO,
                layers,
                LinearVelocity::ZERO,
                CollidingEntities::default(),
            ),
        ))
        .id();

    registry.register(e);
    info!("player spawned at {PLAYER_SPAWN}");
}

fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut input: ResMut<PlayerInput>,
) {
    let Some(keys) = keys else {
        return;
    };

    let mut axis = 0.0;
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis += 1.0;
    }

    input.axis = axis;
    input.jump_pressed = keys.just_pressed(KeyCode::Space) || keys.just_pressed(KeyCode::KeyW);
    input.duck_held = keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown);
    input.reload_pressed = keys.just_pressed(KeyCode::KeyR);
    input.fire_pressed = mouse.as_ref().is_some_and(|m| m.just_pressed(MouseButton::Left));
    input.fire_held = mouse.as_ref().is_some_and(|m| m.pressed(MouseButton::Left));

    // Cursor outside the window or no camera yet: aim falls back to facing.
    input.pointer_world = q_window
        .single()
        .ok()
        .and_then(|w| w.cursor_position())
        .and_then(|cursor| {
            let (camera, cam_tf) = q_camera.single().ok()?;
            camera.viewport_to_world_2d(cam_tf, cursor).ok()
        });
}

fn latch_intent(
    input: Res<PlayerInput>,
    mut q: Query<&mut Controller, (With<Player>, Without<Incapacitated>)>,
) {
    for mut controller in &mut q {
        controller.set_ducking(input.duck_held);
        if input.jump_pressed {
            controller.jump_requested = true;
        }
    }
}

/// Unit aim vector from `origin` toward the pointer, else along `facing`.
pub fn aim_direction(origin: Vec2, pointer: Option<Vec2>, facing: f32) -> Vec2 {
    pointer
        .and_then(|p| (p - origin).try_normalize())
        .unwrap_or(Vec2::new(facing.signum(), 0.0))
}

fn shoot(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q: Query<
        (Entity, &Transform, &PlayerConfig, &Controller, &mut Gun),
        (With<Player>, Without<Incapacitated>),
    >,
    mut requests: MessageWriter<SpawnProjectileRequest>,
    mut cues: MessageWriter<AudioCue>,
) {
    let dt = time.delta_secs();
    for (e, tf, cfg, controller, mut gun) in &mut q {
        if gun.tick(dt) {
            cues.write(AudioCue::ReloadDone);
        }
        if input.reload_pressed && gun.start_reload() {
            cues.write(AudioCue::ReloadStart);
        }

        match gun.trigger(input.fire_pressed, input.fire_held) {
            TriggerResult::Fired => {
                let origin = tf.translation.truncate();
                requests.write(SpawnProjectileRequest {
                    faction: Faction::Player,
                    origin,
                    direction: aim_direction(origin, input.pointer_world, controller.facing),
                    speed: cfg.bullet_speed,
                    damage: cfg.bullet_damage,
                    piercing: cfg.piercing,
                    max_hits: cfg.effective_max_hits(),
                    lifetime: tunables.projectile_lifetime,
                    shooter: Some(e),
                });
                cues.write(AudioCue::PlayerShoot);
            }
            TriggerResult::EmptyClip => {
                cues.write(AudioCue::EmptyClip);
                cues.write(AudioCue::ReloadStart);
            }
            TriggerResult::Idle | TriggerResult::Reloading | TriggerResult::CoolingDown => {}
        }
    }
}

fn probe_ground_contacts(
    spatial: SpatialQuery,
    mut q: Query<(&Transform, &PlayerConfig, &LinearVelocity, &mut Controller), With<Player>>,
) {
    for (tf, cfg, vel, mut controller) in &mut q {
        let contact = controller::probe_ground(&spatial, tf.translation.truncate(), cfg);
        controller.update_ground(contact, vel.y, cfg.rearm_velocity_threshold);
    }
}

fn apply_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut q: Query<
        (&PlayerConfig, &mut Controller, &mut LinearVelocity, Has<Incapacitated>),
        With<Player>,
    >,
    mut cues: MessageWriter<AudioCue>,
) {
    let dt = time.delta_secs();
    for (cfg, mut controller, mut vel, incapacitated) in &mut q {
        if incapacitated {
            vel.x = 0.0;
            controller.jump_requested = false;
            continue;
        }

        // A fresh knockback keeps the velocity the hit set.
        if controller.is_knocked_back() {
            controller.tick_knockback(dt);
        } else {
            vel.x = controller.horizontal_velocity(input.axis, cfg.move_speed);
        }

        if std::mem::take(&mut controller.jump_requested) && controller.try_jump(vel.y) {
            vel.y = cfg.jump_speed;
            cues.write(AudioCue::Jump);
        }
    }
}

fn animate(
    time: Res<Time>,
    mut q: Query<
        (&PlayerConfig, &Controller, &LinearVelocity, &mut PlayerAnimation, &mut Sprite),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();
    for (cfg, controller, vel, mut anim, mut sprite) in &mut q {
        let state = anim.update(
            animation::AnimInput {
                ducking: controller.ducking,
                grounded: controller.grounded,
                moving: vel.x.abs() > 1.0,
            },
            cfg.airborne_hold,
            cfg.walk_frame_time,
            dt,
        );
        sprite.custom_size = Some(animation::sprite_size(state, PLAYER_SIZE));
        sprite.flip_x = controller.facing < 0.0;
    }
}

fn reset_player(
    mut resets: MessageReader<SceneReset>,
    mut input: ResMut<PlayerInput>,
    mut q: Query<
        (&mut Gun, &mut Controller, &mut PlayerAnimation, &mut LinearVelocity),
        With<Player>,
    >,
) {
    if resets.read().count() == 0 {
        return;
    }
    *input = PlayerInput::default();
    for (mut gun, mut controller, mut anim, mut vel) in &mut q {
        gun.reset();
        controller.reset();
        anim.reset();
        vel.0 = Vec2::ZERO;
    }
}
