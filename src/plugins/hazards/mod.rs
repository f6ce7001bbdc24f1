//! Contact damage: spikes, pits and enemies that hurt on touch.
//!
//! Sources read avian's `CollidingEntities` every physics step instead of
//! reacting to `CollisionStart`, so standing inside a hazard keeps hurting once
//! the cooldown runs out. Damage goes through the shared `DamageRequest`
//! pipeline like every other producer.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::health::{DamageRequest, Health, HealthSet, Incapacitated};
use crate::plugins::player::Controller;
use crate::plugins::scene::{SceneReset, SceneSet};

/// Upward share of the knockback impulse.
const KNOCKBACK_LIFT: f32 = 0.6;
/// How long a knocked-back controller ignores movement input.
pub const KNOCKBACK_TIME: f32 = 0.25;

#[derive(Component, Debug, Clone)]
#[require(CollidingEntities)]
pub struct ContactDamage {
    pub damage: i32,
    pub cooldown: f32,
    pub knockback: f32,
    /// Deal damage once per scene, then go inert.
    pub one_shot: bool,
    has_dealt_damage: bool,
    cooldown_remaining: f32,
}

impl ContactDamage {
    pub fn new(damage: i32, cooldown: f32, knockback: f32) -> Self {
        Self {
            damage,
            cooldown: cooldown.max(0.0),
            knockback,
            one_shot: false,
            has_dealt_damage: false,
            cooldown_remaining: 0.0,
        }
    }

    pub fn one_shot(mut self) -> Self {
        self.one_shot = true;
        self
    }

    #[inline]
    pub fn has_dealt_damage(&self) -> bool {
        self.has_dealt_damage
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0 && !(self.one_shot && self.has_dealt_damage)
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
    }

    /// Consume a hit if ready.
    pub fn try_trigger(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.has_dealt_damage = true;
        self.cooldown_remaining = self.cooldown;
        true
    }

    pub fn reset(&mut self) {
        self.has_dealt_damage = false;
        self.cooldown_remaining = 0.0;
    }
}

/// Away from the source horizontally, plus some lift.
pub fn knockback_velocity(source: Vec2, victim: Vec2, strength: f32) -> Vec2 {
    let side = if victim.x >= source.x { 1.0 } else { -1.0 };
    Vec2::new(side * strength, strength * KNOCKBACK_LIFT)
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        tick_contact_cooldowns.run_if(in_state(GameState::InGame)),
    );
    app.add_systems(
        FixedPostUpdate,
        apply_contact_damage
            .after(CollisionEventSystems)
            .before(HealthSet::Apply)
            .run_if(in_state(GameState::InGame)),
    );
    app.add_systems(Update, reset_contact_damage.in_set(SceneSet::Reset));
}

pub fn tick_contact_cooldowns(time: Res<Time>, mut q: Query<&mut ContactDamage>) {
    let dt = time.delta_secs();
    for mut contact in &mut q {
        contact.tick(dt);
    }
}

pub fn apply_contact_damage(
    mut q_sources: Query<
        (Entity, &mut ContactDamage, &CollidingEntities, &GlobalTransform),
        Without<Incapacitated>,
    >,
    mut q_victims: Query<
        (
            &Health,
            &GlobalTransform,
            Option<&mut LinearVelocity>,
            Option<&mut Controller>,
        ),
        (Without<ContactDamage>, Without<Incapacitated>),
    >,
    mut damage: MessageWriter<DamageRequest>,
) {
    for (source, mut contact, colliding, source_tf) in &mut q_sources {
        if !contact.is_ready() {
            continue;
        }
        for &victim in colliding.iter() {
            let Ok((health, victim_tf, vel, controller)) = q_victims.get_mut(victim) else {
                continue;
            };
            if health.is_invulnerable() || !contact.try_trigger() {
                continue;
            }

            damage.write(DamageRequest {
                target: victim,
                amount: contact.damage,
                source: Some(source),
            });
            if let Some(mut vel) = vel {
                vel.0 = knockback_velocity(
                    source_tf.translation().truncate(),
                    victim_tf.translation().truncate(),
                    contact.knockback,
                );
                if let Some(mut controller) = controller {
                    controller.knock_back(KNOCKBACK_TIME);
                }
            }
            debug!("contact damage {:?} -> {:?}", source, victim);
            break;
        }
    }
}

fn reset_contact_damage(mut resets: MessageReader<SceneReset>, mut q: Query<&mut ContactDamage>) {
    if resets.read().count() == 0 {
        return;
    }
    for mut contact in &mut q {
        contact.reset();
    }
}
