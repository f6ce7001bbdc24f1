//! Health plugin: the shared damage pipeline.
//!
//! ```text
//!  producers (projectiles, enemy melee, contact hazards)
//!        │  DamageRequest / HealRequest
//!        v
//!  FixedPostUpdate: apply_health_requests   (single writer to Health)
//!        │  Hurt, Died, AudioCue
//!        v
//!  PostUpdate: publish_health_changes       (HealthChanged listeners: HUD, lighting)
//! ```
//!
//! Producers never touch `Health` directly. The consumer is the only place the
//! death transition can happen, which keeps the "exactly once" guarantee local.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::audio::AudioCue;
use crate::plugins::scene::{Resettables, SceneRequest, SceneReset, SceneSet};

pub mod model;

pub use model::{DamageOutcome, DamagePolicy, Health};

// -----------------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------------

#[derive(Message, Clone, Copy, Debug)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    pub source: Option<Entity>,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: i32,
}

/// `(current, max)` after any successful mutation.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: i32,
    pub max: i32,
}

/// A hit was accepted but the entity survived.
#[derive(Message, Clone, Copy, Debug)]
pub struct Hurt {
    pub entity: Entity,
    pub source: Option<Entity>,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Died {
    pub entity: Entity,
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

/// Marker: controllers skip this entity until a reset.
#[derive(Component, Debug, Clone, Copy)]
pub struct Incapacitated;

/// Timed alpha flicker after a hit.
///
/// Only alpha is touched so other systems can keep tinting RGB.
/// Cancelling always restores the alpha captured when the flash started.
#[derive(Component, Debug, Clone, Default)]
pub struct HurtFlash {
    remaining: f32,
    phase: f32,
    base_alpha: Option<f32>,
}

impl HurtFlash {
    pub const DURATION: f32 = 0.6;
    const PERIOD: f32 = 0.08;
    const DIM_ALPHA: f32 = 0.25;

    pub fn start(&mut self, current_alpha: f32, duration: f32) {
        if self.base_alpha.is_none() {
            self.base_alpha = Some(current_alpha);
        }
        self.remaining = duration;
        self.phase = 0.0;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.base_alpha.is_some()
    }

    /// Advance the flicker. Returns the alpha to apply, if any.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        let base = self.base_alpha?;
        self.remaining -= dt;
        self.phase += dt;
        if self.remaining <= 0.0 {
            return self.cancel();
        }
        let lit = ((self.phase / Self::PERIOD) as u32) % 2 == 0;
        Some(if lit { base } else { base * Self::DIM_ALPHA })
    }

    /// Stop early. Returns the original alpha to restore.
    pub fn cancel(&mut self) -> Option<f32> {
        self.remaining = 0.0;
        self.phase = 0.0;
        self.base_alpha.take()
    }
}

/// Scene request issued a fixed delay after this entity dies.
#[derive(Component, Debug, Clone)]
pub struct DeathConsequence {
    pub request: SceneRequest,
    pub delay: f32,
    remaining: Option<f32>,
}

impl DeathConsequence {
    pub fn new(request: SceneRequest, delay: f32) -> Self {
        Self {
            request,
            delay: delay.max(0.0),
            remaining: None,
        }
    }

    pub fn arm(&mut self) {
        if self.remaining.is_none() {
            self.remaining = Some(self.delay);
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Returns the request once, when the delay runs out.
    pub fn tick(&mut self, dt: f32) -> Option<SceneRequest> {
        let remaining = self.remaining.as_mut()?;
        *remaining -= dt;
        if *remaining > 0.0 {
            return None;
        }
        self.remaining = None;
        Some(self.request.clone())
    }

    pub fn disarm(&mut self) {
        self.remaining = None;
    }
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthSet {
    /// Consume damage/heal requests. Producers in `FixedPostUpdate` run before this.
    Apply,
}

pub fn plugin(app: &mut App) {
    app.add_message::<DamageRequest>()
        .add_message::<HealRequest>()
        .add_message::<HealthChanged>()
        .add_message::<Hurt>()
        .add_message::<Died>();

    app.configure_sets(
        FixedPostUpdate,
        HealthSet::Apply.run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedUpdate,
        tick_invulnerability.run_if(in_state(GameState::InGame)),
    );
    app.add_systems(FixedPostUpdate, apply_health_requests.in_set(HealthSet::Apply));

    app.add_systems(
        Update,
        (arm_death_consequences, tick_death_consequences, update_hurt_flash)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
    app.add_systems(Update, reset_registered_health.in_set(SceneSet::Reset));

    // Listeners should see resets as well as hits, so publish after everything.
    app.add_systems(PostUpdate, publish_health_changes);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

pub fn tick_invulnerability(time: Res<Time>, mut q: Query<&mut Health>) {
    let dt = time.delta();
    for mut health in &mut q {
        if !health.invulnerability_remaining().is_zero() {
            health.tick(dt);
        }
    }
}

pub fn apply_health_requests(
    mut commands: Commands,
    mut damage: MessageReader<DamageRequest>,
    mut heals: MessageReader<HealRequest>,
    mut q: Query<(&mut Health, Option<&mut HurtFlash>, Option<&Sprite>)>,
    mut hurt: MessageWriter<Hurt>,
    mut died: MessageWriter<Died>,
    mut cues: MessageWriter<AudioCue>,
) {
    for req in damage.read() {
        let Ok((mut health, flash, sprite)) = q.get_mut(req.target) else {
            debug!("damage for {:?} dropped: no Health", req.target);
            continue;
        };

        match health.apply_damage(req.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { .. } => {
                if let (Some(mut flash), Some(sprite)) = (flash, sprite) {
                    flash.start(sprite.color.alpha(), HurtFlash::DURATION);
                }
                hurt.write(Hurt {
                    entity: req.target,
                    source: req.source,
                });
                cues.write(AudioCue::Hurt);
            }
            DamageOutcome::Killed { .. } => {
                info!("{:?} died", req.target);
                commands.entity(req.target).try_insert(Incapacitated);
                died.write(Died { entity: req.target });
                cues.write(AudioCue::Death);
            }
        }
    }

    for req in heals.read() {
        if let Ok((mut health, _, _)) = q.get_mut(req.target) {
            health.heal(req.amount);
        }
    }
}

pub fn publish_health_changes(
    mut q: Query<(Entity, &mut Health), Changed<Health>>,
    mut changed: MessageWriter<HealthChanged>,
) {
    for (entity, mut health) in &mut q {
        if let Some((current, max)) = health.take_changed() {
            changed.write(HealthChanged { entity, current, max });
        }
    }
}

fn arm_death_consequences(mut died: MessageReader<Died>, mut q: Query<&mut DeathConsequence>) {
    for ev in died.read() {
        if let Ok(mut consequence) = q.get_mut(ev.entity) {
            consequence.arm();
        }
    }
}

fn tick_death_consequences(
    time: Res<Time>,
    mut q: Query<&mut DeathConsequence>,
    mut requests: MessageWriter<SceneRequest>,
) {
    let dt = time.delta_secs();
    for mut consequence in &mut q {
        if let Some(request) = consequence.tick(dt) {
            requests.write(request);
        }
    }
}

/// Drive hurt flashes; dead or hidden entities stop flashing immediately.
pub fn update_hurt_flash(
    time: Res<Time>,
    mut q: Query<(&mut HurtFlash, &mut Sprite, &Health, Option<&Visibility>)>,
) {
    let dt = time.delta_secs();
    for (mut flash, mut sprite, health, vis) in &mut q {
        if !flash.is_active() {
            continue;
        }
        let inactive = health.is_dead() || matches!(vis, Some(Visibility::Hidden));
        let alpha = if inactive { flash.cancel() } else { flash.tick(dt) };
        if let Some(a) = alpha {
            sprite.color.set_alpha(a);
        }
    }
}

pub fn reset_registered_health(
    mut commands: Commands,
    mut resets: MessageReader<SceneReset>,
    registry: Res<Resettables>,
    mut q: Query<(
        &mut Health,
        Option<&mut HurtFlash>,
        Option<&mut Sprite>,
        Option<&mut DeathConsequence>,
    )>,
) {
    if resets.read().count() == 0 {
        return;
    }
    for e in registry.iter() {
        let Ok((mut health, flash, sprite, consequence)) = q.get_mut(e) else {
            continue;
        };
        health.reset();
        if let (Some(mut flash), Some(mut sprite)) = (flash, sprite) {
            if let Some(a) = flash.cancel() {
                sprite.color.set_alpha(a);
            }
        }
        if let Some(mut consequence) = consequence {
            consequence.disarm();
        }
        commands.entity(e).remove::<Incapacitated>();
    }
}

#[cfg(test)]
mod tests;
