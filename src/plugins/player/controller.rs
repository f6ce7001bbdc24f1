//! Movement state: ground probes, jump arming, duck.

use bevy::prelude::*;

use crate::common::config::PlayerConfig;
use crate::common::layers::obstacle_mask;
use crate::common::sensing::Sensing;

/// Invariant: `can_jump` is only ever re-armed by [`Controller::update_ground`]
/// while the body is not rising.
#[derive(Component, Debug, Clone)]
pub struct Controller {
    pub grounded: bool,
    pub can_jump: bool,
    /// Set by a jump, cleared only by a confirmed landing.
    pub jump_lock: bool,
    pub ducking: bool,
    /// +1 facing right, -1 facing left.
    pub facing: f32,
    /// Latched in the frame tick, consumed by the next physics step.
    pub jump_requested: bool,
    /// While positive, input does not drive horizontal velocity.
    pub knockback_remaining: f32,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            grounded: false,
            can_jump: false,
            jump_lock: false,
            ducking: false,
            facing: 1.0,
            jump_requested: false,
            knockback_remaining: 0.0,
        }
    }
}

impl Controller {
    /// Feed this physics step's probe result.
    ///
    /// Contact only counts as grounded while vertical velocity is at or below
    /// `rearm_threshold`, so probes still touching the floor right after a jump
    /// do not hand the jump back.
    pub fn update_ground(&mut self, contact: bool, vy: f32, rearm_threshold: f32) {
        self.grounded = contact && vy <= rearm_threshold;
        if self.grounded {
            self.can_jump = true;
            self.jump_lock = false;
        }
    }

    pub fn try_jump(&mut self, vy: f32) -> bool {
        if !self.grounded || !self.can_jump || self.jump_lock || self.ducking || vy > 0.0 {
            return false;
        }
        self.can_jump = false;
        self.jump_lock = true;
        self.grounded = false;
        true
    }

    pub fn set_ducking(&mut self, held: bool) {
        self.ducking = held && self.grounded;
    }

    /// Horizontal velocity for an input axis; half speed while ducking.
    pub fn horizontal_velocity(&mut self, axis: f32, speed: f32) -> f32 {
        let axis = axis.clamp(-1.0, 1.0);
        if axis != 0.0 {
            self.facing = axis.signum();
        }
        let speed = if self.ducking { speed * 0.5 } else { speed };
        axis * speed
    }

    pub fn knock_back(&mut self, duration: f32) {
        self.knockback_remaining = self.knockback_remaining.max(duration);
    }

    #[inline]
    pub fn is_knocked_back(&self) -> bool {
        self.knockback_remaining > 0.0
    }

    pub fn tick_knockback(&mut self, dt: f32) {
        self.knockback_remaining = (self.knockback_remaining - dt).max(0.0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Three downward probes from the feet: center and one either side.
pub fn probe_ground(sensing: &impl Sensing, position: Vec2, cfg: &PlayerConfig) -> bool {
    let feet = position.y - cfg.half_height;
    [0.0, -cfg.probe_spread, cfg.probe_spread].into_iter().any(|dx| {
        // Start just inside the collider so a body resting on the floor still registers.
        let origin = Vec2::new(position.x + dx, feet + 1.0);
        sensing
            .raycast(origin, Vec2::NEG_Y, cfg.probe_length + 1.0, obstacle_mask())
            .is_some()
    })
}
