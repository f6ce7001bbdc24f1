//! Ammo, fire-rate cooldown and the reload timer.

use bevy::prelude::*;

use crate::common::config::{FireMode, PlayerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    /// Trigger not pulled for this fire mode.
    Idle,
    Fired,
    /// Out of ammo; a reload was started.
    EmptyClip,
    Reloading,
    CoolingDown,
}

/// Invariant: `ammo <= max_ammo`, and nothing fires while a reload is running.
#[derive(Component, Debug, Clone)]
pub struct Gun {
    ammo: u32,
    max_ammo: u32,
    mode: FireMode,
    fire_interval: f32,
    reload_time: f32,
    cooldown: f32,
    reload_elapsed: Option<f32>,
}

impl Gun {
    pub fn from_config(cfg: &PlayerConfig) -> Self {
        Self {
            ammo: cfg.max_ammo,
            max_ammo: cfg.max_ammo,
            mode: cfg.fire_mode,
            fire_interval: 1.0 / cfg.fire_rate,
            reload_time: cfg.reload_time,
            cooldown: 0.0,
            reload_elapsed: None,
        }
    }

    #[inline]
    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    #[inline]
    pub fn max_ammo(&self) -> u32 {
        self.max_ammo
    }

    #[inline]
    pub fn is_reloading(&self) -> bool {
        self.reload_elapsed.is_some()
    }

    /// Single fire reacts to the press edge, auto fire to the held state.
    pub fn trigger(&mut self, pressed: bool, held: bool) -> TriggerResult {
        let pulled = match self.mode {
            FireMode::Single => pressed,
            FireMode::Auto => held,
        };
        if !pulled {
            return TriggerResult::Idle;
        }
        if self.is_reloading() {
            return TriggerResult::Reloading;
        }
        if self.ammo == 0 {
            self.start_reload();
            return TriggerResult::EmptyClip;
        }
        if self.cooldown > 0.0 {
            return TriggerResult::CoolingDown;
        }
        self.ammo -= 1;
        self.cooldown = self.fire_interval;
        TriggerResult::Fired
    }

    /// Returns false if already reloading or the clip is full.
    pub fn start_reload(&mut self) -> bool {
        if self.is_reloading() || self.ammo >= self.max_ammo {
            return false;
        }
        self.reload_elapsed = Some(0.0);
        true
    }

    /// Advance timers. Returns true on the tick a reload completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.cooldown = (self.cooldown - dt).max(0.0);
        let Some(elapsed) = self.reload_elapsed.as_mut() else {
            return false;
        };
        *elapsed += dt;
        if *elapsed >= self.reload_time {
            self.reload_elapsed = None;
            self.ammo = self.max_ammo;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.ammo = self.max_ammo;
        self.cooldown = 0.0;
        self.reload_elapsed = None;
    }
}
