//! Tunable gameplay constants shared by every entity.
//!
//! Per-entity numbers (speeds, ranges, cooldowns) live in
//! [`crate::common::config`]; this resource only holds world-wide values.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Downward acceleration in pixels / s².
    pub gravity: f32,
    pub projectile_pool_capacity: usize,
    /// Projectiles start this far along their direction to clear the shooter's collider.
    pub muzzle_offset: f32,
    /// Collisions within this radius of the spawn point are ignored while the grace window lasts.
    pub spawn_grace_radius: f32,
    pub spawn_grace_time: f32,
    pub projectile_lifetime: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            gravity: 1400.0,
            projectile_pool_capacity: 256,
            muzzle_offset: 18.0,
            spawn_grace_radius: 24.0,
            spawn_grace_time: 0.08,
            projectile_lifetime: 2.5,
        }
    }
}
