//! Buffered spawn requests.
//!
//! We use Bevy **Messages** here instead of direct pool access.
//! The key idea is separation of concerns:
//! - producers (player gun, enemy shooters) create *intent*
//! - consumer applies intent (pool pop + component writes)
//!
//! This is a producer → queue → consumer pipeline.

use bevy::prelude::*;

use super::components::Faction;

#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnProjectileRequest {
    pub faction: Faction,
    /// Shooter position; the allocator pushes the projectile forward to the muzzle.
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub piercing: bool,
    pub max_hits: u32,
    pub lifetime: f32,
    pub shooter: Option<Entity>,
}
