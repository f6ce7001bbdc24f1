//! Spawn consumer: activate projectiles from the pool.
//!
//! # Fail-fast invariants
//! - The pool free list contains only valid pooled projectile entities.
//! - Therefore, a pooled entity must match the projectile query.
//!
//! If this is violated, we `expect()` and crash loudly.
//! This removes branches from the hot loop and makes invariant violations obvious.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use super::messages::SpawnProjectileRequest;
use super::pool::{ProjectilePool, active_layers};

pub fn allocate_projectiles_from_pool(
    tunables: Res<Tunables>,
    mut pool: ResMut<ProjectilePool>,
    mut reader: MessageReader<SpawnProjectileRequest>,
    mut q: Query<(
        &mut ProjectileState,
        &mut Projectile,
        &mut Transform,
        &mut LinearVelocity,
        &mut Visibility,
        &mut CollisionLayers,
    ), With<PooledProjectile>>,
) {
    for req in reader.read() {
        let Some(e) = pool.pop_free() else {
            // Capacity decision, not a correctness failure.
            debug!("projectile pool exhausted; dropping {:?} shot", req.faction);
            continue;
        };

        let (mut state, mut projectile, mut tf, mut vel, mut vis, mut layers) =
            q.get_mut(e).expect("ProjectilePool contained an entity missing pooled projectile components");

        let dir = req.direction.try_normalize().unwrap_or(Vec2::X);
        let spawn = req.origin + dir * tunables.muzzle_offset;

        *state = ProjectileState::Active;
        projectile.fire(req, spawn);
        tf.translation = spawn.extend(2.0);
        tf.rotation = Quat::from_rotation_z(dir.to_angle());
        vel.0 = projectile.velocity();
        *vis = Visibility::Visible;
        *layers = active_layers(req.faction);
    }
}
