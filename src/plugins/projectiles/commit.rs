//! Return commit: recycle projectiles back into the pool.
//!
//! This module is the "owner" of the *Inactive invariants*.
//!
//! Invariant: Inactive projectiles must be:
//! - hidden
//! - velocity = 0
//! - collide with nothing (filters empty)
//!
//! Centralizing these writes here prevents inconsistencies.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::plugins::scene::SceneReset;

use super::components::{PooledProjectile, ProjectileState};
use super::pool::{ProjectilePool, inactive_layers};

type PooledQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut ProjectileState,
        &'static mut Visibility,
        &'static mut LinearVelocity,
        &'static mut CollisionLayers,
    ),
    With<PooledProjectile>,
>;

#[inline]
fn deactivate(
    state: &mut ProjectileState,
    vis: &mut Visibility,
    vel: &mut LinearVelocity,
    layers: &mut CollisionLayers,
) {
    *state = ProjectileState::Inactive;
    *vis = Visibility::Hidden;
    vel.0 = Vec2::ZERO;
    *layers = inactive_layers();
}

pub fn return_to_pool_commit(mut pool: ResMut<ProjectilePool>, mut q: PooledQuery) {
    for (e, mut state, mut vis, mut vel, mut layers) in &mut q {
        if *state != ProjectileState::PendingReturn {
            continue;
        }
        deactivate(&mut state, &mut vis, &mut vel, &mut layers);
        pool.push_free(e);
    }
}

/// Restart: every live projectile goes straight back to the pool.
pub fn recall_all_on_reset(
    mut resets: MessageReader<SceneReset>,
    mut pool: ResMut<ProjectilePool>,
    mut q: PooledQuery,
) {
    if resets.read().count() == 0 {
        return;
    }
    for (e, mut state, mut vis, mut vel, mut layers) in &mut q {
        if *state == ProjectileState::Inactive {
            continue;
        }
        deactivate(&mut state, &mut vis, &mut vel, &mut layers);
        pool.push_free(e);
    }
}
