use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};

/// Straight-line flight at constant speed.
pub fn drive_projectiles(
    mut q: Query<(&Projectile, &ProjectileState, &mut LinearVelocity), With<PooledProjectile>>,
) {
    for (projectile, state, mut vel) in &mut q {
        if *state == ProjectileState::Active {
            vel.0 = projectile.velocity();
        }
    }
}

pub fn expire_projectiles(
    time: Res<Time>,
    mut q: Query<(&mut Projectile, &mut ProjectileState), With<PooledProjectile>>,
) {
    let dt = time.delta_secs();
    for (mut projectile, mut state) in &mut q {
        if *state != ProjectileState::Active {
            continue;
        }
        if projectile.tick(dt) {
            *state = ProjectileState::PendingReturn;
        }
    }
}
