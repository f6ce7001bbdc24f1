use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

use super::components::{Faction, PooledProjectile, Projectile, ProjectileState};

#[derive(Resource, Debug)]
pub struct ProjectilePool {
    pub free: Vec<Entity>,
    pub capacity: usize,
}

impl ProjectilePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<Entity> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, e: Entity) {
        self.free.push(e);
    }
}

#[inline]
pub fn active_layers(faction: Faction) -> CollisionLayers {
    CollisionLayers::new(
        faction.projectile_layer(),
        [Layer::World, faction.target_layer()],
    )
}

/// “Disabled” without structural changes: empty filters means we collide with nothing.
#[inline]
pub fn inactive_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [] as [Layer; 0])
}

/// Pre-spawn pooled projectiles (inactive).
///
/// Physics components stay present; inactive projectiles have empty filters so they
/// never generate collision events.
pub fn init_projectile_pool(mut commands: Commands, mut pool: ResMut<ProjectilePool>) {
    pool.free.clear();
    let cap = pool.capacity;
    pool.free.reserve(cap);

    for _ in 0..cap {
        let e = commands
            .spawn((
                Name::new("Projectile(Pooled)"),
                PooledProjectile,
                ProjectileState::Inactive,
                Projectile::idle(),
                Sprite {
                    color: Color::srgb(1.0, 0.85, 0.3),
                    custom_size: Some(Vec2::new(10.0, 4.0)),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 2.0),
                Visibility::Hidden,
                // Sensor + no gravity: constant velocity, no contact response.
                (
                    RigidBody::Dynamic,
                    GravityScale(0.0),
                    LockedAxes::ROTATION_LOCKED,
                    Sensor,
                    Collider::circle(3.0),
                    inactive_layers(),
                    LinearVelocity(Vec2::ZERO),
                    CollisionEventsEnabled,
                    CollidingEntities::default(),
                ),
            ))
            .id();

        pool.push_free(e);
    }
}
