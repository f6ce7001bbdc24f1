//! Projectile contact resolution: hits become `DamageRequest`s, obstacles stop the shot.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::health::DamageRequest;

use super::components::{HitOutcome, PooledProjectile, Projectile, ProjectileState, classify};

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

/// Turn projectile contacts into damage requests.
///
/// Runs before `HealthSet::Apply` so damage lands in the same fixed step.
pub fn process_projectile_collisions(
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    // Fast “is this a pooled projectile?” check
    q_is_projectile: Query<(), With<PooledProjectile>>,
    mut q_projectiles: Query<(&mut Projectile, &mut ProjectileState), With<PooledProjectile>>,
    q_layers: Query<&CollisionLayers>,
    q_position: Query<&GlobalTransform>,
    mut damage: MessageWriter<DamageRequest>,
    // Per-frame dedupe of (projectile, target owner)
    mut seen: Local<HashSet<(Entity, Entity)>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_is_projectile.contains(t1.collider);
        let p2 = q_is_projectile.contains(t2.collider);
        if !(p1 ^ p2) {
            continue; // must be exactly one projectile
        }
        let (projectile_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };
        let owner = other_side.gameplay_owner();

        if !seen.insert((projectile_side.collider, owner)) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok((mut projectile, mut state)) = q_projectiles.get_mut(projectile_side.collider) else {
            continue;
        };
        if *state != ProjectileState::Active {
            continue;
        }

        if projectile.shooter == Some(owner) {
            continue;
        }
        if let Ok(gt) = q_position.get(other_side.collider) {
            if projectile.in_spawn_grace(
                gt.translation().truncate(),
                tunables.spawn_grace_radius,
                tunables.spawn_grace_time,
            ) {
                projectile.defer(other_side.collider, owner);
                continue;
            }
        }

        settle_contact(&mut projectile, &mut state, owner, other_layers, &mut damage);
    }
}

/// Once the spawn grace is over, resolve deferred contacts that still overlap.
///
/// avian reports `CollisionStart` once per contact, so a target the shot was
/// already touching at the muzzle would otherwise never be hit.
pub fn resolve_deferred_contacts(
    tunables: Res<Tunables>,
    mut q_projectiles: Query<
        (&mut Projectile, &mut ProjectileState, &CollidingEntities),
        With<PooledProjectile>,
    >,
    q_layers: Query<&CollisionLayers>,
    mut damage: MessageWriter<DamageRequest>,
) {
    for (mut projectile, mut state, colliding) in &mut q_projectiles {
        if projectile.deferred.is_empty() || projectile.age < tunables.spawn_grace_time {
            continue;
        }
        let deferred = std::mem::take(&mut projectile.deferred);
        for (collider, owner) in deferred {
            if *state != ProjectileState::Active {
                break;
            }
            if !colliding.contains(&collider) {
                continue;
            }
            let Ok(layers) = q_layers.get(collider) else {
                continue;
            };
            settle_contact(&mut projectile, &mut state, owner, layers, &mut damage);
        }
    }
}

fn settle_contact(
    projectile: &mut Projectile,
    state: &mut ProjectileState,
    owner: Entity,
    other_layers: &CollisionLayers,
    damage: &mut MessageWriter<DamageRequest>,
) {
    match projectile.resolve(classify(projectile.faction, other_layers)) {
        HitOutcome::Ignored => {}
        HitOutcome::Hit { destroy } => {
            damage.write(DamageRequest {
                target: owner,
                amount: projectile.damage,
                source: projectile.shooter,
            });
            if destroy {
                *state = ProjectileState::PendingReturn;
            }
        }
        HitOutcome::Blocked => {
            *state = ProjectileState::PendingReturn;
        }
    }
}
