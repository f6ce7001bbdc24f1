//! Projectiles plugin: **Message-based producer → consumer** spawning + data-driven pooling.
//!
//! # Philosophy: invariants first
//! Correctness checks are pushed to boundaries and the hot paths (allocation,
//! collision resolve, return commit) stay as straight-line as possible.
//!
//! # Data flow (big picture)
//! ```text
//!   Update (variable dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  Producers: player gun, enemy shooters                                     │
//!│      - writes: SpawnProjectileRequest                                      │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   PostUpdate
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  Consumer: allocate_projectiles_from_pool                                  │
//!│      - mutates: ProjectilePool.free, Projectile, Transform, Velocity,      │
//!│                 Visibility, CollisionLayers                                │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedUpdate → FixedPostUpdate (fixed dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  drive / expire                                                            │
//!│  Avian emits CollisionStart                                                │
//!│  process_projectile_collisions → DamageRequest (before HealthSet::Apply)   │
//!│  resolve_deferred_contacts: muzzle-grace contacts still overlapping        │
//!│  return_to_pool_commit: PendingReturn → Inactive, push free                │
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Producers never borrow `ResMut<ProjectilePool>`; the allocator is the single
//! writer that pops from it and the commit is the single writer that pushes.

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod messages;
pub mod motion;
pub mod pool;


use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::health::HealthSet;
use crate::plugins::scene::SceneSet;

pub use components::{Faction, Projectile, ProjectileState};
pub use messages::SpawnProjectileRequest;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let capacity = app
            .world()
            .get_resource::<Tunables>()
            .map_or(Tunables::default().projectile_pool_capacity, |t| {
                t.projectile_pool_capacity
            });

        app.insert_resource(pool::ProjectilePool::new(capacity))
            .add_message::<SpawnProjectileRequest>()
            .add_systems(Startup, pool::init_projectile_pool);

        app.add_systems(
            PostUpdate,
            allocator::allocate_projectiles_from_pool.run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedUpdate,
            (motion::drive_projectiles, motion::expire_projectiles)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedPostUpdate,
            (
                (
                    collision::process_projectile_collisions,
                    collision::resolve_deferred_contacts,
                )
                    .chain()
                    .after(CollisionEventSystems)
                    .before(HealthSet::Apply),
                commit::return_to_pool_commit,
            )
                .chain()
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(Update, commit::recall_all_on_reset.in_set(SceneSet::Reset));
    }
}
