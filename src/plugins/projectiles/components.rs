use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

use super::messages::SpawnProjectileRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    #[inline]
    pub fn projectile_layer(self) -> Layer {
        match self {
            Self::Player => Layer::PlayerBullet,
            Self::Enemy => Layer::EnemyBullet,
        }
    }

    /// The layer this faction's shots are allowed to damage.
    #[inline]
    pub fn target_layer(self) -> Layer {
        match self {
            Self::Player => Layer::Enemy,
            Self::Enemy => Layer::Player,
        }
    }
}

#[derive(Component)]
pub struct PooledProjectile;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

/// What the other side of a contact is, from the projectile's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Member of the opposing faction's layer.
    Target,
    /// Level geometry.
    Obstacle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Ignored,
    /// Damage lands; `destroy` once the hit budget is spent.
    Hit { destroy: bool },
    /// Stopped by an obstacle without dealing damage.
    Blocked,
}

/// Invariant: `hits <= max_hits`, and `max_hits == 1` unless piercing.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub faction: Faction,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub lifetime_remaining: f32,
    pub piercing: bool,
    pub max_hits: u32,
    pub hits: u32,
    pub shooter: Option<Entity>,
    pub spawn_position: Vec2,
    /// Seconds since fired.
    pub age: f32,
    /// `(collider, owner)` contacts skipped by the spawn grace, rechecked once it ends.
    pub deferred: Vec<(Entity, Entity)>,
}

impl Projectile {
    pub fn idle() -> Self {
        Self {
            faction: Faction::Player,
            direction: Vec2::X,
            speed: 0.0,
            damage: 0,
            lifetime_remaining: 0.0,
            piercing: false,
            max_hits: 1,
            hits: 0,
            shooter: None,
            spawn_position: Vec2::ZERO,
            age: 0.0,
            deferred: Vec::new(),
        }
    }

    /// Re-arm a pooled projectile for a new shot.
    pub fn fire(&mut self, req: &SpawnProjectileRequest, spawn_position: Vec2) {
        self.faction = req.faction;
        self.direction = req.direction.try_normalize().unwrap_or(Vec2::X);
        self.speed = req.speed;
        self.damage = req.damage;
        self.lifetime_remaining = req.lifetime;
        self.piercing = req.piercing;
        self.max_hits = if req.piercing { req.max_hits.max(1) } else { 1 };
        self.hits = 0;
        self.shooter = req.shooter;
        self.spawn_position = spawn_position;
        self.age = 0.0;
        self.deferred.clear();
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Advance age and lifetime. Returns true once expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.lifetime_remaining -= dt;
        self.lifetime_remaining <= 0.0
    }

    /// Contacts close to the muzzle right after firing are ignored.
    #[inline]
    pub fn in_spawn_grace(&self, contact_position: Vec2, radius: f32, time: f32) -> bool {
        self.age < time && contact_position.distance(self.spawn_position) <= radius
    }

    pub fn defer(&mut self, collider: Entity, owner: Entity) {
        if !self.deferred.contains(&(collider, owner)) {
            self.deferred.push((collider, owner));
        }
    }

    pub fn resolve(&mut self, contact: ContactKind) -> HitOutcome {
        match contact {
            ContactKind::Target => {
                if self.hits >= self.max_hits {
                    return HitOutcome::Ignored;
                }
                self.hits += 1;
                HitOutcome::Hit {
                    destroy: !self.piercing || self.hits >= self.max_hits,
                }
            }
            ContactKind::Obstacle => HitOutcome::Blocked,
            ContactKind::Other => HitOutcome::Ignored,
        }
    }
}

/// Classify a contact by the other collider's layer membership.
pub fn classify(faction: Faction, other: &CollisionLayers) -> ContactKind {
    if other.memberships.has_all(faction.target_layer()) {
        ContactKind::Target
    } else if other.memberships.has_all(Layer::World) {
        ContactKind::Obstacle
    } else {
        ContactKind::Other
    }
}
