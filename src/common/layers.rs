//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    PlayerBullet,
    EnemyBullet,
    Hazard,
}

/// Layers that block line of sight and ground probes.
#[inline]
pub fn obstacle_mask() -> LayerMask {
    LayerMask::from(Layer::World)
}
