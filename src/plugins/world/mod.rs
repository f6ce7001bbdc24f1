//! World plugin: arena geometry and static hazards.
//!
//! Everything solid lives on `Layer::World`, which is what ground probes and
//! line-of-sight rays test against, and carries a light occluder so shadows
//! agree with what enemies can see.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_firefly::prelude::Occluder2d;

use crate::common::layers::Layer;
use crate::plugins::hazards::ContactDamage;

pub const HALF_W: f32 = 640.0;
pub const FLOOR_TOP: f32 = -200.0;
pub const CEILING_BOTTOM: f32 = 265.0;
const THICKNESS: f32 = 30.0;

/// An axis-aligned solid block.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub name: &'static str,
    pub center: Vec2,
    pub size: Vec2,
}

impl Block {
    const fn new(name: &'static str, center: Vec2, size: Vec2) -> Self {
        Self { name, center, size }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.size.y * 0.5
    }

    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        (x - self.center.x).abs() <= self.size.x * 0.5
    }
}

pub fn blocks() -> Vec<Block> {
    let width = HALF_W * 2.0 + THICKNESS * 2.0;
    let height = CEILING_BOTTOM - FLOOR_TOP;
    let mid_y = (CEILING_BOTTOM + FLOOR_TOP) * 0.5;
    vec![
        Block::new(
            "WallFloor",
            Vec2::new(0.0, FLOOR_TOP - THICKNESS * 0.5),
            Vec2::new(width, THICKNESS),
        ),
        Block::new(
            "WallCeiling",
            Vec2::new(0.0, CEILING_BOTTOM + THICKNESS * 0.5),
            Vec2::new(width, THICKNESS),
        ),
        Block::new(
            "WallLeft",
            Vec2::new(-HALF_W - THICKNESS * 0.5, mid_y),
            Vec2::new(THICKNESS, height),
        ),
        Block::new(
            "WallRight",
            Vec2::new(HALF_W + THICKNESS * 0.5, mid_y),
            Vec2::new(THICKNESS, height),
        ),
        Block::new("PlatformLow", Vec2::new(-200.0, -90.0), Vec2::new(160.0, 20.0)),
        Block::new("PlatformTurret", Vec2::new(360.0, 30.0), Vec2::new(140.0, 20.0)),
        Block::new("Pillar", Vec2::new(120.0, FLOOR_TOP + 50.0), Vec2::new(30.0, 100.0)),
    ]
}

/// Spike strip on the floor.
pub const SPIKES: Block = Block::new("Spikes", Vec2::new(230.0, FLOOR_TOP + 6.0), Vec2::new(60.0, 12.0));

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, (spawn_arena, spawn_hazards));
}

fn world_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::World,
        [
            Layer::Player,
            Layer::Enemy,
            Layer::PlayerBullet,
            Layer::EnemyBullet,
        ],
    )
}

fn spawn_arena(mut commands: Commands) {
    let color = Color::srgb(0.25, 0.27, 0.33);
    for block in blocks() {
        commands.spawn((
            Name::new(block.name),
            Sprite::from_color(color, block.size),
            Transform::from_translation(block.center.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(block.size.x, block.size.y),
            world_layers(),
            Occluder2d::rectangle(block.size.x, block.size.y),
        ));
    }
}

fn spawn_hazards(mut commands: Commands) {
    commands.spawn((
        Name::new(SPIKES.name),
        Sprite::from_color(Color::srgb(0.7, 0.15, 0.2), SPIKES.size),
        Transform::from_translation(SPIKES.center.extend(0.5)),
        RigidBody::Static,
        Sensor,
        Collider::rectangle(SPIKES.size.x, SPIKES.size.y),
        CollisionLayers::new(Layer::Hazard, [Layer::Player]),
        ContactDamage::new(1, 0.8, 380.0),
    ));
}
