//! The arena's enemy lineup, authored as config data.

use bevy::prelude::*;

use crate::common::config::{Capabilities, EnemyConfig, EnemyKind, GuardianType, PatrolOrder};
use crate::plugins::world::{CEILING_BOTTOM, FLOOR_TOP};

pub const ENEMY_SIZE: Vec2 = Vec2::splat(28.0);

pub struct EnemySpawn {
    pub name: &'static str,
    pub config: EnemyConfig,
    pub position: Vec2,
    pub route: Vec<Vec2>,
}

fn on_floor(x: f32) -> Vec2 {
    Vec2::new(x, FLOOR_TOP + ENEMY_SIZE.y * 0.5)
}

pub fn arena() -> Vec<EnemySpawn> {
    vec![
        EnemySpawn {
            name: "Patroller",
            config: EnemyConfig {
                touch_damage: 1,
                ..default()
            },
            position: on_floor(-80.0),
            route: vec![on_floor(-160.0), on_floor(40.0)],
        },
        EnemySpawn {
            name: "Turret",
            config: EnemyConfig {
                guardian_type: GuardianType::Stationary,
                shoot_range: 360.0,
                detection_range: 380.0,
                lose_player_range: 420.0,
                attack_range: 0.0,
                capabilities: Capabilities {
                    can_shoot: true,
                    ..default()
                },
                max_health: 4,
                ..default()
            },
            // Resting on the turret platform.
            position: Vec2::new(360.0, 40.0 + ENEMY_SIZE.y * 0.5),
            route: Vec::new(),
        },
        EnemySpawn {
            name: "Flyer",
            config: EnemyConfig {
                guardian_type: GuardianType::Flying,
                patrol_order: PatrolOrder::Random,
                capabilities: Capabilities {
                    can_shoot: true,
                    ..default()
                },
                shoot_range: 220.0,
                attack_range: 0.0,
                max_health: 2,
                ..default()
            },
            position: Vec2::new(0.0, 120.0),
            route: vec![
                Vec2::new(-120.0, 140.0),
                Vec2::new(80.0, 180.0),
                Vec2::new(200.0, 110.0),
            ],
        },
        EnemySpawn {
            name: "Barnacle",
            config: EnemyConfig {
                kind: EnemyKind::Barnacle,
                shoot_range: 260.0,
                shoot_cooldown: 2.0,
                bullet_speed: 300.0,
                one_hit_kill_mode: true,
                ..default()
            },
            position: Vec2::new(-40.0, CEILING_BOTTOM - ENEMY_SIZE.y * 0.5),
            route: Vec::new(),
        },
        EnemySpawn {
            name: "Warden",
            config: EnemyConfig {
                guardian_type: GuardianType::Ground,
                stay_in_guard_area: true,
                guard_radius: 180.0,
                chase_speed: 170.0,
                attack_damage: 2,
                max_health: 5,
                hit_stun: 0.25,
                ..default()
            },
            position: on_floor(420.0),
            route: Vec::new(),
        },
    ]
}
