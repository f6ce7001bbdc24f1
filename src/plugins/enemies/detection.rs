//! Range, line-of-sight and guard-area perception.
//!
//! Runs once per tick before any state transition is evaluated.

use bevy::prelude::*;

use crate::common::config::EnemyConfig;
use crate::common::layers::obstacle_mask;
use crate::common::sensing::{Sensing, line_of_sight};

use super::components::{Detection, DetectionEvent, Senses};

/// Perceive the player from `position`. `player` is `None` when there is no
/// valid target (absent or incapacitated).
pub fn sense(
    sensing: &impl Sensing,
    cfg: &EnemyConfig,
    position: Vec2,
    guard_center: Vec2,
    player: Option<Vec2>,
) -> Senses {
    let Some(target) = player else {
        return Senses {
            player_in_guard_area: true,
            ..default()
        };
    };

    let distance = position.distance(target);
    // No ray is cast past the furthest range anything cares about.
    let max_interest = cfg
        .detection_range
        .max(cfg.lose_player_range)
        .max(cfg.shoot_range)
        .max(cfg.attack_range);
    let line_of_sight =
        distance <= max_interest && line_of_sight(sensing, position, target, obstacle_mask());

    let player_in_guard_area =
        !cfg.is_area_guardian() || target.distance(guard_center) <= cfg.guard_radius;

    Senses {
        player_position: Some(target),
        distance,
        line_of_sight,
        in_attack_range: cfg.attack_range > 0.0 && distance <= cfg.attack_range,
        in_shoot_range: cfg.shoot_range > 0.0 && distance <= cfg.shoot_range,
        player_in_guard_area,
    }
}

/// Advance detection memory. Emits at most one event per tick.
pub fn update_detection(
    detection: &mut Detection,
    senses: &Senses,
    cfg: &EnemyConfig,
    dt: f32,
) -> Option<DetectionEvent> {
    // Leaving the guard area drops an area guardian's target immediately.
    if !senses.player_in_guard_area {
        return forget(detection);
    }

    let Some(target) = senses.player_position else {
        return tick_lost(detection, cfg, dt);
    };

    if !detection.detected {
        if senses.distance <= cfg.detection_range && senses.line_of_sight {
            detection.detected = true;
            detection.lost_timer = 0.0;
            detection.last_known = Some(target);
            return Some(DetectionEvent::Detected);
        }
        return None;
    }

    if senses.distance <= cfg.lose_player_range && senses.line_of_sight {
        detection.lost_timer = 0.0;
        detection.last_known = Some(target);
        None
    } else {
        tick_lost(detection, cfg, dt)
    }
}

fn tick_lost(detection: &mut Detection, cfg: &EnemyConfig, dt: f32) -> Option<DetectionEvent> {
    if !detection.detected {
        return None;
    }
    detection.lost_timer += dt;
    if detection.lost_timer >= cfg.lose_grace {
        forget(detection)
    } else {
        None
    }
}

fn forget(detection: &mut Detection) -> Option<DetectionEvent> {
    let was_detected = detection.detected;
    detection.detected = false;
    detection.lost_timer = 0.0;
    was_detected.then_some(DetectionEvent::Lost)
}
