//! Sensing seam: ray casts and overlap tests.
//!
//! Gameplay logic (line of sight, ground probes) only talks to [`Sensing`].
//! The live implementation forwards to Avian's `SpatialQuery`; tests supply
//! an in-memory world of segments.

use avian2d::prelude::*;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec2,
}

pub trait Sensing {
    /// First hit along `direction` (need not be normalized) within `max_distance`.
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit>;
}

impl Sensing for SpatialQuery<'_, '_> {
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let Ok(dir) = Dir2::new(direction) else {
            return None;
        };
        let filter = SpatialQueryFilter::from_mask(mask);
        self.cast_ray(origin, dir, max_distance, true, &filter)
            .map(|hit| RayHit {
                entity: hit.entity,
                distance: hit.distance,
                point: origin + *dir * hit.distance,
            })
    }
}

/// Line of sight from `from` to `to` over obstacle layers in `mask`.
///
/// Clear when nothing is hit, or the first hit lies at or beyond the target.
pub fn line_of_sight(sensing: &impl Sensing, from: Vec2, to: Vec2, mask: LayerMask) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return true;
    }
    match sensing.raycast(from, delta, distance, mask) {
        None => true,
        Some(hit) => hit.distance >= distance - 0.01,
    }
}

/// In-memory sensing used by tests: walls are line segments, everything else is empty space.
#[cfg(test)]
#[derive(Default)]
pub struct SegmentWorld {
    pub walls: Vec<(Vec2, Vec2)>,
}

#[cfg(test)]
impl SegmentWorld {
    pub fn with_wall(mut self, a: Vec2, b: Vec2) -> Self {
        self.walls.push((a, b));
        self
    }

    /// Horizontal floor at height `y` spanning `x0..x1`.
    pub fn with_floor(self, y: f32, x0: f32, x1: f32) -> Self {
        self.with_wall(Vec2::new(x0, y), Vec2::new(x1, y))
    }
}

#[cfg(test)]
impl Sensing for SegmentWorld {
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, _mask: LayerMask) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        let mut best: Option<f32> = None;
        for &(a, b) in &self.walls {
            let seg = b - a;
            let denom = dir.perp_dot(seg);
            if denom.abs() < 1e-6 {
                continue;
            }
            let ao = a - origin;
            let t = ao.perp_dot(seg) / denom;
            let u = ao.perp_dot(dir) / denom;
            if (0.0..=max_distance).contains(&t) && (0.0..=1.0).contains(&u) {
                best = Some(best.map_or(t, |cur: f32| cur.min(t)));
            }
        }
        best.map(|t| RayHit {
            entity: Entity::PLACEHOLDER,
            distance: t,
            point: origin + dir * t,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::layers::obstacle_mask;

    #[test]
    fn wall_between_points_blocks_sight() {
        let world = SegmentWorld::default().with_wall(Vec2::new(5.0, -10.0), Vec2::new(5.0, 10.0));
        assert!(!line_of_sight(&world, Vec2::ZERO, Vec2::new(10.0, 0.0), obstacle_mask()));
        assert!(line_of_sight(&world, Vec2::ZERO, Vec2::new(4.0, 0.0), obstacle_mask()));
    }

    #[test]
    fn empty_world_has_clear_sight() {
        let world = SegmentWorld::default();
        assert!(line_of_sight(&world, Vec2::ZERO, Vec2::new(100.0, 50.0), obstacle_mask()));
    }
}
