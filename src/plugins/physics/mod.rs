//! Physics plugin: avian2d in pixel units with downward gravity from [`Tunables`].

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let tunables = app.world().resource::<Tunables>();
    let ppm = tunables.pixels_per_meter;
    let gravity = gravity_from(tunables);
    app.add_plugins(PhysicsPlugins::default().with_length_unit(ppm));
    app.insert_resource(gravity);
}

#[inline]
pub fn gravity_from(tunables: &Tunables) -> Gravity {
    Gravity(Vec2::NEG_Y * tunables.gravity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_points_down_in_pixels() {
        let t = Tunables {
            gravity: 900.0,
            ..default()
        };
        assert_eq!(gravity_from(&t).0, Vec2::new(0.0, -900.0));
    }
}
