use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
    let step = app.world().resource::<Time<Fixed>>().timestep();
    assert!((step.as_secs_f64() - 1.0 / core::FIXED_HZ).abs() < 1e-6);
}

#[test]
fn keeps_preseeded_tunables() {
    let mut app = App::new();
    app.insert_resource(Tunables {
        projectile_pool_capacity: 4,
        ..default()
    });
    core::plugin(&mut app);
    assert_eq!(app.world().resource::<Tunables>().projectile_pool_capacity, 4);
}
