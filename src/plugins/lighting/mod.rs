//! Lighting plugin (Firefly) (render-only).
//!
//! The player carries a point light whose colour drains from warm white to red
//! as health drops.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::plugins::health::{Health, HealthChanged};
use crate::plugins::player::Player;

#[derive(Component)]
pub struct PlayerLight;

const HEALTHY: Vec3 = Vec3::new(1.0, 0.9, 0.75);
const CRITICAL: Vec3 = Vec3::new(0.9, 0.15, 0.1);

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(Startup, setup)
        .add_systems(Update, (follow_player_light, tint_player_light));
}

/// Light colour for a health fraction in `0..=1`.
pub fn health_tint(fraction: f32) -> Color {
    let c = CRITICAL.lerp(HEALTHY, fraction.clamp(0.0, 1.0));
    Color::srgb(c.x, c.y, c.z)
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: health_tint(1.0),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
    ));
}

fn follow_player_light(
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<&mut Transform, (With<PlayerLight>, Without<Player>)>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}

fn tint_player_light(
    mut changes: MessageReader<HealthChanged>,
    q_player: Query<&Health, With<Player>>,
    mut q_light: Query<&mut PointLight2d, With<PlayerLight>>,
) {
    let Some(health) = changes.read().filter_map(|c| q_player.get(c.entity).ok()).last() else {
        return;
    };
    let Ok(mut light) = q_light.single_mut() else {
        return;
    };
    light.color = health_tint(health.fraction());
}
