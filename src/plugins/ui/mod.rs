//! HUD binding.
//!
//! The HUD never subscribes to gameplay. It polls [`HudSnapshot`], which is
//! refreshed from the player's components every frame and remembers whether
//! anything visible changed since the last read.

use bevy::prelude::*;

use crate::plugins::health::Health;
use crate::plugins::player::{Gun, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudView {
    /// `(current, max)`
    pub health: (i32, i32),
    /// `(in clip, clip size)`
    pub ammo: (u32, u32),
    pub reloading: bool,
}

#[derive(Resource, Debug, Default)]
pub struct HudSnapshot {
    view: HudView,
    changed: bool,
}

impl HudSnapshot {
    #[inline]
    pub fn view(&self) -> HudView {
        self.view
    }

    pub fn set(&mut self, view: HudView) {
        if self.view != view {
            self.view = view;
            self.changed = true;
        }
    }

    /// The view, once per change.
    pub fn take_changed(&mut self) -> Option<HudView> {
        std::mem::take(&mut self.changed).then_some(self.view)
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<HudSnapshot>()
        .add_systems(PostUpdate, refresh_hud)
        .add_systems(Last, report_hud);
}

pub fn refresh_hud(
    q_player: Query<(&Health, &Gun), With<Player>>,
    mut hud: ResMut<HudSnapshot>,
) {
    let Ok((health, gun)) = q_player.single() else {
        return;
    };
    hud.set(HudView {
        health: (health.current(), health.max()),
        ammo: (gun.ammo(), gun.max_ammo()),
        reloading: gun.is_reloading(),
    });
}

fn report_hud(mut hud: ResMut<HudSnapshot>) {
    if let Some(view) = hud.take_changed() {
        debug!(
            "hud: hp {}/{} ammo {}/{}{}",
            view.health.0,
            view.health.1,
            view.ammo.0,
            view.ammo.1,
            if view.reloading { " (reloading)" } else { "" }
        );
    }
}
