use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimState {
    #[default]
    Idle,
    /// Two-frame walk cycle.
    Walk { frame: u8 },
    Airborne,
    Duck,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnimInput {
    pub ducking: bool,
    pub grounded: bool,
    pub moving: bool,
}

/// Priority: duck, airborne, walk, idle.
///
/// Airborne is held for at least `airborne_hold` seconds once entered, so a
/// single-step loss of ground contact does not flicker.
#[derive(Component, Debug, Clone, Default)]
pub struct PlayerAnimation {
    state: AnimState,
    airborne_remaining: f32,
    walk_clock: f32,
    frame: u8,
}

impl PlayerAnimation {
    #[inline]
    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn update(&mut self, input: AnimInput, airborne_hold: f32, frame_time: f32, dt: f32) -> AnimState {
        if !input.grounded && self.state != AnimState::Airborne {
            self.airborne_remaining = airborne_hold;
        } else {
            self.airborne_remaining = (self.airborne_remaining - dt).max(0.0);
        }

        self.state = if input.ducking {
            self.airborne_remaining = 0.0;
            AnimState::Duck
        } else if !input.grounded || self.airborne_remaining > 0.0 {
            AnimState::Airborne
        } else if input.moving {
            self.walk_clock += dt;
            if frame_time > 0.0 {
                while self.walk_clock >= frame_time {
                    self.walk_clock -= frame_time;
                    self.frame ^= 1;
                }
            }
            AnimState::Walk { frame: self.frame }
        } else {
            AnimState::Idle
        };

        if !matches!(self.state, AnimState::Walk { .. }) {
            self.walk_clock = 0.0;
            self.frame = 0;
        }
        self.state
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Sprite size for a state; ducking squashes, the walk frames bob.
pub fn sprite_size(state: AnimState, base: Vec2) -> Vec2 {
    match state {
        AnimState::Duck => Vec2::new(base.x * 1.15, base.y * 0.6),
        AnimState::Airborne => Vec2::new(base.x * 0.9, base.y * 1.1),
        AnimState::Walk { frame: 1 } => Vec2::new(base.x, base.y * 0.95),
        _ => base,
    }
}
