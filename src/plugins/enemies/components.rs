use bevy::prelude::*;

#[derive(Component)]
pub struct Enemy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Patrol,
    Alert,
    Chase,
    Attack,
    Shoot,
    Return,
    Stunned,
    /// Terminal until a scene reset.
    Death,
}

#[derive(Component, Debug, Clone, Default)]
pub struct PatrolRoute {
    pub points: Vec<Vec2>,
}

impl PatrolRoute {
    pub fn new(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// What the agent perceived this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Senses {
    pub player_position: Option<Vec2>,
    pub distance: f32,
    pub line_of_sight: bool,
    pub in_attack_range: bool,
    pub in_shoot_range: bool,
    /// Always true for agents not bound to a guard area.
    pub player_in_guard_area: bool,
}

/// Detection memory carried across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Detection {
    pub detected: bool,
    /// Continuous time the player has been out of range or out of sight.
    pub lost_timer: f32,
    pub last_known: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionEvent {
    Detected,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Action {
    #[default]
    None,
    Melee,
    Shoot {
        target: Vec2,
    },
}

/// Output of one decision tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// `None` means hold position.
    pub move_target: Option<Vec2>,
    pub speed: f32,
    pub action: Action,
}

/// Death presentation lifecycle.
///
/// - Alive: normal gameplay.
/// - Dying: short fade.
/// - Dormant: hidden and non-interacting until a restart revives it.
#[derive(Component, Debug, Clone, Default)]
pub enum EnemyLife {
    #[default]
    Alive,
    Dying {
        timer: Timer,
    },
    Dormant,
}
