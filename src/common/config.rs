//! Static per-entity configuration.
//!
//! Both configs deserialize with `#[serde(default)]` so rosters can be written
//! as data that only names the fields it overrides. Values are in pixels and
//! seconds.
//!
//! Invalid values are a recoverable condition: `validated()` logs the problem
//! and repairs the config to the nearest safe value instead of refusing to spawn.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("max_health must be at least 1, got {0}")]
    NoHealth(i32),
    #[error("lose_player_range ({lose}) is shorter than detection_range ({detect})")]
    LoseRangeTooShort { lose: f32, detect: f32 },
    #[error("fire_rate must be positive, got {0}")]
    FireRate(f32),
    #[error("max_ammo must be at least 1")]
    NoAmmo,
    #[error("rearm_velocity_threshold must not be positive, got {0}")]
    RisingRearm(f32),
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 || value.is_nan() {
        Err(ConfigError::Negative { field, value })
    } else {
        Ok(())
    }
}

#[inline]
fn repair_non_negative(v: &mut f32) {
    if v.is_nan() {
        *v = 0.0;
    } else {
        *v = v.max(0.0);
    }
}

// -----------------------------------------------------------------------------
// Enemy
// -----------------------------------------------------------------------------

/// Behavioural category constraining an enemy's locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianType {
    #[default]
    Patrol,
    Stationary,
    Flying,
    Ground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    #[default]
    Standard,
    /// Ceiling-mounted turret: always stationary and shoot-only.
    Barnacle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolOrder {
    #[default]
    Sequential,
    Random,
}

/// Capability flags gating the state machine's transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub can_patrol: bool,
    pub can_chase: bool,
    pub can_attack: bool,
    pub can_shoot: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            can_patrol: true,
            can_chase: true,
            can_attack: true,
            can_shoot: false,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub move_speed: f32,
    pub chase_speed: f32,
    pub patrol_speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub shoot_range: f32,
    pub lose_player_range: f32,
    pub attack_cooldown: f32,
    pub shoot_cooldown: f32,
    pub attack_damage: i32,
    pub bullet_damage: i32,
    pub bullet_speed: f32,
    pub max_health: i32,
    pub one_hit_kill_mode: bool,
    pub invulnerability_window: f32,
    pub guardian_type: GuardianType,
    pub kind: EnemyKind,
    pub guard_radius: f32,
    pub stay_in_guard_area: bool,
    pub return_when_lost: bool,
    pub capabilities: Capabilities,
    pub patrol_order: PatrolOrder,
    /// Pause at each waypoint before moving on.
    pub patrol_wait: f32,
    pub waypoint_tolerance: f32,
    /// How long the enemy holds `Alert` before committing to a reaction.
    pub alert_duration: f32,
    /// Continuous absence needed before a detected player counts as lost.
    pub lose_grace: f32,
    /// Stun applied when a hit lands; zero disables it.
    pub hit_stun: f32,
    /// Speed multiplier for flying guardians.
    pub flying_speed_factor: f32,
    /// Damage dealt to the player on body contact; zero disables it.
    pub touch_damage: i32,
    pub touch_cooldown: f32,
    pub touch_knockback: f32,
    /// Length of the fade-out after death.
    pub dying_time: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            move_speed: 90.0,
            chase_speed: 150.0,
            patrol_speed: 70.0,
            detection_range: 260.0,
            attack_range: 40.0,
            shoot_range: 0.0,
            lose_player_range: 340.0,
            attack_cooldown: 1.0,
            shoot_cooldown: 1.4,
            attack_damage: 1,
            bullet_damage: 1,
            bullet_speed: 420.0,
            max_health: 3,
            one_hit_kill_mode: false,
            invulnerability_window: 0.1,
            guardian_type: GuardianType::Patrol,
            kind: EnemyKind::Standard,
            guard_radius: 320.0,
            stay_in_guard_area: false,
            return_when_lost: true,
            capabilities: Capabilities::default(),
            patrol_order: PatrolOrder::Sequential,
            patrol_wait: 0.8,
            waypoint_tolerance: 6.0,
            alert_duration: 0.5,
            lose_grace: 2.0,
            hit_stun: 0.0,
            flying_speed_factor: 0.6,
            touch_damage: 0,
            touch_cooldown: 1.0,
            touch_knockback: 260.0,
            dying_time: 0.35,
        }
    }
}

impl EnemyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("move_speed", self.move_speed),
            ("chase_speed", self.chase_speed),
            ("patrol_speed", self.patrol_speed),
            ("detection_range", self.detection_range),
            ("attack_range", self.attack_range),
            ("shoot_range", self.shoot_range),
            ("attack_cooldown", self.attack_cooldown),
            ("shoot_cooldown", self.shoot_cooldown),
            ("guard_radius", self.guard_radius),
            ("lose_grace", self.lose_grace),
            ("invulnerability_window", self.invulnerability_window),
            ("patrol_wait", self.patrol_wait),
            ("waypoint_tolerance", self.waypoint_tolerance),
            ("alert_duration", self.alert_duration),
            ("hit_stun", self.hit_stun),
            ("flying_speed_factor", self.flying_speed_factor),
            ("touch_cooldown", self.touch_cooldown),
            ("dying_time", self.dying_time),
        ] {
            non_negative(field, value)?;
        }
        if self.max_health < 1 {
            return Err(ConfigError::NoHealth(self.max_health));
        }
        if self.lose_player_range < self.detection_range {
            return Err(ConfigError::LoseRangeTooShort {
                lose: self.lose_player_range,
                detect: self.detection_range,
            });
        }
        Ok(())
    }

    /// Validate and repair, logging what was wrong.
    pub fn validated(mut self, name: &str) -> Self {
        if let Err(e) = self.validate() {
            warn!("enemy config `{name}` invalid ({e}); repairing");
            self.repair();
        }
        self
    }

    fn repair(&mut self) {
        for v in [
            &mut self.move_speed,
            &mut self.chase_speed,
            &mut self.patrol_speed,
            &mut self.detection_range,
            &mut self.attack_range,
            &mut self.shoot_range,
            &mut self.attack_cooldown,
            &mut self.shoot_cooldown,
            &mut self.guard_radius,
            &mut self.lose_grace,
            &mut self.invulnerability_window,
            &mut self.patrol_wait,
            &mut self.waypoint_tolerance,
            &mut self.alert_duration,
            &mut self.hit_stun,
            &mut self.flying_speed_factor,
            &mut self.touch_cooldown,
            &mut self.dying_time,
        ] {
            repair_non_negative(v);
        }
        self.max_health = self.max_health.max(1);
        self.lose_player_range = self.lose_player_range.max(self.detection_range);
    }

    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.guardian_type == GuardianType::Stationary || self.kind == EnemyKind::Barnacle
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.guardian_type == GuardianType::Flying && !self.is_stationary()
    }

    /// Area guardians refuse to engage a player standing outside their guard circle.
    #[inline]
    pub fn is_area_guardian(&self) -> bool {
        self.stay_in_guard_area && self.guardian_type != GuardianType::Patrol
    }

    /// Capabilities after guardian type, enemy kind, route and ranges are applied.
    pub fn effective_capabilities(&self, has_patrol_route: bool) -> Capabilities {
        let mut caps = self.capabilities;
        if self.is_stationary() {
            caps.can_patrol = false;
            caps.can_chase = false;
        }
        if self.kind == EnemyKind::Barnacle {
            caps.can_attack = false;
            caps.can_shoot = true;
        }
        if !has_patrol_route {
            caps.can_patrol = false;
        }
        if self.attack_range <= 0.0 {
            caps.can_attack = false;
        }
        if self.shoot_range <= 0.0 {
            caps.can_shoot = false;
        }
        caps
    }

    /// Scale a locomotion speed for the guardian type.
    #[inline]
    pub fn scaled_speed(&self, speed: f32) -> f32 {
        if self.is_flying() {
            speed * self.flying_speed_factor
        } else {
            speed
        }
    }
}

// -----------------------------------------------------------------------------
// Player
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    /// One shot per trigger press.
    #[default]
    Single,
    /// Keeps firing while the trigger is held.
    Auto,
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub max_health: i32,
    pub one_hit_kill_mode: bool,
    pub invulnerability_window: f32,
    pub max_ammo: u32,
    /// Shots per second.
    pub fire_rate: f32,
    pub reload_time: f32,
    pub fire_mode: FireMode,
    pub bullet_damage: i32,
    pub bullet_speed: f32,
    pub piercing: bool,
    pub max_hits: u32,
    /// Ground contact only re-arms the jump while vertical velocity is at most
    /// this. Must not be positive.
    pub rearm_velocity_threshold: f32,
    /// Horizontal offset of the two side ground probes.
    pub probe_spread: f32,
    /// Ray length below the feet for ground probes.
    pub probe_length: f32,
    pub half_height: f32,
    /// Minimum time the airborne frame stays on screen after leaving the ground.
    pub airborne_hold: f32,
    /// Time per walk frame.
    pub walk_frame_time: f32,
    /// Delay between death and the game-over request.
    pub game_over_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 260.0,
            jump_speed: 620.0,
            max_health: 5,
            one_hit_kill_mode: false,
            invulnerability_window: 1.0,
            max_ammo: 8,
            fire_rate: 6.0,
            reload_time: 1.2,
            fire_mode: FireMode::Single,
            bullet_damage: 1,
            bullet_speed: 900.0,
            piercing: false,
            max_hits: 1,
            rearm_velocity_threshold: 0.0,
            probe_spread: 10.0,
            probe_length: 4.0,
            half_height: 16.0,
            airborne_hold: 0.12,
            walk_frame_time: 0.15,
            game_over_delay: 1.5,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("move_speed", self.move_speed),
            ("jump_speed", self.jump_speed),
            ("reload_time", self.reload_time),
            ("probe_length", self.probe_length),
            ("invulnerability_window", self.invulnerability_window),
            ("airborne_hold", self.airborne_hold),
            ("walk_frame_time", self.walk_frame_time),
            ("game_over_delay", self.game_over_delay),
        ] {
            non_negative(field, value)?;
        }
        if self.max_health < 1 {
            return Err(ConfigError::NoHealth(self.max_health));
        }
        if self.max_ammo == 0 {
            return Err(ConfigError::NoAmmo);
        }
        if !(self.fire_rate > 0.0) {
            return Err(ConfigError::FireRate(self.fire_rate));
        }
        if !(self.rearm_velocity_threshold <= 0.0) {
            return Err(ConfigError::RisingRearm(self.rearm_velocity_threshold));
        }
        Ok(())
    }

    pub fn validated(mut self) -> Self {
        if let Err(e) = self.validate() {
            warn!("player config invalid ({e}); repairing");
            let fallback = Self::default();
            for v in [
                &mut self.move_speed,
                &mut self.jump_speed,
                &mut self.reload_time,
                &mut self.probe_length,
                &mut self.invulnerability_window,
                &mut self.airborne_hold,
                &mut self.walk_frame_time,
                &mut self.game_over_delay,
            ] {
                repair_non_negative(v);
            }
            self.max_health = self.max_health.max(1);
            self.max_ammo = self.max_ammo.max(1);
            if !(self.fire_rate > 0.0) {
                self.fire_rate = fallback.fire_rate;
            }
            if !(self.rearm_velocity_threshold <= 0.0) {
                self.rearm_velocity_threshold = fallback.rearm_velocity_threshold;
            }
        }
        self
    }

    /// Piercing shots may register up to `max_hits`; everything else stops at one.
    #[inline]
    pub fn effective_max_hits(&self) -> u32 {
        if self.piercing { self.max_hits.max(1) } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barnacle_is_stationary_and_shoot_only() {
        let cfg = EnemyConfig {
            kind: EnemyKind::Barnacle,
            guardian_type: GuardianType::Ground,
            shoot_range: 200.0,
            ..default()
        };
        let caps = cfg.effective_capabilities(true);
        assert!(cfg.is_stationary());
        assert!(!caps.can_patrol && !caps.can_chase && !caps.can_attack);
        assert!(caps.can_shoot);
    }

    #[test]
    fn missing_route_disables_patrol() {
        let caps = EnemyConfig::default().effective_capabilities(false);
        assert!(!caps.can_patrol);
        assert!(caps.can_chase);
    }

    #[test]
    fn lose_range_shorter_than_detection_is_repaired() {
        let cfg = EnemyConfig {
            detection_range: 300.0,
            lose_player_range: 100.0,
            ..default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::LoseRangeTooShort { lose: 100.0, detect: 300.0 })
        );
        let fixed = cfg.validated("test");
        assert_eq!(fixed.lose_player_range, 300.0);
        assert!(fixed.validate().is_ok());
    }

    #[test]
    fn negative_or_nan_durations_are_repaired() {
        let cfg = EnemyConfig {
            dying_time: -1.0,
            patrol_wait: f32::NAN,
            ..default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative { field: "patrol_wait", .. })
        ));

        let fixed = cfg.validated("test");
        assert_eq!(fixed.dying_time, 0.0);
        assert_eq!(fixed.patrol_wait, 0.0);
        assert!(fixed.validate().is_ok());
        // A repaired fade length is safe to build a timer from.
        let _ = Timer::from_seconds(fixed.dying_time, TimerMode::Once);

        let player = PlayerConfig {
            game_over_delay: -0.5,
            ..default()
        };
        assert!(player.validate().is_err());
        assert_eq!(player.validated().game_over_delay, 0.0);
    }

    #[test]
    fn rearm_threshold_never_allows_rising_contact() {
        let cfg = PlayerConfig {
            rearm_velocity_threshold: 5.0,
            ..default()
        };
        assert!(cfg.validate().is_err());
        assert_eq!(cfg.validated().rearm_velocity_threshold, 0.0);
        assert!(PlayerConfig::default().rearm_velocity_threshold <= 0.0);
    }

    #[test]
    fn zero_fire_rate_falls_back_to_default() {
        let cfg = PlayerConfig { fire_rate: 0.0, ..default() }.validated();
        assert_eq!(cfg.fire_rate, PlayerConfig::default().fire_rate);
    }

    #[test]
    fn enemy_config_reads_partial_json() {
        let cfg: EnemyConfig = serde_json::from_str(
            r#"{ "guardian_type": "flying", "detection_range": 5.0, "lose_player_range": 8.0 }"#,
        )
        .expect("valid json");
        assert_eq!(cfg.guardian_type, GuardianType::Flying);
        assert_eq!(cfg.detection_range, 5.0);
        assert_eq!(cfg.attack_range, EnemyConfig::default().attack_range);
        assert!(cfg.is_flying());
    }

    #[test]
    fn non_piercing_shots_stop_at_one_hit() {
        let cfg = PlayerConfig { piercing: false, max_hits: 5, ..default() };
        assert_eq!(cfg.effective_max_hits(), 1);
        let cfg = PlayerConfig { piercing: true, max_hits: 3, ..default() };
        assert_eq!(cfg.effective_max_hits(), 3);
    }
}
