//! Enemy state machine.
//!
//! Guardian types are data, not subclasses: the machine reads the effective
//! capability flags resolved at spawn and gates every transition on them.
//! All timers are plain seconds ticked by the caller's `dt`.

use bevy::prelude::*;
use rand::Rng;

use crate::common::config::{Capabilities, EnemyConfig, PatrolOrder};

use super::components::{
    Action, Detection, DetectionEvent, EnemyState, Intent, PatrolRoute, Senses,
};

/// Invariant: once `state == Death`, no transition leaves it until [`EnemyAgent::reset`].
#[derive(Component, Debug, Clone)]
pub struct EnemyAgent {
    state: EnemyState,
    pub guard_center: Vec2,
    pub capabilities: Capabilities,
    pub detection: Detection,
    pub senses: Senses,
    pub patrol_index: usize,
    patrol_wait: f32,
    /// Seconds spent in the current state.
    state_time: f32,
    stun_remaining: f32,
    attack_cooldown: f32,
    shoot_cooldown: f32,
    pub intent: Intent,
    /// Set once a missing physics body has been reported.
    pub warned_no_body: bool,
}

impl EnemyAgent {
    pub fn new(cfg: &EnemyConfig, guard_center: Vec2, route: &PatrolRoute) -> Self {
        let capabilities = cfg.effective_capabilities(!route.is_empty());
        let initial_state = if cfg.is_stationary() || !capabilities.can_patrol {
            EnemyState::Idle
        } else {
            EnemyState::Patrol
        };
        Self {
            state: initial_state,
            guard_center,
            capabilities,
            detection: Detection::default(),
            senses: Senses::default(),
            patrol_index: 0,
            patrol_wait: 0.0,
            state_time: 0.0,
            stun_remaining: 0.0,
            attack_cooldown: 0.0,
            shoot_cooldown: 0.0,
            intent: Intent::default(),
            warned_no_body: false,
        }
    }

    #[inline]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Death
    }

    /// Returns false (and changes nothing) once dead.
    pub fn transition(&mut self, to: EnemyState) -> bool {
        if self.is_dead() {
            return false;
        }
        if self.state != to {
            debug!("enemy {:?} -> {:?}", self.state, to);
            self.state = to;
            self.state_time = 0.0;
        }
        true
    }

    /// Enter `Death` from any state. Idempotent: false if already dead.
    pub fn die(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.state = EnemyState::Death;
        self.state_time = 0.0;
        self.stun_remaining = 0.0;
        self.intent = Intent::default();
        true
    }

    pub fn stun(&mut self, duration: f32) {
        if duration <= 0.0 || self.is_dead() {
            return;
        }
        self.stun_remaining = self.stun_remaining.max(duration);
        self.transition(EnemyState::Stunned);
    }

    pub fn reset(&mut self, cfg: &EnemyConfig, guard_center: Vec2, route: &PatrolRoute) {
        *self = Self::new(cfg, guard_center, route);
    }

    /// React to a detection edge. Returns true when an alert cue should play.
    pub fn on_detection(&mut self, event: DetectionEvent) -> bool {
        match (event, self.state) {
            (DetectionEvent::Detected, EnemyState::Return) if self.capabilities.can_chase => {
                self.transition(EnemyState::Chase)
            }
            (DetectionEvent::Detected, EnemyState::Idle | EnemyState::Patrol | EnemyState::Return) => {
                self.transition(EnemyState::Alert)
            }
            _ => false,
        }
    }

    /// One decision tick. Detection must already be up to date.
    pub fn think(
        &mut self,
        cfg: &EnemyConfig,
        route: &PatrolRoute,
        position: Vec2,
        dt: f32,
        rng: &mut impl Rng,
    ) -> Intent {
        if self.is_dead() {
            self.intent = Intent::default();
            return self.intent;
        }

        self.state_time += dt;
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);

        let caps = self.capabilities;
        let detected = self.detection.detected;
        let s = self.senses;
        let mobile = !cfg.is_stationary();
        let can_melee = caps.can_attack && s.in_attack_range;
        let can_fire = caps.can_shoot && s.in_shoot_range && s.line_of_sight;

        let mut intent = Intent::default();

        match self.state {
            EnemyState::Idle => {
                if detected && can_melee {
                    self.transition(EnemyState::Attack);
                } else if detected && can_fire {
                    self.transition(EnemyState::Shoot);
                } else if detected && caps.can_chase && mobile {
                    self.transition(EnemyState::Chase);
                } else if !detected && caps.can_patrol && !route.is_empty() && mobile {
                    self.transition(EnemyState::Patrol);
                }
            }
            EnemyState::Patrol => {
                if detected && caps.can_chase && mobile {
                    self.transition(EnemyState::Chase);
                } else if let Some(&point) = route.points.get(self.patrol_index) {
                    if reached(position, point, cfg.is_flying(), cfg.waypoint_tolerance) {
                        self.patrol_wait += dt;
                        if self.patrol_wait >= cfg.patrol_wait {
                            self.patrol_wait = 0.0;
                            self.patrol_index = next_waypoint(self.patrol_index, route.points.len(), cfg.patrol_order, rng);
                        }
                    } else {
                        intent.move_target = Some(point);
                        intent.speed = cfg.patrol_speed;
                    }
                } else {
                    // Invalid route: fall back to idling in place.
                    self.patrol_index = 0;
                    self.transition(EnemyState::Idle);
                }
            }
            EnemyState::Alert => {
                if self.state_time >= cfg.alert_duration {
                    let next = if !detected {
                        EnemyState::Idle
                    } else if can_melee {
                        EnemyState::Attack
                    } else if can_fire {
                        EnemyState::Shoot
                    } else if caps.can_chase && mobile {
                        EnemyState::Chase
                    } else {
                        EnemyState::Idle
                    };
                    self.transition(next);
                }
            }
            EnemyState::Chase => {
                if cfg.is_area_guardian() && !s.player_in_guard_area {
                    self.transition(EnemyState::Return);
                } else if !detected {
                    self.transition(if cfg.return_when_lost {
                        EnemyState::Return
                    } else {
                        EnemyState::Idle
                    });
                } else if can_melee {
                    self.transition(EnemyState::Attack);
                } else if can_fire {
                    self.transition(EnemyState::Shoot);
                } else if let Some(target) = self.detection.last_known {
                    intent.move_target = Some(self.clamp_to_guard_area(cfg, target));
                    intent.speed = cfg.chase_speed;
                }
            }
            EnemyState::Attack => {
                if !s.in_attack_range || !caps.can_attack {
                    self.transition(if detected && mobile && caps.can_chase {
                        EnemyState::Chase
                    } else {
                        EnemyState::Idle
                    });
                } else if self.attack_cooldown <= 0.0 {
                    self.attack_cooldown = cfg.attack_cooldown;
                    intent.action = Action::Melee;
                }
            }
            EnemyState::Shoot => {
                if !detected {
                    self.transition(if mobile && caps.can_chase {
                        EnemyState::Chase
                    } else {
                        EnemyState::Idle
                    });
                } else if can_melee {
                    self.transition(EnemyState::Attack);
                } else if !s.in_shoot_range || !caps.can_shoot {
                    self.transition(if mobile && caps.can_chase {
                        EnemyState::Chase
                    } else {
                        EnemyState::Idle
                    });
                } else if self.shoot_cooldown <= 0.0 && s.line_of_sight {
                    if let Some(target) = s.player_position {
                        self.shoot_cooldown = cfg.shoot_cooldown;
                        intent.action = Action::Shoot { target };
                    }
                }
            }
            EnemyState::Return => {
                let home = self.return_target(route);
                if detected && caps.can_chase && mobile && s.player_in_guard_area {
                    self.transition(EnemyState::Chase);
                } else if reached(position, home, cfg.is_flying(), cfg.waypoint_tolerance) {
                    self.transition(if caps.can_patrol && !route.is_empty() {
                        EnemyState::Patrol
                    } else {
                        EnemyState::Idle
                    });
                } else {
                    intent.move_target = Some(home);
                    intent.speed = cfg.move_speed;
                }
            }
            EnemyState::Stunned => {
                self.stun_remaining -= dt;
                if self.stun_remaining <= 0.0 {
                    self.stun_remaining = 0.0;
                    self.transition(EnemyState::Idle);
                }
            }
            EnemyState::Death => {}
        }

        if !mobile {
            intent.move_target = None;
        }
        intent.speed = cfg.scaled_speed(intent.speed);
        self.intent = intent;
        intent
    }

    /// Patrollers return to the waypoint they left, everyone else to the guard center.
    fn return_target(&self, route: &PatrolRoute) -> Vec2 {
        if self.capabilities.can_patrol {
            route.points.get(self.patrol_index).copied().unwrap_or(self.guard_center)
        } else {
            self.guard_center
        }
    }

    fn clamp_to_guard_area(&self, cfg: &EnemyConfig, target: Vec2) -> Vec2 {
        if !cfg.is_area_guardian() {
            return target;
        }
        let offset = target - self.guard_center;
        self.guard_center + offset.clamp_length_max(cfg.guard_radius)
    }
}

/// Next waypoint index. Random order never repeats the current point when it can avoid it.
pub fn next_waypoint(current: usize, len: usize, order: PatrolOrder, rng: &mut impl Rng) -> usize {
    if len <= 1 {
        return 0;
    }
    match order {
        PatrolOrder::Sequential => (current + 1) % len,
        PatrolOrder::Random => {
            let pick = rng.gen_range(0..len - 1);
            if pick >= current { pick + 1 } else { pick }
        }
    }
}

/// Ground bodies only care about the horizontal gap.
#[inline]
pub fn reached(position: Vec2, target: Vec2, flying: bool, tolerance: f32) -> bool {
    if flying {
        position.distance(target) <= tolerance
    } else {
        (target.x - position.x).abs() <= tolerance
    }
}

/// Horizontal-only velocity for ground bodies, full 2D for flyers.
pub fn locomotion_velocity(intent: &Intent, position: Vec2, flying: bool, tolerance: f32) -> Vec2 {
    let Some(target) = intent.move_target else {
        return Vec2::ZERO;
    };
    if reached(position, target, flying, tolerance) {
        return Vec2::ZERO;
    }
    let delta = target - position;
    if flying {
        delta.normalize_or_zero() * intent.speed
    } else {
        Vec2::new(delta.x.signum() * intent.speed, 0.0)
    }
}
