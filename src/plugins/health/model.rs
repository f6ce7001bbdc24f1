//! Hit points, invulnerability windows and the death transition.
//!
//! One model serves both policies: multi-hit entities lose `amount` per hit,
//! one-hit-kill entities drop to zero on any accepted hit. Everything here is
//! plain data so it can be driven by a virtual clock in tests.

use std::time::Duration;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamagePolicy {
    #[default]
    MultiHit,
    OneHitKill,
}

impl DamagePolicy {
    #[inline]
    pub fn from_one_hit_kill(flag: bool) -> Self {
        if flag { Self::OneHitKill } else { Self::MultiHit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead, invulnerable, or a non-positive amount: nothing changed.
    Ignored,
    Damaged { current: i32, max: i32 },
    /// The hit that crossed to zero. Returned at most once per life.
    Killed { max: i32 },
}

/// Invariants:
/// - `0 <= current <= max`
/// - `dead == (current == 0)`
/// - once dead, only `reset` changes hit points.
#[derive(Component, Debug, Clone)]
pub struct Health {
    current: i32,
    max: i32,
    policy: DamagePolicy,
    invulnerable: bool,
    window: Duration,
    invulnerability_remaining: Duration,
    dead: bool,
    changed: bool,
}

impl Health {
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

    pub fn new(max: i32, policy: DamagePolicy) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            policy,
            invulnerable: false,
            window: Self::DEFAULT_WINDOW,
            invulnerability_remaining: Duration::ZERO,
            dead: false,
            changed: true,
        }
    }

    /// Length of the grace window opened by each accepted hit.
    pub fn with_invulnerability_window(mut self, secs: f32) -> Self {
        self.window = Duration::from_secs_f32(secs.max(0.0));
        self
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Remaining share of hit points in `0..=1`.
    #[inline]
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max.max(1) as f32
    }

    /// Manual flag or an open post-hit window.
    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable || !self.invulnerability_remaining.is_zero()
    }

    #[inline]
    pub fn invulnerability_remaining(&self) -> Duration {
        self.invulnerability_remaining
    }

    pub fn set_invulnerable(&mut self, active: bool) {
        self.invulnerable = active;
    }

    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead || amount <= 0 || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }

        self.current = match self.policy {
            DamagePolicy::OneHitKill => 0,
            DamagePolicy::MultiHit => (self.current - amount).max(0),
        };
        self.changed = true;

        if self.current == 0 {
            self.dead = true;
            self.invulnerability_remaining = Duration::ZERO;
            DamageOutcome::Killed { max: self.max }
        } else {
            self.invulnerability_remaining = self.window;
            DamageOutcome::Damaged {
                current: self.current,
                max: self.max,
            }
        }
    }

    /// Returns true when hit points actually went up.
    pub fn heal(&mut self, amount: i32) -> bool {
        if self.dead || amount <= 0 || self.policy == DamagePolicy::OneHitKill {
            return false;
        }
        let next = (self.current + amount).min(self.max);
        if next == self.current {
            return false;
        }
        self.current = next;
        self.changed = true;
        true
    }

    /// Full hit points, clears death and invulnerability. Safe on a live entity.
    pub fn reset(&mut self) {
        self.current = self.max;
        self.dead = false;
        self.invulnerable = false;
        self.invulnerability_remaining = Duration::ZERO;
        self.changed = true;
    }

    /// Advance the post-hit window.
    pub fn tick(&mut self, dt: Duration) {
        self.invulnerability_remaining = self.invulnerability_remaining.saturating_sub(dt);
    }

    /// Polled change notification: `(current, max)` once per mutation batch.
    pub fn take_changed(&mut self) -> Option<(i32, i32)> {
        if std::mem::take(&mut self.changed) {
            Some((self.current, self.max))
        } else {
            None
        }
    }
}
