//! Mascot wandering behaviour
//!
//! The mascot alternates between a rest phase (idle, or now and then a
//! sigh) and a walk in a random direction. Positions are the sprite's
//! top-left corner in overlay pixels and always keep the sprite inside the
//! area it roams.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::window::Rect;

/// Phases never last less than this, so zero durations cannot spin
const MIN_PHASE_SECS: f32 = 0.05;
/// Longer gaps between updates (suspend, debugger) are cut to this
const MAX_STEP_SECS: f32 = 0.25;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WanderConfig {
    /// Walking speed in pixels per second
    pub move_speed: f32,
    pub min_idle_secs: f32,
    pub max_idle_secs: f32,
    pub min_move_secs: f32,
    pub max_move_secs: f32,
    /// Chance that a walk also moves vertically
    pub change_y_chance: f64,
    /// Chance that a rest phase is a sigh instead of plain idling
    pub sigh_chance: f64,
    /// Length of the sigh animation
    pub sigh_secs: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            move_speed: 90.0,
            min_idle_secs: 1.0,
            max_idle_secs: 3.0,
            min_move_secs: 2.0,
            max_move_secs: 4.0,
            change_y_chance: 0.5,
            sigh_chance: 0.3,
            sigh_secs: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Sigh,
    Walk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    pub x: i32,
    pub y: i32,
    pub facing_left: bool,
    pub activity: Activity,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Rest { activity: Activity, remaining: f32 },
    Walk { dx: f32, dy: f32, remaining: f32 },
}

pub struct Wanderer<R: Rng> {
    config: WanderConfig,
    area: Rect,
    sprite: (u32, u32),
    x: f32,
    y: f32,
    facing_left: bool,
    phase: Phase,
    rng: R,
}

impl<R: Rng> Wanderer<R> {
    /// Start resting in the middle of `area`
    pub fn new(config: WanderConfig, area: Rect, sprite: (u32, u32), rng: R) -> Self {
        let x = area.left as f32 + (area.width() as f32 - sprite.0 as f32) / 2.0;
        let y = area.top as f32 + (area.height() as f32 - sprite.1 as f32) / 2.0;

        let mut wanderer = Self {
            config,
            area,
            sprite,
            x,
            y,
            facing_left: false,
            phase: Phase::Rest {
                activity: Activity::Idle,
                remaining: 0.0,
            },
            rng,
        };
        wanderer.clamp();
        wanderer.phase = wanderer.next_rest();
        wanderer
    }

    pub fn pose(&self) -> Pose {
        let activity = match self.phase {
            Phase::Rest { activity, .. } => activity,
            Phase::Walk { .. } => Activity::Walk,
        };
        Pose {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
            facing_left: self.facing_left,
            activity,
        }
    }

    /// Advance by `dt`. Time left over when a phase ends carries into the
    /// next one.
    pub fn update(&mut self, dt: Duration) -> Pose {
        let mut left = dt.as_secs_f32().min(MAX_STEP_SECS);

        loop {
            match &mut self.phase {
                Phase::Rest { remaining, .. } => {
                    if left < *remaining {
                        *remaining -= left;
                        break;
                    }
                    left -= *remaining;
                    self.phase = self.next_walk();
                }
                Phase::Walk { dx, dy, remaining } => {
                    let step = left.min(*remaining) * self.config.move_speed;
                    self.x += *dx * step;
                    self.y += *dy * step;
                    if left < *remaining {
                        *remaining -= left;
                        self.clamp();
                        break;
                    }
                    left -= *remaining;
                    self.clamp();
                    self.phase = self.next_rest();
                }
            }
        }

        self.pose()
    }

    fn next_rest(&mut self) -> Phase {
        if self.rng.gen_bool(probability(self.config.sigh_chance)) {
            Phase::Rest {
                activity: Activity::Sigh,
                remaining: self.config.sigh_secs.max(MIN_PHASE_SECS),
            }
        } else {
            let idle = self.duration(self.config.min_idle_secs, self.config.max_idle_secs);
            Phase::Rest {
                activity: Activity::Idle,
                remaining: idle,
            }
        }
    }

    fn next_walk(&mut self) -> Phase {
        let x_dir: f32 = if self.rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        let y_dir: f32 = if self.rng.gen_bool(probability(self.config.change_y_chance)) {
            if self.rng.gen_bool(0.5) {
                -1.0
            } else {
                1.0
            }
        } else {
            0.0
        };
        self.facing_left = x_dir < 0.0;

        let len: f32 = (x_dir * x_dir + y_dir * y_dir).sqrt();
        let remaining = self.duration(self.config.min_move_secs, self.config.max_move_secs);
        Phase::Walk {
            dx: x_dir / len,
            dy: y_dir / len,
            remaining,
        }
    }

    fn duration(&mut self, min: f32, max: f32) -> f32 {
        // Also covers NaN and out-of-range values from a hand-edited config
        let min = if min.is_finite() { min.max(MIN_PHASE_SECS) } else { MIN_PHASE_SECS };
        if !max.is_finite() || max <= min {
            min
        } else {
            self.rng.gen_range(min..max)
        }
    }

    fn clamp(&mut self) {
        let min_x = self.area.left as f32;
        let min_y = self.area.top as f32;
        let max_x = (self.area.right as f32 - self.sprite.0 as f32).max(min_x);
        let max_y = (self.area.bottom as f32 - self.sprite.1 as f32).max(min_y);
        self.x = self.x.clamp(min_x, max_x);
        self.y = self.y.clamp(min_y, max_y);
    }
}

fn probability(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}
