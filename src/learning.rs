//! Cross-session learning profile
//!
//! Aggregates how the player moves and shoots across every finished session.
//! New enemies read a [`SpawnBias`] derived from it: players who hug one side
//! see enemies spawn on the other, players who push forward or spam the
//! trigger face faster, more erratic enemies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Left-bias above this spawns enemies on the right half
pub const LEFT_BIAS_HIGH: f64 = 0.6;
/// Left-bias below this spawns enemies on the left half
pub const LEFT_BIAS_LOW: f64 = 0.4;
/// Up-bias above this makes enemies faster
pub const UP_BIAS_HIGH: f64 = 0.7;
/// Shots per frame above this makes enemies faster, sinusoidal and trigger-happy
pub const SHOTS_PER_FRAME_HIGH: f64 = 0.05;

/// Speed added when the player favors moving up
pub const UP_BIAS_SPEED_BONUS: f32 = 1.0;
/// Speed added when the player fires a lot
pub const TRIGGER_SPEED_BONUS: f32 = 0.5;
/// Extra enemy fire probability when the player fires a lot
pub const TRIGGER_FIRE_BONUS: f32 = 0.1;

/// Directions held during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveDirs {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Behavior counters for the current session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Running average of normalized player x
    pub avg_x: f64,
    /// Running average of normalized player y
    pub avg_y: f64,
    pub shots_fired: u64,
    pub left_moves: u64,
    pub right_moves: u64,
    pub up_moves: u64,
    pub down_moves: u64,
    pub total_frames: u64,
}

impl SessionStats {
    /// Fold one frame of player behavior into the counters
    pub fn record_frame(&mut self, normalized_pos: Vec2, dirs: MoveDirs) {
        self.total_frames += 1;
        let n = self.total_frames as f64;
        self.avg_x = (self.avg_x * (n - 1.0) + normalized_pos.x as f64) / n;
        self.avg_y = (self.avg_y * (n - 1.0) + normalized_pos.y as f64) / n;

        if dirs.left {
            self.left_moves += 1;
        }
        if dirs.right {
            self.right_moves += 1;
        }
        if dirs.up {
            self.up_moves += 1;
        }
        if dirs.down {
            self.down_moves += 1;
        }
    }

    pub fn record_shots(&mut self, count: usize) {
        self.shots_fired += count as u64;
    }
}

/// Persisted aggregate over all finished sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningProfile {
    pub sessions: u64,
    pub avg_x: f64,
    pub avg_y: f64,
    pub shots_fired: u64,
    pub left_moves: u64,
    pub right_moves: u64,
    pub up_moves: u64,
    pub down_moves: u64,
    pub total_frames: u64,
}

impl LearningProfile {
    /// Accumulate a finished session.
    ///
    /// Position averages are weighted by frame count, so a short session moves
    /// the aggregate less than a long one and the result does not depend on
    /// the order sessions are folded in. Counters are plain sums.
    pub fn absorb(&mut self, stats: &SessionStats) {
        self.sessions += 1;

        let prev_frames = self.total_frames;
        let total = prev_frames + stats.total_frames;
        if total > 0 {
            let prev = prev_frames as f64;
            let cur = stats.total_frames as f64;
            let total = total as f64;
            self.avg_x = (self.avg_x * prev + stats.avg_x * cur) / total;
            self.avg_y = (self.avg_y * prev + stats.avg_y * cur) / total;
        }

        self.total_frames = total;
        self.shots_fired += stats.shots_fired;
        self.left_moves += stats.left_moves;
        self.right_moves += stats.right_moves;
        self.up_moves += stats.up_moves;
        self.down_moves += stats.down_moves;

        log::info!(
            "Learning profile updated: {} sessions, left bias {:.2}, up bias {:.2}, {:.3} shots/frame",
            self.sessions,
            self.left_bias(),
            self.up_bias(),
            self.shots_per_frame()
        );
    }

    /// Share of horizontal moves that went left (0.5 when there are none)
    pub fn left_bias(&self) -> f64 {
        ratio(self.left_moves, self.left_moves + self.right_moves)
    }

    /// Share of vertical moves that went up (0.5 when there are none)
    pub fn up_bias(&self) -> f64 {
        ratio(self.up_moves, self.up_moves + self.down_moves)
    }

    pub fn shots_per_frame(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.shots_fired as f64 / self.total_frames as f64
        }
    }

    pub fn spawn_bias(&self) -> SpawnBias {
        SpawnBias {
            left_bias: self.left_bias(),
            up_bias: self.up_bias(),
            shots_per_frame: self.shots_per_frame(),
        }
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.5
    } else {
        part as f64 / whole as f64
    }
}

/// Derived ratios consumed when constructing enemies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBias {
    pub left_bias: f64,
    pub up_bias: f64,
    pub shots_per_frame: f64,
}

impl Default for SpawnBias {
    fn default() -> Self {
        Self {
            left_bias: 0.5,
            up_bias: 0.5,
            shots_per_frame: 0.0,
        }
    }
}

impl SpawnBias {
    /// Horizontal range new enemies spawn in, given the full playable range
    pub fn spawn_span(&self, min_x: f32, max_x: f32) -> (f32, f32) {
        let mid = (min_x + max_x) / 2.0;
        if self.left_bias > LEFT_BIAS_HIGH {
            (mid, max_x)
        } else if self.left_bias < LEFT_BIAS_LOW {
            (min_x, mid)
        } else {
            (min_x, max_x)
        }
    }

    pub fn speed_bonus(&self) -> f32 {
        let mut bonus = 0.0;
        if self.up_bias > UP_BIAS_HIGH {
            bonus += UP_BIAS_SPEED_BONUS;
        }
        if self.is_trigger_happy() {
            bonus += TRIGGER_SPEED_BONUS;
        }
        bonus
    }

    /// Heavy shooters get sinusoidal enemies regardless of wave
    pub fn forces_sine(&self) -> bool {
        self.is_trigger_happy()
    }

    pub fn fire_rate_bonus(&self) -> f32 {
        if self.is_trigger_happy() {
            TRIGGER_FIRE_BONUS
        } else {
            0.0
        }
    }

    fn is_trigger_happy(&self) -> bool {
        self.shots_per_frame > SHOTS_PER_FRAME_HIGH
    }
}
