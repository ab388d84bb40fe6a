//! Sector Shooter - an arcade space shooter with adaptive enemies
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, game loop step)
//! - `learning`: Cross-session player profile that biases enemy spawns
//! - `session`: Game loop wiring the simulation to its collaborators
//! - `persistence`: Profile storage (JSON file, LocalStorage, memory)
//! - `audio`, `cheats`, `network`: Collaborator contracts consumed by the session

pub mod audio;
pub mod cheats;
pub mod learning;
pub mod network;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use learning::{LearningProfile, SessionStats, SpawnBias};
pub use session::Session;
pub use settings::{Settings, WorldMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation frame length (the game is paced at 60 frames per second)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Max frames simulated per real-time update, so stalls do not spiral
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Fixed arena dimensions
    pub const ARENA_WIDTH: f32 = 1024.0;
    pub const ARENA_HEIGHT: f32 = 768.0;

    /// Open world dimensions
    pub const WORLD_SIZE: f32 = 100_000.0;
    /// One sector is one screen wide
    pub const SECTOR_SIZE: f32 = 1024.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_START_LIVES: u32 = 3;
    /// Frames of invulnerability after taking a hit
    pub const INVINCIBILITY_FRAMES: u32 = 60;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 40.0;
    pub const ENEMY_BASE_SPEED: f32 = 2.0;
    /// Max concurrent enemies in the fixed arena
    pub const ENEMY_CAP: usize = 20;

    /// Enemy bullets
    pub const ENEMY_BULLET_WIDTH: f32 = 5.0;
    pub const ENEMY_BULLET_HEIGHT: f32 = 10.0;
    pub const ENEMY_BULLET_SPEED: f32 = 4.0;
    /// Enemies decide whether to shoot every N frames
    pub const ENEMY_FIRE_PERIOD: u64 = 30;

    /// Player bullets (before kill-count scaling)
    pub const BULLET_BASE_WIDTH: f32 = 4.0;
    pub const BULLET_BASE_HEIGHT: f32 = 15.0;
    pub const BULLET_BASE_SPEED: f32 = 8.0;
    pub const FIRE_COOLDOWN_FRAMES: u32 = 10;

    /// Health pickups
    pub const PICKUP_SIZE: f32 = 20.0;
    pub const PICKUP_SPEED: f32 = 2.0;

    /// Score awarded per kill
    pub const KILL_REWARD: u64 = 10;

    /// On-screen banner duration (wave start, extra life)
    pub const BANNER_FRAMES: u32 = 60;
}

/// Playable rectangle, origin at top-left, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a box of `size` at `pos` so it stays fully inside the bounds
    #[inline]
    pub fn clamp_box(&self, pos: Vec2, size: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.clamp(0.0, (self.width - size.x).max(0.0)),
            pos.y.clamp(0.0, (self.height - size.y).max(0.0)),
        )
    }

    /// Position normalized to [0, 1] on both axes
    #[inline]
    pub fn normalize(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x / self.width, pos.y / self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_box_keeps_box_inside() {
        let bounds = Bounds::new(100.0, 80.0);
        let size = Vec2::new(10.0, 10.0);
        assert_eq!(bounds.clamp_box(Vec2::new(-5.0, 3.0), size), Vec2::new(0.0, 3.0));
        assert_eq!(bounds.clamp_box(Vec2::new(95.0, 75.0), size), Vec2::new(90.0, 70.0));
    }

    #[test]
    fn test_normalize() {
        let bounds = Bounds::new(200.0, 100.0);
        let n = bounds.normalize(Vec2::new(50.0, 50.0));
        assert!((n.x - 0.25).abs() < 1e-6);
        assert!((n.y - 0.5).abs() < 1e-6);
    }
}
