//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per frame, all delays in frames
//! - Seeded RNG only
//! - Stable iteration order (insertion order, sectors by coordinate)
//! - No rendering, audio or platform dependencies

pub mod bullets;
pub mod collision;
pub mod sector;
pub mod state;
pub mod tick;
pub mod wave;

pub use bullets::{bullet_scale, bullet_size, bullet_speed, fire_volley, volley_size};
pub use collision::{Aabb, Bounded, CollisionReport};
pub use sector::{Sector, SectorCoord, SectorStreamer};
pub use state::{
    Banner, Bullet, BulletMotion, Enemy, EnemyBullet, EnemyKind, FrameSnapshot, GameEvent,
    GamePhase, GameState, HealthPickup, MovePattern, Player, RemotePlayer, WorldMode,
};
pub use tick::{TickInput, TickOutcome, tick};
pub use wave::{WaveState, WaveTrigger, spawn_interval_for};
