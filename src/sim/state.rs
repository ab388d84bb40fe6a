//! Game state and core simulation types
//!
//! Everything one session mutates lives here. Collections are plain `Vec`s
//! iterated in insertion order; removal is always mark-then-compact.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::sector::SectorStreamer;
use super::wave::WaveState;
use crate::Bounds;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::learning::{SessionStats, SpawnBias};

/// Fixed arena or streamed open world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldMode {
    #[default]
    Arena,
    OpenWorld,
}

impl WorldMode {
    pub fn bounds(&self) -> Bounds {
        match self {
            WorldMode::Arena => Bounds::new(ARENA_WIDTH, ARENA_HEIGHT),
            WorldMode::OpenWorld => Bounds::new(WORLD_SIZE, WORLD_SIZE),
        }
    }

    fn player_start(&self) -> Vec2 {
        match self {
            WorldMode::Arena => Vec2::new(ARENA_WIDTH / 2.0 - PLAYER_SIZE / 2.0, 650.0),
            WorldMode::OpenWorld => Vec2::new(512.0, 650.0),
        }
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Overlay menu open; simulation suspended
    Paused,
    /// Session ended
    GameOver,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub lives: u32,
    /// Frames of remaining invulnerability
    pub invincible: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::splat(PLAYER_SIZE),
            speed: PLAYER_SPEED,
            lives: PLAYER_START_LIVES,
            invincible: 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn is_vulnerable(&self) -> bool {
        self.invincible == 0
    }

    /// Count down invulnerability, never below zero
    pub fn tick_invincibility(&mut self) {
        self.invincible = self.invincible.saturating_sub(1);
    }

    /// Lose a life and start the invulnerability window. Returns true when no lives remain.
    pub fn take_damage(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.invincible = INVINCIBILITY_FRAMES;
        self.lives == 0
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Light,
    Heavy,
}

impl EnemyKind {
    /// 70% light, 30% heavy
    pub fn roll(rng: &mut impl Rng) -> Self {
        if rng.random::<f32>() < 0.7 {
            EnemyKind::Light
        } else {
            EnemyKind::Heavy
        }
    }
}

/// Enemy movement patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePattern {
    /// Straight down
    Linear,
    /// Down with a sideways sine drift
    Sine,
}

impl MovePattern {
    /// Even waves descend straight, odd waves weave
    pub fn for_wave(wave: u32) -> Self {
        if wave % 2 == 0 {
            MovePattern::Linear
        } else {
            MovePattern::Sine
        }
    }
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: EnemyKind,
    pub speed: f32,
    /// Zero marks the enemy for removal
    pub hp: u8,
    pub pattern: MovePattern,
    /// Animation/drift frame counter
    pub anim_frame: u32,
    /// Frame of the last shot fired
    pub last_shot: u64,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, kind: EnemyKind, pattern: MovePattern) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(ENEMY_SIZE),
            kind,
            speed: ENEMY_BASE_SPEED,
            hp: 1,
            pattern,
            anim_frame: 0,
            last_shot: 0,
        }
    }

    /// Construct an enemy with the learning bias applied.
    ///
    /// `x_range` is the full horizontal range the enemy may spawn in; the bias
    /// may narrow it to one half. Speed and pattern adjustments stack.
    pub fn spawn(
        id: u32,
        x_range: (f32, f32),
        y: f32,
        kind: EnemyKind,
        pattern: MovePattern,
        bias: &SpawnBias,
        rng: &mut impl Rng,
    ) -> Self {
        let (min_x, max_x) = bias.spawn_span(x_range.0, x_range.1);
        let x = min_x + rng.random::<f32>() * (max_x - min_x);

        let mut enemy = Self::new(id, Vec2::new(x, y), kind, pattern);
        enemy.speed += bias.speed_bonus();
        if bias.forces_sine() {
            enemy.pattern = MovePattern::Sine;
        }
        enemy
    }

    /// Advance one frame along the movement pattern
    pub fn advance(&mut self) {
        self.pos.y += self.speed;
        if self.pattern == MovePattern::Sine {
            self.pos.x += (self.anim_frame as f32 * 0.1).sin() * 1.5;
        }
        self.anim_frame = self.anim_frame.wrapping_add(1);
    }

    /// Apply one bullet hit
    pub fn take_hit(&mut self, lethal: bool) {
        self.hp = if lethal { 0 } else { self.hp.saturating_sub(1) };
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Fire a bullet straight down from the nose
    pub fn shoot(&mut self, frame: u64) -> EnemyBullet {
        self.last_shot = frame;
        EnemyBullet::new(Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y))
    }
}

/// How a player bullet moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletMotion {
    /// Single shot: vertical speed only (negative is up)
    Vertical(f32),
    /// Fan shot: full velocity vector
    Vector(Vec2),
}

/// A player-fired bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub motion: BulletMotion,
}

impl Bullet {
    pub fn velocity(&self) -> Vec2 {
        match self.motion {
            BulletMotion::Vertical(speed) => Vec2::new(0.0, speed),
            BulletMotion::Vector(vel) => vel,
        }
    }

    pub fn advance(&mut self) {
        self.pos += self.velocity();
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Still overlapping the playable area
    pub fn in_bounds(&self, bounds: &Bounds) -> bool {
        self.pos.y + self.size.y >= 0.0
            && self.pos.y <= bounds.height
            && self.pos.x + self.size.x >= 0.0
            && self.pos.x <= bounds.width
    }
}

/// A bullet fired by an enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl EnemyBullet {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::new(ENEMY_BULLET_WIDTH, ENEMY_BULLET_HEIGHT),
            speed: ENEMY_BULLET_SPEED,
        }
    }

    pub fn advance(&mut self) {
        self.pos.y += self.speed;
    }
}

/// A falling +1 life pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPickup {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl HealthPickup {
    /// Drop a pickup where an enemy died
    pub fn dropped_by(enemy_pos: Vec2, enemy_size: Vec2) -> Self {
        Self {
            pos: Vec2::new(enemy_pos.x + enemy_size.x / 2.0 - PICKUP_SIZE / 2.0, enemy_pos.y),
            size: Vec2::splat(PICKUP_SIZE),
            speed: PICKUP_SPEED,
        }
    }

    pub fn advance(&mut self) {
        self.pos.y += self.speed;
    }
}

/// Short on-screen message (wave start, extra life)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    pub ticks: u32,
}

/// Last known state of the other player in a LAN session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlayer {
    pub pos: Vec2,
    pub size: Vec2,
    pub lives: u32,
}

/// Something that happened during a tick, for collaborators outside the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Fire-and-forget sound with relative volume
    Sound { effect: SoundEffect, volume: f32 },
    WaveStarted { wave: u32 },
    EnemyKilled { kind: EnemyKind, pos: Vec2 },
    PlayerDamaged { lives: u32 },
    LifeGained { lives: u32 },
    GameOver { score: u64, wave: u32, kills: u64 },
}

/// Monotonic entity ID source
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Borrowed bundle handed to spawners
pub struct SpawnContext<'a> {
    pub rng: &'a mut Pcg32,
    pub ids: &'a mut EntityIds,
    pub bias: SpawnBias,
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub mode: WorldMode,
    pub bounds: Bounds,
    pub phase: GamePhase,
    pub player: Player,
    /// Live enemies in the fixed arena (empty in open world)
    pub enemies: Vec<Enemy>,
    /// Sector-owned enemies (empty in the fixed arena)
    pub sectors: SectorStreamer,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub pickups: Vec<HealthPickup>,
    pub wave: WaveState,
    pub score: u64,
    /// Cumulative kills, drives bullet progression
    pub kills: u64,
    /// Simulation frame counter
    pub frame: u64,
    pub shoot_cooldown: u32,
    pub banner: Option<Banner>,
    /// Top-left of the viewport in world coordinates
    pub camera: Vec2,
    /// Behavior counters handed to the learning profile at game over
    pub stats: SessionStats,
    /// Bias snapshot taken from the profile at session start
    pub bias: SpawnBias,
    /// Co-op partner, present while a peer is connected
    pub remote: Option<RemotePlayer>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    pub ids: EntityIds,
}

impl GameState {
    /// Create a new session and start the first wave
    pub fn new(mode: WorldMode, bias: SpawnBias, seed: u64) -> Self {
        let mut state = Self {
            seed,
            mode,
            bounds: mode.bounds(),
            phase: GamePhase::Running,
            player: Player::new(mode.player_start()),
            enemies: Vec::new(),
            sectors: SectorStreamer::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            pickups: Vec::new(),
            wave: WaveState::default(),
            score: 0,
            kills: 0,
            frame: 0,
            shoot_cooldown: 0,
            banner: None,
            camera: Vec2::ZERO,
            stats: SessionStats::default(),
            bias,
            remote: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
        };
        state.update_camera();
        state.start_next_wave();
        state
    }

    /// Advance the wave counter and announce it
    pub fn start_next_wave(&mut self) {
        self.wave.start_wave();
        let wave = self.wave.wave;
        log::info!(
            "Wave {} started (spawn interval {} frames, quota {})",
            wave,
            self.wave.spawn_interval,
            self.wave.enemies_per_wave
        );
        self.show_banner(format!("WAVE {}", wave));
        self.events.push(GameEvent::WaveStarted { wave });
    }

    pub fn show_banner(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner {
            text: text.into(),
            ticks: BANNER_FRAMES,
        });
    }

    /// Extra life granted from outside the simulation
    pub fn grant_extra_life(&mut self) {
        self.player.lives += 1;
        self.show_banner("EXTRA LIFE!");
        self.events.push(GameEvent::LifeGained {
            lives: self.player.lives,
        });
    }

    pub fn sound(&mut self, effect: SoundEffect, volume: f32) {
        self.events.push(GameEvent::Sound { effect, volume });
    }

    /// All live enemies, arena first then sectors in coordinate order
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().chain(self.sectors.enemies())
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len() + self.sectors.enemy_count()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Center the viewport on the player (open world only)
    pub fn update_camera(&mut self) {
        if self.mode != WorldMode::OpenWorld {
            self.camera = Vec2::ZERO;
            return;
        }
        let center = self.player.pos - Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) / 2.0;
        self.camera = Vec2::new(
            center.x.clamp(0.0, self.bounds.width - ARENA_WIDTH),
            center.y.clamp(0.0, self.bounds.height - ARENA_HEIGHT),
        );
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            phase: self.phase,
            player: &self.player,
            enemies: self.enemies().collect(),
            bullets: &self.bullets,
            enemy_bullets: &self.enemy_bullets,
            pickups: &self.pickups,
            banner: self.banner.as_ref(),
            camera: (self.mode == WorldMode::OpenWorld).then_some(self.camera),
            remote: self.remote.as_ref(),
            score: self.score,
            kills: self.kills,
            wave: self.wave.wave,
        }
    }
}

/// What the renderer/UI reads each frame
#[derive(Debug)]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub player: &'a Player,
    pub enemies: Vec<&'a Enemy>,
    pub bullets: &'a [Bullet],
    pub enemy_bullets: &'a [EnemyBullet],
    pub pickups: &'a [HealthPickup],
    pub banner: Option<&'a Banner>,
    /// Viewport offset, streaming mode only
    pub camera: Option<Vec2>,
    pub remote: Option<&'a RemotePlayer>,
    pub score: u64,
    pub kills: u64,
    pub wave: u32,
}
