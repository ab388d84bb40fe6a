//! Wave progression and the fixed-arena spawn scheduler

use serde::{Deserialize, Serialize};

use super::state::{Enemy, EnemyKind, MovePattern, SpawnContext, WorldMode};
use crate::consts::*;

/// Spawn interval before any wave scaling
pub const BASE_SPAWN_INTERVAL: u32 = 60;
/// Interval never drops below this
pub const MIN_SPAWN_INTERVAL: u32 = 20;
/// Frames shaved off the interval per wave
pub const SPAWN_INTERVAL_STEP: u32 = 2;
/// Grace period before the first spawn of a wave
pub const WAVE_START_DELAY: u32 = 30;
/// Quota before wave scaling
pub const BASE_WAVE_QUOTA: u32 = 5;
/// Kill-driven trigger: a new wave once kills exceed `wave * KILLS_PER_WAVE`
pub const KILLS_PER_WAVE: u64 = 10;

/// Arena spawn row and horizontal margins
pub const ARENA_SPAWN_Y: f32 = -40.0;
pub const ARENA_SPAWN_MARGIN: f32 = 50.0;

/// Spawn interval for a wave: `max(20, 60 - 2 * wave)`
pub fn spawn_interval_for(wave: u32) -> u32 {
    BASE_SPAWN_INTERVAL
        .saturating_sub(wave.saturating_mul(SPAWN_INTERVAL_STEP))
        .max(MIN_SPAWN_INTERVAL)
}

/// What ends a wave. Each world mode uses exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveTrigger {
    /// Quota spawned, timer idle and the field cleared
    EnemiesExhausted,
    /// Cumulative kills exceed `wave * 10`
    KillThreshold,
}

impl WaveTrigger {
    pub fn for_mode(mode: WorldMode) -> Self {
        match mode {
            WorldMode::Arena => WaveTrigger::EnemiesExhausted,
            WorldMode::OpenWorld => WaveTrigger::KillThreshold,
        }
    }
}

/// Wave counter and spawn timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    /// Current wave (0 before the first wave starts)
    pub wave: u32,
    /// Frames between spawns
    pub spawn_interval: u32,
    /// Frames until the next spawn
    pub spawn_timer: u32,
    /// Enemies the current wave sends
    pub enemies_per_wave: u32,
    pub spawned_this_wave: u32,
    pub active: bool,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            wave: 0,
            spawn_interval: BASE_SPAWN_INTERVAL,
            spawn_timer: 0,
            enemies_per_wave: BASE_WAVE_QUOTA,
            spawned_this_wave: 0,
            active: true,
        }
    }
}

impl WaveState {
    /// Move to the next wave: shorter interval, larger quota
    pub fn start_wave(&mut self) {
        self.wave += 1;
        self.spawn_interval = spawn_interval_for(self.wave);
        self.enemies_per_wave = BASE_WAVE_QUOTA + self.wave;
        self.spawned_this_wave = 0;
        self.spawn_timer = WAVE_START_DELAY;
    }

    /// Whole quota for this wave has been sent.
    ///
    /// The quota decides when an arena wave can end. It does not limit how
    /// many enemies are alive at once; that is [`ENEMY_CAP`].
    pub fn is_exhausted(&self) -> bool {
        self.spawned_this_wave >= self.enemies_per_wave
    }

    /// Whether the given trigger says the wave is over
    pub fn should_advance(&self, trigger: WaveTrigger, live_enemies: usize, kills: u64) -> bool {
        match trigger {
            WaveTrigger::EnemiesExhausted => {
                self.is_exhausted() && self.spawn_timer == 0 && live_enemies == 0
            }
            WaveTrigger::KillThreshold => kills > self.wave as u64 * KILLS_PER_WAVE,
        }
    }
}

/// One frame of fixed-arena spawning.
///
/// Counts the timer down; when it is idle, the wave still has quota left and
/// the arena holds fewer than [`ENEMY_CAP`] enemies, one enemy enters at the
/// top edge and the timer restarts. Returns the ID of the spawned enemy.
pub fn spawn_step(
    wave: &mut WaveState,
    enemies: &mut Vec<Enemy>,
    ctx: &mut SpawnContext<'_>,
) -> Option<u32> {
    if !wave.active {
        return None;
    }

    if wave.spawn_timer > 0 {
        wave.spawn_timer -= 1;
        return None;
    }

    if enemies.len() >= ENEMY_CAP || wave.is_exhausted() {
        return None;
    }

    let id = ctx.ids.next_id();
    let kind = EnemyKind::roll(&mut *ctx.rng);
    let enemy = Enemy::spawn(
        id,
        (ARENA_SPAWN_MARGIN, ARENA_WIDTH - ARENA_SPAWN_MARGIN),
        ARENA_SPAWN_Y,
        kind,
        MovePattern::for_wave(wave.wave),
        &ctx.bias,
        &mut *ctx.rng,
    );
    log::debug!("Spawned {:?} enemy {} at x={:.0}", kind, id, enemy.pos.x);
    enemies.push(enemy);

    wave.spawned_this_wave += 1;
    wave.spawn_timer = wave.spawn_interval;
    Some(id)
}
