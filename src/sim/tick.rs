//! Fixed-step simulation tick
//!
//! One call advances the session by exactly one frame. All randomness comes
//! from the state's seeded RNG, so equal seeds and equal input sequences
//! produce equal sessions.

use glam::Vec2;
use rand::Rng;

use super::bullets::fire_volley;
use super::collision;
use super::state::{BulletMotion, Enemy, GameEvent, GamePhase, GameState, SpawnContext, WorldMode};
use super::wave::{WaveTrigger, spawn_step};
use crate::audio::SoundEffect;
use crate::cheats::CheatFlags;
use crate::consts::*;
use crate::learning::MoveDirs;

/// Enemy fire probability before wave scaling
pub const BASE_FIRE_CHANCE: f32 = 0.2;
/// Added per wave
pub const FIRE_CHANCE_PER_WAVE: f32 = 0.02;
/// Wave scaling stops here (the learning bonus may push past it)
pub const MAX_FIRE_CHANCE: f32 = 0.5;

/// Per-axis velocity nudge applied to fan bullets by auto-target
const STEER_NUDGE: f32 = 0.2;
/// Largest sideways slide per frame for single bullets under auto-target
const STEER_MAX_SLIDE: f32 = 2.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Trigger held
    pub fire: bool,
    /// Open/close the overlay menu
    pub toggle_menu: bool,
    /// Demo mode: the tick synthesizes movement and fire
    pub autopilot: bool,
}

impl TickInput {
    fn dirs(&self) -> MoveDirs {
        MoveDirs {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
        }
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A full frame was simulated
    Advanced,
    /// Menu open; nothing moved
    Paused,
    /// Session already over; nothing moved
    Finished,
    /// The player lost the last life this frame
    EnteredGameOver,
}

/// Enemy fire chance for a wave: `min(0.5, 0.2 + 0.02 * wave)`
pub fn enemy_fire_chance(wave: u32) -> f32 {
    (BASE_FIRE_CHANCE + FIRE_CHANCE_PER_WAVE * wave as f32).min(MAX_FIRE_CHANCE)
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, cheats: &CheatFlags) -> TickOutcome {
    if input.toggle_menu {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                log::debug!("Paused at frame {}", state.frame);
                return TickOutcome::Paused;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                log::debug!("Resumed at frame {}", state.frame);
            }
            GamePhase::GameOver => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return TickOutcome::Paused,
        GamePhase::GameOver => return TickOutcome::Finished,
        GamePhase::Running => {}
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }

    move_player(state, &input);
    state
        .stats
        .record_frame(state.bounds.normalize(state.player.pos), input.dirs());

    fire(state, &input, cheats);
    spawn(state);
    advance_entities(state, cheats);
    enemy_fire(state);

    let report = collision::resolve(state, cheats.invincibility, cheats.one_hit_kill);
    if report.fatal {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over at wave {} with score {} ({} kills)",
            state.wave.wave,
            state.score,
            state.kills
        );
        state.events.push(GameEvent::GameOver {
            score: state.score,
            wave: state.wave.wave,
            kills: state.kills,
        });
        state.frame += 1;
        return TickOutcome::EnteredGameOver;
    }

    let trigger = WaveTrigger::for_mode(state.mode);
    if state
        .wave
        .should_advance(trigger, state.enemy_count(), state.kills)
    {
        state.start_next_wave();
    }

    if let Some(banner) = state.banner.as_mut() {
        banner.ticks = banner.ticks.saturating_sub(1);
        if banner.ticks == 0 {
            state.banner = None;
        }
    }

    state.frame += 1;
    TickOutcome::Advanced
}

/// Track the nearest enemy horizontally and keep the trigger held
fn autopilot(state: &GameState, input: &mut TickInput) {
    input.fire = true;
    input.left = false;
    input.right = false;
    input.up = false;
    input.down = false;

    let center = state.player.center();
    let nearest = state.enemies().min_by(|a, b| {
        a.center()
            .distance_squared(center)
            .total_cmp(&b.center().distance_squared(center))
    });

    if let Some(enemy) = nearest {
        let dx = enemy.center().x - center.x;
        if dx < -state.player.speed {
            input.left = true;
        } else if dx > state.player.speed {
            input.right = true;
        }
    }
}

fn move_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;
    let mut delta = Vec2::ZERO;
    if input.left {
        delta.x -= player.speed;
    }
    if input.right {
        delta.x += player.speed;
    }
    if input.up {
        delta.y -= player.speed;
    }
    if input.down {
        delta.y += player.speed;
    }
    player.pos = state.bounds.clamp_box(player.pos + delta, player.size);
    player.tick_invincibility();
    state.update_camera();
}

fn fire(state: &mut GameState, input: &TickInput, cheats: &CheatFlags) {
    if input.fire && state.shoot_cooldown == 0 {
        let volley = fire_volley(state.kills, state.player.pos, state.player.size);
        state.stats.record_shots(volley.len());
        state.bullets.extend(volley);
        state.sound(SoundEffect::Laser, 0.5);
        state.shoot_cooldown = if cheats.rapid_fire {
            FIRE_COOLDOWN_FRAMES / 2
        } else {
            FIRE_COOLDOWN_FRAMES
        };
    }
    state.shoot_cooldown = state.shoot_cooldown.saturating_sub(1);
}

fn spawn(state: &mut GameState) {
    let mut ctx = SpawnContext {
        rng: &mut state.rng,
        ids: &mut state.ids,
        bias: state.bias,
    };
    match state.mode {
        WorldMode::Arena => {
            spawn_step(&mut state.wave, &mut state.enemies, &mut ctx);
        }
        WorldMode::OpenWorld => {
            state
                .sectors
                .update(state.player.pos, state.wave.wave, &mut ctx);
        }
    }
}

fn advance_entities(state: &mut GameState, cheats: &CheatFlags) {
    let floor = state.bounds.height;

    for enemy in state.enemies.iter_mut().chain(state.sectors.enemies_mut()) {
        enemy.advance();
    }
    state.enemies.retain(|e| e.pos.y <= floor);
    state.sectors.retain_enemies(|e| e.pos.y <= floor);
    state.sectors.rehome_enemies();

    for bullet in &mut state.bullets {
        bullet.advance();
    }
    if cheats.auto_target {
        steer_bullets(state);
    }
    let bounds = state.bounds;
    state.bullets.retain(|b| b.in_bounds(&bounds));

    for bullet in &mut state.enemy_bullets {
        bullet.advance();
    }
    state.enemy_bullets.retain(|b| b.pos.y <= floor);

    for pickup in &mut state.pickups {
        pickup.advance();
    }
    state.pickups.retain(|p| p.pos.y <= floor);
}

/// Bend every player bullet toward its nearest enemy
fn steer_bullets(state: &mut GameState) {
    let targets: Vec<Vec2> = state.enemies().map(Enemy::center).collect();
    if targets.is_empty() {
        return;
    }

    for bullet in &mut state.bullets {
        let from = bullet.center();
        let Some(target) = targets
            .iter()
            .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
        else {
            continue;
        };
        let d = *target - from;

        match &mut bullet.motion {
            BulletMotion::Vector(vel) => {
                // Axial speed is preserved, the vector only turns
                let axial = vel.y.abs();
                let bent = *vel + Vec2::new(d.x.signum(), d.y.signum()) * STEER_NUDGE;
                *vel = bent.normalize_or_zero() * axial;
            }
            BulletMotion::Vertical(_) => {
                bullet.pos.x += d.x.signum() * (d.x.abs() * 0.1).min(STEER_MAX_SLIDE);
            }
        }
    }
}

/// Every 30th frame, each enemy rolls to fire
fn enemy_fire(state: &mut GameState) {
    if state.frame % ENEMY_FIRE_PERIOD != 0 {
        return;
    }

    let chance = enemy_fire_chance(state.wave.wave) + state.bias.fire_rate_bonus();
    let frame = state.frame;
    for enemy in state.enemies.iter_mut().chain(state.sectors.enemies_mut()) {
        if state.rng.random::<f32>() < chance {
            state.enemy_bullets.push(enemy.shoot(frame));
        }
    }
}
