//! Collision detection and resolution
//!
//! Everything is an axis-aligned box. Resolution runs once per frame in a
//! fixed category order; within a category each entity is matched at most
//! once, against the first overlapping candidate in iteration order.

use glam::Vec2;

use super::state::{
    Bullet, Enemy, EnemyBullet, GameEvent, GameState, HealthPickup, Player,
};
use crate::audio::SoundEffect;
use crate::consts::KILL_REWARD;

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap; boxes that only touch edges do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max().x
            && self.max().x > other.min.x
            && self.min.y < other.max().y
            && self.max().y > other.min.y
    }
}

/// Anything with a collision box
pub trait Bounded {
    fn aabb(&self) -> Aabb;
}

macro_rules! impl_bounded {
    ($($ty:ty),*) => {
        $(impl Bounded for $ty {
            fn aabb(&self) -> Aabb {
                Aabb::new(self.pos, self.size)
            }
        })*
    };
}

impl_bounded!(Player, Enemy, Bullet, EnemyBullet, HealthPickup);

/// Index of the first candidate overlapping `target`
pub fn first_overlap<'a, T, I>(target: &Aabb, candidates: I) -> Option<usize>
where
    T: Bounded + 'a,
    I: IntoIterator<Item = &'a T>,
{
    candidates
        .into_iter()
        .position(|c| c.aabb().overlaps(target))
}

/// What the collision pass did this frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub kills: u32,
    pub pickups_collected: u32,
    pub hits_taken: u32,
    /// Player ran out of lives
    pub fatal: bool,
}

/// Resolve all collisions for one frame.
///
/// Order: player bullets vs enemies, pickups vs player, enemy bullets vs
/// player, enemies vs player. Damage is skipped while the player is
/// invulnerable or `invincible_override` is set, and stops entirely once the
/// player is out of lives.
pub fn resolve(state: &mut GameState, invincible_override: bool, one_hit_kill: bool) -> CollisionReport {
    let mut report = CollisionReport::default();

    resolve_bullet_hits(state, one_hit_kill, &mut report);
    resolve_pickups(state, &mut report);

    if !invincible_override {
        resolve_enemy_bullets(state, &mut report);
        resolve_rams(state, &mut report);
    }

    report
}

fn resolve_bullet_hits(state: &mut GameState, one_hit_kill: bool, report: &mut CollisionReport) {
    let mut spent = vec![false; state.bullets.len()];
    let mut downed: Vec<Enemy> = Vec::new();

    for (i, bullet) in state.bullets.iter().enumerate() {
        let bb = bullet.aabb();
        let target = state
            .enemies
            .iter_mut()
            .chain(state.sectors.enemies_mut())
            .find(|e| e.is_alive() && e.aabb().overlaps(&bb));

        if let Some(enemy) = target {
            spent[i] = true;
            enemy.take_hit(one_hit_kill);
            if !enemy.is_alive() {
                downed.push(enemy.clone());
            }
        }
    }

    if downed.is_empty() && !spent.contains(&true) {
        return;
    }

    let mut idx = 0;
    state.bullets.retain(|_| {
        let keep = !spent[idx];
        idx += 1;
        keep
    });
    state.enemies.retain(Enemy::is_alive);
    state.sectors.retain_enemies(Enemy::is_alive);

    for enemy in downed {
        state.score += KILL_REWARD;
        state.kills += 1;
        report.kills += 1;
        state.pickups.push(HealthPickup::dropped_by(enemy.pos, enemy.size));
        state.events.push(GameEvent::EnemyKilled {
            kind: enemy.kind,
            pos: enemy.pos,
        });
        state.sound(SoundEffect::Explosion, 0.7);
    }
}

fn resolve_pickups(state: &mut GameState, report: &mut CollisionReport) {
    let player_box = state.player.aabb();
    let before = state.pickups.len();
    state.pickups.retain(|p| !p.aabb().overlaps(&player_box));
    let collected = before - state.pickups.len();

    for _ in 0..collected {
        state.player.lives += 1;
        report.pickups_collected += 1;
        state.events.push(GameEvent::LifeGained {
            lives: state.player.lives,
        });
        state.sound(SoundEffect::Explosion, 0.5);
    }
}

fn resolve_enemy_bullets(state: &mut GameState, report: &mut CollisionReport) {
    if report.fatal || !state.player.is_vulnerable() {
        return;
    }
    let player_box = state.player.aabb();
    if let Some(i) = first_overlap(&player_box, &state.enemy_bullets) {
        state.enemy_bullets.remove(i);
        damage_player(state, report);
    }
}

fn resolve_rams(state: &mut GameState, report: &mut CollisionReport) {
    if report.fatal || !state.player.is_vulnerable() {
        return;
    }
    let player_box = state.player.aabb();
    let rammer = state
        .enemies
        .iter_mut()
        .chain(state.sectors.enemies_mut())
        .find(|e| e.aabb().overlaps(&player_box));

    if let Some(enemy) = rammer {
        // Rams kill without reward
        enemy.hp = 0;
        state.enemies.retain(Enemy::is_alive);
        state.sectors.retain_enemies(Enemy::is_alive);
        damage_player(state, report);
    }
}

fn damage_player(state: &mut GameState, report: &mut CollisionReport) {
    report.hits_taken += 1;
    report.fatal = state.player.take_damage();
    log::debug!("Player hit, {} lives left", state.player.lives);
    state.events.push(GameEvent::PlayerDamaged {
        lives: state.player.lives,
    });
    state.sound(SoundEffect::Explosion, 1.0);
}
