//! Open-world sector streaming
//!
//! The world is cut into square sectors. Whenever the player crosses into a
//! new sector, the 3x3 block around it is populated with enemies. A sector
//! is populated at most once per coordinate pair; sectors that fall too far
//! behind are retired and their enemies dropped. Enemies belong to the sector
//! their position lies in, and change owner as they move.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Enemy, EnemyKind, MovePattern, SpawnContext};
use crate::consts::{SECTOR_SIZE, WORLD_SIZE};

/// Minimum enemies per sector, before wave scaling
pub const SECTOR_BASE_ENEMIES: u32 = 3;
/// Extra enemies drawn from `0..SECTOR_EXTRA_ENEMIES`
pub const SECTOR_EXTRA_ENEMIES: u32 = 5;
/// Sectors farther than this (Chebyshev distance) from the current one are retired
pub const SECTOR_RETIRE_DISTANCE: i32 = 2;

/// Integer grid coordinate of a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectorCoord {
    pub x: i32,
    pub y: i32,
}

impl SectorCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sector containing a world position
    pub fn containing(pos: Vec2) -> Self {
        Self {
            x: (pos.x / SECTOR_SIZE).floor() as i32,
            y: (pos.y / SECTOR_SIZE).floor() as i32,
        }
    }

    /// Top-left corner in world coordinates
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x as f32 * SECTOR_SIZE, self.y as f32 * SECTOR_SIZE)
    }

    pub fn chebyshev(&self, other: SectorCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// This sector and its eight neighbors
    pub fn neighborhood(&self) -> impl Iterator<Item = SectorCoord> {
        let center = *self;
        (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| SectorCoord::new(center.x + dx, center.y + dy)))
    }

    /// Whether the sector lies inside the world
    pub fn in_world(&self) -> bool {
        let per_axis = (WORLD_SIZE / SECTOR_SIZE).ceil() as i32;
        (0..per_axis).contains(&self.x) && (0..per_axis).contains(&self.y)
    }
}

/// A materialized sector and the enemies it owns
#[derive(Debug, Clone)]
pub struct Sector {
    pub coord: SectorCoord,
    pub enemies: Vec<Enemy>,
}

impl Sector {
    fn empty(coord: SectorCoord) -> Self {
        Self {
            coord,
            enemies: Vec::new(),
        }
    }
}

/// Tracks which sectors exist around the player
#[derive(Debug, Clone, Default)]
pub struct SectorStreamer {
    current: Option<SectorCoord>,
    /// Resident sectors, iterated in coordinate order
    sectors: BTreeMap<SectorCoord, Sector>,
    /// Every coordinate ever materialized, resident or retired
    generated: BTreeSet<SectorCoord>,
}

impl SectorStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SectorCoord> {
        self.current
    }

    pub fn sector(&self, coord: SectorCoord) -> Option<&Sector> {
        self.sectors.get(&coord)
    }

    pub fn resident_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_generated(&self, coord: SectorCoord) -> bool {
        self.generated.contains(&coord)
    }

    /// Per-frame streaming step.
    ///
    /// Returns true when the player entered a different sector this frame.
    pub fn update(&mut self, player_pos: Vec2, wave: u32, ctx: &mut SpawnContext<'_>) -> bool {
        let coord = SectorCoord::containing(player_pos);
        if self.current == Some(coord) {
            return false;
        }

        self.current = Some(coord);
        for neighbor in coord.neighborhood() {
            self.materialize(neighbor, wave, ctx);
        }
        self.retire_far();
        true
    }

    /// Populate a sector unless it was populated before.
    ///
    /// Returns true when enemies were generated.
    pub fn materialize(&mut self, coord: SectorCoord, wave: u32, ctx: &mut SpawnContext<'_>) -> bool {
        if !coord.in_world() || !self.generated.insert(coord) {
            return false;
        }

        let count = SECTOR_BASE_ENEMIES + ctx.rng.random_range(0..SECTOR_EXTRA_ENEMIES) + wave;
        let origin = coord.origin();
        let enemies: Vec<Enemy> = (0..count)
            .map(|_| {
                let y = origin.y + ctx.rng.random::<f32>() * SECTOR_SIZE;
                let kind = EnemyKind::roll(&mut *ctx.rng);
                Enemy::spawn(
                    ctx.ids.next_id(),
                    (origin.x, origin.x + SECTOR_SIZE),
                    y,
                    kind,
                    MovePattern::for_wave(wave),
                    &ctx.bias,
                    &mut *ctx.rng,
                )
            })
            .collect();

        log::info!(
            "Generated sector {},{} with {} enemies",
            coord.x,
            coord.y,
            enemies.len()
        );
        // The sector may already be resident, holding enemies that wandered in
        self.sectors
            .entry(coord)
            .or_insert_with(|| Sector::empty(coord))
            .enemies
            .extend(enemies);
        true
    }

    /// Drop sectors far from the current one, enemies included
    pub fn retire_far(&mut self) {
        let Some(current) = self.current else { return };
        self.sectors.retain(|coord, sector| {
            let keep = coord.chebyshev(current) <= SECTOR_RETIRE_DISTANCE;
            if !keep {
                log::debug!(
                    "Retired sector {},{} ({} enemies discarded)",
                    coord.x,
                    coord.y,
                    sector.enemies.len()
                );
            }
            keep
        });
    }

    /// Hand every enemy to the sector containing its position.
    ///
    /// Sectors that receive enemies become resident without being generated.
    /// Enemies outside the world stay with their current owner. Returns the
    /// number of enemies that changed owner.
    pub fn rehome_enemies(&mut self) -> usize {
        let mut migrants: Vec<(SectorCoord, Enemy)> = Vec::new();
        for (coord, sector) in self.sectors.iter_mut() {
            let home = |e: &Enemy| {
                let at = SectorCoord::containing(e.pos);
                if at.in_world() { at } else { *coord }
            };
            if sector.enemies.iter().all(|e| home(e) == *coord) {
                continue;
            }
            let (stay, leave): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut sector.enemies)
                .into_iter()
                .partition(|e| home(e) == *coord);
            sector.enemies = stay;
            migrants.extend(leave.into_iter().map(|e| (home(&e), e)));
        }

        let moved = migrants.len();
        for (target, enemy) in migrants {
            self.sectors
                .entry(target)
                .or_insert_with(|| Sector::empty(target))
                .enemies
                .push(enemy);
        }
        moved
    }

    /// Resident sectors in coordinate order
    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.values()
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.sectors.values().flat_map(|s| s.enemies.iter())
    }

    pub fn enemies_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.sectors.values_mut().flat_map(|s| s.enemies.iter_mut())
    }

    pub fn enemy_count(&self) -> usize {
        self.sectors.values().map(|s| s.enemies.len()).sum()
    }

    /// Compact every sector's enemy list
    pub fn retain_enemies(&mut self, mut keep: impl FnMut(&Enemy) -> bool) {
        for sector in self.sectors.values_mut() {
            sector.enemies.retain(|e| keep(e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::SpawnBias;
    use crate::sim::state::EntityIds;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn with_ctx<R>(seed: u64, bias: SpawnBias, f: impl FnOnce(&mut SpawnContext<'_>) -> R) -> R {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ids = EntityIds::default();
        let mut ctx = SpawnContext {
            rng: &mut rng,
            ids: &mut ids,
            bias,
        };
        f(&mut ctx)
    }

    #[test]
    fn test_sector_containing() {
        assert_eq!(SectorCoord::containing(Vec2::new(512.0, 650.0)), SectorCoord::new(0, 0));
        assert_eq!(SectorCoord::containing(Vec2::new(1024.0, 2100.0)), SectorCoord::new(1, 2));
        assert_eq!(SectorCoord::containing(Vec2::new(-1.0, 0.0)), SectorCoord::new(-1, 0));
    }

    #[test]
    fn test_materialize_is_idempotent() {
        with_ctx(5, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            let coord = SectorCoord::new(3, 4);
            assert!(streamer.materialize(coord, 1, ctx));
            let before: Vec<u32> = streamer.sector(coord).unwrap().enemies.iter().map(|e| e.id).collect();
            assert!(!streamer.materialize(coord, 1, ctx));
            let after: Vec<u32> = streamer.sector(coord).unwrap().enemies.iter().map(|e| e.id).collect();
            assert_eq!(before, after);
        });
    }

    #[test]
    fn test_materialized_enemies_inside_sector() {
        with_ctx(11, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            let coord = SectorCoord::new(2, 7);
            streamer.materialize(coord, 4, ctx);
            let sector = streamer.sector(coord).unwrap();
            let count = sector.enemies.len() as u32;
            assert!((3 + 4..3 + 5 + 4).contains(&count), "count = {}", count);
            let origin = coord.origin();
            for e in &sector.enemies {
                assert!(e.pos.x >= origin.x && e.pos.x <= origin.x + SECTOR_SIZE);
                assert!(e.pos.y >= origin.y && e.pos.y <= origin.y + SECTOR_SIZE);
                assert_eq!(e.pattern, MovePattern::Linear);
            }
        });
    }

    #[test]
    fn test_left_handed_player_gets_left_half() {
        let bias = SpawnBias {
            left_bias: 0.2,
            ..Default::default()
        };
        with_ctx(2, bias, |ctx| {
            let mut streamer = SectorStreamer::new();
            let coord = SectorCoord::new(1, 1);
            streamer.materialize(coord, 1, ctx);
            let origin = coord.origin();
            for e in streamer.enemies() {
                assert!(e.pos.x <= origin.x + SECTOR_SIZE / 2.0);
            }
        });
    }

    #[test]
    fn test_update_loads_neighborhood_once() {
        with_ctx(1, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            assert!(streamer.update(Vec2::new(5000.0, 5000.0), 1, ctx));
            assert_eq!(streamer.resident_count(), 9);
            let count = streamer.enemy_count();

            // Same sector: nothing happens
            assert!(!streamer.update(Vec2::new(5010.0, 5010.0), 1, ctx));
            assert_eq!(streamer.enemy_count(), count);

            // One sector right: three new columns, none regenerated
            assert!(streamer.update(Vec2::new(5000.0 + SECTOR_SIZE, 5000.0), 1, ctx));
            assert_eq!(streamer.resident_count(), 12);
        });
    }

    #[test]
    fn test_world_edge_skips_outside_sectors() {
        with_ctx(1, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            streamer.update(Vec2::new(10.0, 10.0), 1, ctx);
            assert_eq!(streamer.resident_count(), 4);
            assert!(!streamer.is_generated(SectorCoord::new(-1, 0)));
        });
    }

    #[test]
    fn test_far_sectors_retired_and_never_regenerated() {
        with_ctx(8, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            let start = Vec2::new(5000.0, 5000.0);
            streamer.update(start, 1, ctx);
            let first = SectorCoord::containing(start);

            streamer.update(start + Vec2::new(SECTOR_SIZE * 5.0, 0.0), 1, ctx);
            assert!(streamer.sector(first).is_none());
            assert!(streamer.is_generated(first));

            streamer.update(start, 1, ctx);
            assert!(streamer.sector(first).is_none());
        });
    }

    #[test]
    fn test_moving_enemy_changes_owner_and_survives_retirement() {
        with_ctx(6, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            streamer.update(Vec2::new(5000.0, 5000.0), 1, ctx);
            let old = SectorCoord::new(3, 3);
            let new = SectorCoord::new(4, 7);
            let id = streamer.sector(old).unwrap().enemies[0].id;

            for e in streamer.enemies_mut().filter(|e| e.id == id) {
                e.pos = new.origin() + Vec2::splat(10.0);
            }
            assert!(streamer.rehome_enemies() >= 1);
            assert!(streamer.sector(old).unwrap().enemies.iter().all(|e| e.id != id));
            assert!(streamer.sector(new).unwrap().enemies.iter().any(|e| e.id == id));
            assert!(!streamer.is_generated(new));

            // Player follows: the spawn sector is retired, the enemy is not
            streamer.update(new.origin() + Vec2::splat(100.0), 1, ctx);
            assert!(streamer.sector(old).is_none());
            assert!(streamer.enemies().any(|e| e.id == id));

            // Generation adds to the migrant instead of replacing it
            assert!(streamer.is_generated(new));
            let owner = streamer.sector(new).unwrap();
            assert!(owner.enemies.iter().any(|e| e.id == id));
            assert!(owner.enemies.len() > 1);
        });
    }

    #[test]
    fn test_rehome_keeps_enemies_outside_world() {
        with_ctx(3, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            let coord = SectorCoord::new(0, 0);
            streamer.materialize(coord, 1, ctx);
            for e in streamer.enemies_mut() {
                e.pos.x = -5.0;
            }
            let count = streamer.enemy_count();
            assert_eq!(streamer.rehome_enemies(), 0);
            assert_eq!(streamer.sector(coord).unwrap().enemies.len(), count);
        });
    }

    #[test]
    fn test_retain_enemies_removes_from_owner() {
        with_ctx(4, SpawnBias::default(), |ctx| {
            let mut streamer = SectorStreamer::new();
            streamer.update(Vec2::new(5000.0, 5000.0), 1, ctx);
            let victim = streamer.enemies().next().unwrap().id;
            let total = streamer.enemy_count();
            streamer.retain_enemies(|e| e.id != victim);
            assert_eq!(streamer.enemy_count(), total - 1);
            assert!(streamer.enemies().all(|e| e.id != victim));
        });
    }
}
