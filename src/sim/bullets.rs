//! Kill-count bullet progression
//!
//! Every kill makes bullets slightly bigger and faster; every ten kills add
//! one more bullet to the volley, fanned out around the firing axis.

use glam::Vec2;

use super::state::{Bullet, BulletMotion};
use crate::consts::{BULLET_BASE_HEIGHT, BULLET_BASE_SPEED, BULLET_BASE_WIDTH};

/// Size multiplier gained per kill
pub const SIZE_GROWTH_PER_KILL: f32 = 0.02;
/// Speed multiplier gained per kill
pub const SPEED_GROWTH_PER_KILL: f32 = 0.01;
/// Kills needed for each extra bullet
pub const KILLS_PER_EXTRA_BULLET: u64 = 10;
/// Largest volley
pub const MAX_VOLLEY: usize = 20;
/// Angle between neighboring bullets in a fan (radians)
pub const FAN_STEP: f32 = 0.1;
/// Sideways speed is damped relative to the axial speed
pub const FAN_LATERAL_FACTOR: f32 = 0.5;
/// Bullets leave this far above the shooter's top edge
pub const MUZZLE_OFFSET: f32 = 10.0;

/// Size multiplier: `1 + 0.02 * kills`
pub fn bullet_scale(kills: u64) -> f32 {
    1.0 + SIZE_GROWTH_PER_KILL * kills as f32
}

/// Speed magnitude: `base * (1 + 0.01 * kills)`
pub fn bullet_speed(kills: u64) -> f32 {
    BULLET_BASE_SPEED * (1.0 + SPEED_GROWTH_PER_KILL * kills as f32)
}

/// Bullets per trigger pull: `min(20, 1 + kills / 10)`
pub fn volley_size(kills: u64) -> usize {
    let count = 1 + kills / KILLS_PER_EXTRA_BULLET;
    count.min(MAX_VOLLEY as u64) as usize
}

/// Scaled bullet dimensions
pub fn bullet_size(kills: u64) -> Vec2 {
    Vec2::new(BULLET_BASE_WIDTH, BULLET_BASE_HEIGHT) * bullet_scale(kills)
}

/// Build the bullets fired by one trigger pull.
///
/// Bullets fire upward from the horizontal center of the shooter. A single
/// bullet carries a scalar vertical speed; a fan carries full velocity
/// vectors, ordered left to right.
pub fn fire_volley(kills: u64, shooter_pos: Vec2, shooter_size: Vec2) -> Vec<Bullet> {
    let size = bullet_size(kills);
    let speed = bullet_speed(kills);
    let count = volley_size(kills);
    let pos = Vec2::new(
        shooter_pos.x + shooter_size.x / 2.0 - size.x / 2.0,
        shooter_pos.y - MUZZLE_OFFSET,
    );

    if count == 1 {
        return vec![Bullet {
            pos,
            size,
            motion: BulletMotion::Vertical(-speed),
        }];
    }

    let center = (count - 1) as f32 / 2.0;
    (0..count)
        .map(|i| {
            let offset = (i as f32 - center) * FAN_STEP;
            let vel = Vec2::new(
                offset.sin() * speed * FAN_LATERAL_FACTOR,
                -speed * offset.cos(),
            );
            Bullet {
                pos,
                size,
                motion: BulletMotion::Vector(vel),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SHOOTER: Vec2 = Vec2::new(100.0, 500.0);
    const SHOOTER_SIZE: Vec2 = Vec2::new(50.0, 50.0);

    #[test]
    fn test_first_shot_is_single_base_bullet() {
        let volley = fire_volley(0, SHOOTER, SHOOTER_SIZE);
        assert_eq!(volley.len(), 1);
        let b = &volley[0];
        assert_eq!(b.size, Vec2::new(BULLET_BASE_WIDTH, BULLET_BASE_HEIGHT));
        assert_eq!(b.motion, BulletMotion::Vertical(-BULLET_BASE_SPEED));
        assert_eq!(b.pos, Vec2::new(123.0, 490.0));
    }

    #[test]
    fn test_kills_25_fires_three_bullet_fan() {
        let volley = fire_volley(25, SHOOTER, SHOOTER_SIZE);
        assert_eq!(volley.len(), 3);

        let expected_size = Vec2::new(BULLET_BASE_WIDTH, BULLET_BASE_HEIGHT) * 1.5;
        let speed = BULLET_BASE_SPEED * 1.25;
        for b in &volley {
            assert!((b.size - expected_size).length() < 1e-4);
            assert!(matches!(b.motion, BulletMotion::Vector(_)));
        }

        let vels: Vec<Vec2> = volley.iter().map(|b| b.velocity()).collect();
        // Center bullet flies straight at full speed
        assert!(vels[1].x.abs() < 1e-6);
        assert!((vels[1].y + speed).abs() < 1e-4);
        // Outer bullets mirror each other
        assert!((vels[0].x + vels[2].x).abs() < 1e-6);
        assert!((vels[0].y - vels[2].y).abs() < 1e-6);
        assert!(vels[0].x < 0.0 && vels[2].x > 0.0);
        assert!((vels[2].x - 0.1f32.sin() * speed * FAN_LATERAL_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_outer_bullets_diverge_more_in_bigger_fans() {
        let small = fire_volley(20, SHOOTER, SHOOTER_SIZE);
        let big = fire_volley(60, SHOOTER, SHOOTER_SIZE);
        let small_spread = small.last().unwrap().velocity().x / bullet_speed(20);
        let big_spread = big.last().unwrap().velocity().x / bullet_speed(60);
        assert!(big_spread > small_spread);
    }

    #[test]
    fn test_volley_capped_at_twenty() {
        assert_eq!(volley_size(189), 19);
        assert_eq!(volley_size(190), 20);
        assert_eq!(volley_size(10_000), 20);
        assert_eq!(fire_volley(10_000, SHOOTER, SHOOTER_SIZE).len(), 20);
    }

    proptest! {
        #[test]
        fn prop_progression_formulas(k in 0u64..100_000) {
            prop_assert_eq!(volley_size(k) as u64, (1 + k / 10).min(20));
            let expected = Vec2::new(BULLET_BASE_WIDTH, BULLET_BASE_HEIGHT) * (1.0 + 0.02 * k as f32);
            prop_assert_eq!(bullet_size(k), expected);
        }

        #[test]
        fn prop_progression_monotone(k in 0u64..100_000) {
            prop_assert!(volley_size(k + 1) >= volley_size(k));
            prop_assert!(bullet_scale(k + 1) >= bullet_scale(k));
            prop_assert!(bullet_speed(k + 1) >= bullet_speed(k));
        }

        #[test]
        fn prop_fan_shares_size(k in 10u64..500) {
            let volley = fire_volley(k, SHOOTER, SHOOTER_SIZE);
            prop_assert_eq!(volley.len(), volley_size(k));
            for b in &volley {
                prop_assert_eq!(b.size, volley[0].size);
            }
        }
    }
}
