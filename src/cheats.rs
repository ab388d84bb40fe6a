//! Cheat contract
//!
//! Cheats are a closed set queried by kind. A [`CheatSource`] decides which
//! ones are on; the session samples it once per frame into [`CheatFlags`].

use serde::{Deserialize, Serialize};

/// Toggleable cheats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheatKind {
    /// Halved fire cooldown
    RapidFire,
    /// No damage from bullets or rams
    Invincibility,
    /// Player bullets steer toward the nearest enemy
    AutoTarget,
    /// Every hit is lethal
    OneHitKill,
}

impl CheatKind {
    pub const ALL: [CheatKind; 4] = [
        CheatKind::RapidFire,
        CheatKind::Invincibility,
        CheatKind::AutoTarget,
        CheatKind::OneHitKill,
    ];

    /// Wave at which the cheat becomes available
    pub fn unlock_wave(&self) -> u32 {
        match self {
            CheatKind::RapidFire => 2,
            CheatKind::AutoTarget => 3,
            CheatKind::Invincibility => 5,
            CheatKind::OneHitKill => 8,
        }
    }
}

/// One-shot effects a cheat source can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheatEffect {
    ExtraLife,
}

/// Cheat state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheatFlags {
    pub rapid_fire: bool,
    pub invincibility: bool,
    pub auto_target: bool,
    pub one_hit_kill: bool,
}

impl CheatFlags {
    /// Sample every cheat from a source
    pub fn from_source(source: &dyn CheatSource) -> Self {
        let mut flags = Self::default();
        for kind in CheatKind::ALL {
            flags.set(kind, source.is_active(kind));
        }
        flags
    }

    pub fn is_active(&self, kind: CheatKind) -> bool {
        match kind {
            CheatKind::RapidFire => self.rapid_fire,
            CheatKind::Invincibility => self.invincibility,
            CheatKind::AutoTarget => self.auto_target,
            CheatKind::OneHitKill => self.one_hit_kill,
        }
    }

    pub fn set(&mut self, kind: CheatKind, on: bool) {
        match kind {
            CheatKind::RapidFire => self.rapid_fire = on,
            CheatKind::Invincibility => self.invincibility = on,
            CheatKind::AutoTarget => self.auto_target = on,
            CheatKind::OneHitKill => self.one_hit_kill = on,
        }
    }
}

/// Anything that can answer cheat queries
pub trait CheatSource {
    fn is_active(&self, kind: CheatKind) -> bool;

    /// Called whenever a new wave starts
    fn update_unlocks(&mut self, _wave: u32) {}

    /// One-shot effects requested since the last call
    fn take_effects(&mut self) -> Vec<CheatEffect> {
        Vec::new()
    }
}

/// Wave-gated cheat menu state
#[derive(Debug, Clone, Default)]
pub struct CheatBook {
    unlocked_through: u32,
    active: CheatFlags,
    pending: Vec<CheatEffect>,
}

impl CheatBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, kind: CheatKind) -> bool {
        kind.unlock_wave() <= self.unlocked_through
    }

    /// Flip a cheat. Locked cheats stay off; returns the new state.
    pub fn toggle(&mut self, kind: CheatKind) -> bool {
        if !self.is_unlocked(kind) {
            log::debug!("{:?} is locked until wave {}", kind, kind.unlock_wave());
            return false;
        }
        let on = !self.active.is_active(kind);
        self.active.set(kind, on);
        log::info!("Cheat {:?} {}", kind, if on { "on" } else { "off" });
        on
    }

    /// Queue a one-shot effect
    pub fn trigger(&mut self, effect: CheatEffect) {
        self.pending.push(effect);
    }
}

impl CheatSource for CheatBook {
    fn is_active(&self, kind: CheatKind) -> bool {
        self.active.is_active(kind)
    }

    fn update_unlocks(&mut self, wave: u32) {
        if wave > self.unlocked_through {
            for kind in CheatKind::ALL {
                if kind.unlock_wave() > self.unlocked_through && kind.unlock_wave() <= wave {
                    log::info!("Cheat unlocked: {:?}", kind);
                }
            }
            self.unlocked_through = wave;
        }
    }

    fn take_effects(&mut self) -> Vec<CheatEffect> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_typed_lookup() {
        let mut flags = CheatFlags::default();
        for kind in CheatKind::ALL {
            assert!(!flags.is_active(kind));
            flags.set(kind, true);
            assert!(flags.is_active(kind));
        }
        assert_eq!(
            flags,
            CheatFlags {
                rapid_fire: true,
                invincibility: true,
                auto_target: true,
                one_hit_kill: true,
            }
        );
    }

    #[test]
    fn test_locked_cheats_stay_off() {
        let mut book = CheatBook::new();
        assert!(!book.toggle(CheatKind::RapidFire));
        book.update_unlocks(2);
        assert!(book.toggle(CheatKind::RapidFire));
        assert!(!book.toggle(CheatKind::OneHitKill));

        let flags = CheatFlags::from_source(&book);
        assert!(flags.rapid_fire);
        assert!(!flags.one_hit_kill);

        assert!(!book.toggle(CheatKind::RapidFire));
        assert!(!CheatFlags::from_source(&book).rapid_fire);
    }

    #[test]
    fn test_unlocks_never_regress() {
        let mut book = CheatBook::new();
        book.update_unlocks(5);
        book.update_unlocks(1);
        assert!(book.is_unlocked(CheatKind::Invincibility));
    }

    #[test]
    fn test_effects_drained_once() {
        let mut book = CheatBook::new();
        book.trigger(CheatEffect::ExtraLife);
        assert_eq!(book.take_effects(), vec![CheatEffect::ExtraLife]);
        assert!(book.take_effects().is_empty());
    }
}
