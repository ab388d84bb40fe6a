//! In-memory backend for tests and headless runs

use std::cell::RefCell;
use std::rc::Rc;

use super::{ProfileStore, Result, decode_profile, encode_profile};
use crate::learning::LearningProfile;

#[derive(Debug, Default)]
struct Slot {
    raw: Option<String>,
    saves: u32,
}

/// Profile kept as encoded text. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Slot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with arbitrary (possibly malformed) text
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store.slot.borrow_mut().raw = Some(raw.into());
        store
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> u32 {
        self.slot.borrow().saves
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().raw.clone()
    }
}

impl ProfileStore for MemoryStore {
    fn load_profile(&self) -> Result<Option<LearningProfile>> {
        match self.slot.borrow().raw.as_deref() {
            Some(text) => decode_profile(text).map(Some),
            None => Ok(None),
        }
    }

    fn save_profile(&mut self, profile: &LearningProfile) -> Result<()> {
        let text = encode_profile(profile)?;
        let mut slot = self.slot.borrow_mut();
        slot.raw = Some(text);
        slot.saves += 1;
        Ok(())
    }
}
