//! Browser LocalStorage backend (wasm32)

use super::{PersistError, ProfileStore, Result, decode_profile, encode_profile};
use crate::learning::LearningProfile;

/// LocalStorage key
pub const PROFILE_KEY: &str = "sector_shooter_profile";

#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistError::Unavailable("LocalStorage".into()))
    }
}

impl ProfileStore for LocalStorageStore {
    fn load_profile(&self) -> Result<Option<LearningProfile>> {
        let storage = Self::storage()?;
        match storage.get_item(PROFILE_KEY) {
            Ok(Some(json)) => decode_profile(&json).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(PersistError::Unavailable("LocalStorage read".into())),
        }
    }

    fn save_profile(&mut self, profile: &LearningProfile) -> Result<()> {
        let storage = Self::storage()?;
        let json = encode_profile(profile)?;
        storage
            .set_item(PROFILE_KEY, &json)
            .map_err(|_| PersistError::Unavailable("LocalStorage write".into()))
    }
}
