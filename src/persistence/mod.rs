//! Learning profile persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic file writes (tmp → rename) on native
//! - LocalStorage on the web
//! - Corrupt or missing data falls back to a fresh profile

pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::learning::LearningProfile;

pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;
pub use memory::MemoryStore;

/// Envelope version written by this build
pub const PROFILE_VERSION: u32 = 1;

/// Persistence failures
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed profile data: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Unsupported profile version {0}")]
    UnsupportedVersion(u32),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// On-disk wrapper around the profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub version: u32,
    pub profile: LearningProfile,
}

/// Serialize a profile inside the current envelope
pub fn encode_profile(profile: &LearningProfile) -> Result<String> {
    let envelope = ProfileEnvelope {
        version: PROFILE_VERSION,
        profile: profile.clone(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse an envelope, rejecting versions this build does not know
pub fn decode_profile(text: &str) -> Result<LearningProfile> {
    let envelope: ProfileEnvelope = serde_json::from_str(text)?;
    if envelope.version != PROFILE_VERSION {
        return Err(PersistError::UnsupportedVersion(envelope.version));
    }
    Ok(envelope.profile)
}

/// Where the learning profile lives between sessions
pub trait ProfileStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load_profile(&self) -> Result<Option<LearningProfile>>;
    fn save_profile(&mut self, profile: &LearningProfile) -> Result<()>;
}

/// Load the profile, substituting a fresh one on any failure
pub fn load_or_default(store: &dyn ProfileStore) -> LearningProfile {
    match store.load_profile() {
        Ok(Some(profile)) => {
            log::info!(
                "Loaded learning profile ({} sessions, {} frames)",
                profile.sessions,
                profile.total_frames
            );
            profile
        }
        Ok(None) => {
            log::info!("No learning profile found, starting fresh");
            LearningProfile::default()
        }
        Err(e) => {
            log::warn!("Discarding unreadable learning profile: {}", e);
            LearningProfile::default()
        }
    }
}

/// Save without interrupting play; failures are logged
pub fn save_best_effort(store: &mut dyn ProfileStore, profile: &LearningProfile) -> bool {
    match store.save_profile(profile) {
        Ok(()) => {
            log::info!("Learning profile saved ({} sessions)", profile.sessions);
            true
        }
        Err(e) => {
            log::warn!("Failed to save learning profile: {}", e);
            false
        }
    }
}
