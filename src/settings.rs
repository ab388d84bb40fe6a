//! Game settings and preferences
//!
//! Stored as JSON: a file on native, LocalStorage on the web. Unknown or
//! missing keys fall back to defaults so older files keep loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::audio::AudioBus;
pub use crate::sim::state::WorldMode;
use crate::sim::tick::TickInput;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed arena or streamed open world
    pub mode: WorldMode,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Storage ===
    /// Learning profile location (native only)
    pub profile_path: PathBuf,

    // === LAN ===
    /// Act as host when a peer link is attached
    pub lan_host: bool,

    // === Demo ===
    /// Let the autopilot play
    pub autopilot: bool,
    /// Stop a headless run after this many frames
    pub demo_frames: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: WorldMode::Arena,
            seed: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            profile_path: PathBuf::from("sector_shooter_profile.json"),

            lan_host: false,

            autopilot: false,
            demo_frames: 36_000,
        }
    }
}

impl Settings {
    /// Push the audio preferences into a bus
    pub fn apply_audio(&self, bus: &mut AudioBus) {
        bus.set_master_volume(self.master_volume);
        bus.set_sfx_volume(self.sfx_volume);
        bus.set_muted(self.muted);
    }

    /// Configured seed, or one drawn from the OS
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Input for runs with no player attached: the autopilot when enabled,
    /// otherwise an idle ship
    pub fn unattended_input(&self) -> TickInput {
        TickInput {
            autopilot: self.autopilot,
            ..Default::default()
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sector_shooter_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring malformed settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        else {
            log::warn!("Settings not saved: LocalStorage unavailable");
            return;
        };

        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Settings not saved: {}", e);
                return;
            }
        };
        match storage.set_item(Self::STORAGE_KEY, &json) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {:?}", e),
        }
    }

    /// Load settings from a JSON file; any failure yields defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&text) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"mode": "open_world", "seed": 42}"#).unwrap();
        assert_eq!(settings.mode, WorldMode::OpenWorld);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.master_volume, 0.8);
        assert!(!settings.autopilot);
    }

    #[test]
    fn test_fixed_seed_is_used() {
        let settings = Settings {
            seed: Some(7),
            ..Default::default()
        };
        assert_eq!(settings.resolve_seed(), 7);
    }

    #[test]
    fn test_unattended_input_follows_autopilot() {
        let settings = Settings {
            autopilot: true,
            ..Default::default()
        };
        let input = settings.unattended_input();
        assert!(input.autopilot);
        assert!(!input.fire && !input.left && !input.toggle_menu);
        assert!(!Settings::default().unattended_input().autopilot);
    }

    #[test]
    fn test_apply_audio() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Default::default()
        };
        let mut bus = AudioBus::silent();
        settings.apply_audio(&mut bus);
        assert!((bus.effective_volume() - 0.25).abs() < 1e-6);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_roundtrip_and_fallback() {
        let dir = std::env::temp_dir().join(format!("sector-shooter-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let settings = Settings {
            mode: WorldMode::OpenWorld,
            autopilot: true,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());

        assert_eq!(Settings::load_from(&dir.join("missing.json")), Settings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
