//! JSON file backend (native)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ProfileStore, Result, decode_profile, encode_profile};
use crate::learning::LearningProfile;

/// Profile stored as a JSON file, written via a temporary sibling and rename
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "profile.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProfileStore for JsonFileStore {
    fn load_profile(&self) -> Result<Option<LearningProfile>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => decode_profile(&text).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_profile(&mut self, profile: &LearningProfile) -> Result<()> {
        let text = encode_profile(profile)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{PersistError, load_or_default};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sector-shooter-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("profile.json")
    }

    #[test]
    fn test_missing_file_is_none() {
        let store = JsonFileStore::new(scratch("missing"));
        assert!(store.load_profile().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("roundtrip");
        let mut store = JsonFileStore::new(&path);
        let profile = LearningProfile {
            sessions: 3,
            shots_fired: 99,
            total_frames: 1_000,
            ..Default::default()
        };
        store.save_profile(&profile).unwrap();

        assert!(path.exists());
        assert!(!store.tmp_path().exists());
        assert_eq!(store.load_profile().unwrap(), Some(profile));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file() {
        let path = scratch("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "][").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.load_profile(), Err(PersistError::Format(_))));
        assert_eq!(load_or_default(&store), LearningProfile::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
