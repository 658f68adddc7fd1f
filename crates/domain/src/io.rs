use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::{error::DomainError, progress::ProgressState};

/// Key-value style persistence for learner progress.
pub trait ProgressStore: Send {
    fn save(&self, state: &ProgressState) -> Result<(), DomainError>;
    fn load(&self) -> Result<Option<ProgressState>, DomainError>;
}

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
}

impl ProgressStore for JsonFileStore {
    fn save(&self, state: &ProgressState) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        // write-then-rename so a crash never leaves a truncated file behind
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<ProgressState>, DomainError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<ProgressState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<ProgressState> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl ProgressStore for MemoryStore {
    fn save(&self, state: &ProgressState) -> Result<(), DomainError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| DomainError::Io("memory store poisoned".into()))?;
        *slot = Some(state.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<ProgressState>, DomainError> {
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::RudimentCatalog, tempo::Tier};

    #[test]
    fn json_store_round_trips_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.json");
        let store = JsonFileStore::new(&path);
        let mut state = ProgressState::new(&RudimentCatalog::standard());
        state.achievements.insert(1, Tier::Silver);
        state.current_level = 2;
        state.sound_set = 2;
        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"silver\""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("progress.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, DomainError::Serialization(_)));
    }

    #[test]
    fn memory_store_shares_between_clones() {
        let store = MemoryStore::new();
        let observer = store.clone();
        let state = ProgressState::new(&RudimentCatalog::standard());
        store.save(&state).unwrap();
        assert_eq!(observer.snapshot(), Some(state));
    }
}
