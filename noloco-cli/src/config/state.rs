//! Poll checkpoints persisted between CLI runs
//!
//! Stored as `state.toml` next to the config file, one timestamp per
//! `app/table/event` key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trigger::{PollCheckpoint, PollRequest};

pub const STATE_FILE: &str = "state.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    checkpoints: BTreeMap<String, DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    state: StateFile,
}

fn key(request: &PollRequest) -> String {
    format!("{}/{}/{}", request.app, request.table, request.event)
}

impl CheckpointStore {
    pub fn default_path() -> PathBuf {
        super::config_dir().join(STATE_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid state file: {}", path.display()))?
        } else {
            StateFile::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    pub fn get(&self, request: &PollRequest) -> PollCheckpoint {
        PollCheckpoint {
            last_timestamp: self.state.checkpoints.get(&key(request)).copied(),
        }
    }

    pub fn set(&mut self, request: &PollRequest, checkpoint: PollCheckpoint) {
        let key = key(request);
        match checkpoint.last_timestamp {
            Some(ts) => {
                self.state.checkpoints.insert(key, ts);
            }
            None => {
                self.state.checkpoints.remove(&key);
            }
        }
    }

    /// Forget the checkpoint so the next poll starts over
    pub fn reset(&mut self, request: &PollRequest) -> bool {
        self.state.checkpoints.remove(&key(request)).is_some()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(&self.state).context("Failed to serialize state")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        log::debug!("Saved {} checkpoint(s)", self.state.checkpoints.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerEvent;
    use chrono::TimeZone;

    #[test]
    fn test_checkpoints_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE);
        let created = PollRequest::new("crm", "contact", TriggerEvent::RecordCreated);
        let updated = PollRequest::new("crm", "contact", TriggerEvent::RecordUpdated);
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let mut store = CheckpointStore::load(&path).unwrap();
        assert_eq!(store.get(&created), PollCheckpoint::default());
        store.set(&created, PollCheckpoint::at(ts));
        store.save().unwrap();

        let store = CheckpointStore::load(&path).unwrap();
        assert_eq!(store.get(&created), PollCheckpoint::at(ts));
        assert_eq!(store.get(&updated), PollCheckpoint::default());
    }

    #[test]
    fn test_reset_and_empty_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let request = PollRequest::new("crm", "deal", TriggerEvent::RecordCreated);
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut store = CheckpointStore::load(&dir.path().join(STATE_FILE)).unwrap();
        store.set(&request, PollCheckpoint::at(ts));
        assert!(store.reset(&request));
        assert!(!store.reset(&request));

        store.set(&request, PollCheckpoint::at(ts));
        store.set(&request, PollCheckpoint::default());
        assert_eq!(store.get(&request).last_timestamp, None);
    }
}
