//! Favorites file
//!
//! Favorites are the only state worth keeping across restarts. They are
//! stored as one JSON document keyed by slice.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Favorites of every slice
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FavoritesSnapshot {
    #[serde(default)]
    pub weather: BTreeSet<String>,
    #[serde(default)]
    pub crypto: BTreeSet<String>,
    #[serde(default)]
    pub news: BTreeSet<String>,
}

impl FavoritesSnapshot {
    pub fn total(&self) -> usize {
        self.weather.len() + self.crypto.len() + self.news.len()
    }
}

/// Errors reading or writing the favorites file
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid favorites file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Favorites persistence is disabled (state.persist_favorites = false)")]
    Disabled,
}

pub struct FavoritesFile;

impl FavoritesFile {
    /// Read the snapshot; a missing file is an empty snapshot
    pub fn load(path: &Path) -> Result<FavoritesSnapshot, PersistError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FavoritesSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the snapshot through a temp file and rename
    pub fn save(path: &Path, snapshot: &FavoritesSnapshot) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;

        tracing::debug!(path = ?path, favorites = snapshot.total(), "Saved favorites");
        Ok(())
    }
}
