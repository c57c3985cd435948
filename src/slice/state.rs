//! Slice state and transition events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::SliceKind;

/// Load status of a slice
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// A fetch is in flight
    Pending,
    /// The last applied fetch returned data
    Succeeded,
    /// The last applied fetch failed; `error` is set
    Failed,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "idle"),
            LoadStatus::Pending => write!(f, "pending"),
            LoadStatus::Succeeded => write!(f, "succeeded"),
            LoadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Snapshot of one slice
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SliceState<T> {
    /// Records from the last successful fetch, in gateway order
    pub data: Vec<T>,
    pub status: LoadStatus,
    /// Human-readable failure message, present only when `status` is `Failed`
    pub error: Option<String>,
    /// Favorited record keys, independent of `data`
    pub favorites: BTreeSet<String>,
    /// When `data` was last replaced
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> SliceState<T> {
    /// Empty, idle state with the given favorites
    pub fn with_favorites(favorites: BTreeSet<String>) -> Self {
        Self {
            data: Vec::new(),
            status: LoadStatus::Idle,
            error: None,
            favorites,
            last_updated: None,
        }
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.favorites.contains(key)
    }

    /// True while a fetch is in flight and nothing has loaded yet
    pub fn is_initial_load(&self) -> bool {
        self.status == LoadStatus::Pending && self.data.is_empty()
    }
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self::with_favorites(BTreeSet::new())
    }
}

/// Published by a slice on every state transition
#[derive(Debug, Clone, PartialEq)]
pub enum SliceEvent {
    /// The load status changed (including re-entering the same status)
    StatusChanged {
        slice: SliceKind,
        status: LoadStatus,
        /// Sequence number of the fetch that caused the transition
        seq: u64,
    },
    /// A key was added to or removed from favorites
    FavoritesChanged {
        slice: SliceKind,
        key: String,
        favorited: bool,
    },
}
