//! Bounded notification feed
//!
//! Entries are kept newest-first by timestamp, whatever order producers append
//! them in. When the feed is full the oldest entry is evicted. The only
//! consumer-side mutation is `clear_all`.

use std::collections::VecDeque;
use tokio::sync::{broadcast, RwLock};

use super::entry::NotificationEntry;

/// Default number of entries kept
pub const DEFAULT_CAPACITY: usize = 50;

const EVENT_CAPACITY: usize = 64;

/// Published on every feed mutation
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Appended(NotificationEntry),
    Cleared,
}

/// Newest-first notification log with a fixed capacity
pub struct NotificationFeed {
    entries: RwLock<VecDeque<NotificationEntry>>,
    capacity: usize,
    events: broadcast::Sender<FeedEvent>,
}

impl NotificationFeed {
    /// Create a feed holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            events,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add an entry at its timestamp's place, evicting the oldest if the feed
    /// is full
    ///
    /// Entries with equal timestamps keep append order, latest first.
    pub async fn append(&self, entry: NotificationEntry) {
        {
            let mut entries = self.entries.write().await;
            let at = entries
                .iter()
                .position(|e| e.timestamp <= entry.timestamp)
                .unwrap_or(entries.len());
            entries.insert(at, entry.clone());
            while entries.len() > self.capacity {
                if let Some(evicted) = entries.pop_back() {
                    tracing::trace!(id = %evicted.id, "Evicted oldest notification");
                }
            }
        }

        tracing::info!(kind = %entry.kind, title = %entry.title, "Notification appended");
        let _ = self.events.send(FeedEvent::Appended(entry));
    }

    /// All entries, newest first
    pub async fn all(&self) -> Vec<NotificationEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Remove every entry
    pub async fn clear_all(&self) {
        let cleared = {
            let mut entries = self.entries.write().await;
            let count = entries.len();
            entries.clear();
            count
        };

        tracing::debug!(cleared, "Notifications cleared");
        let _ = self.events.send(FeedEvent::Cleared);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
