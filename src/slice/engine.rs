//! Slice state machine
//!
//! Wraps one gateway and one `SliceState`. All mutations go through the
//! slice's lock, so fetch resolutions and favorite toggles are serialized per
//! slice; the lock is never held while the gateway call is in flight.
//!
//! The stored state only ever holds settled resolutions. `Pending` is derived:
//! a slice reads as pending while some fetch newer than the last applied one is
//! still in flight. A fetch that is abandoned before it resolves therefore
//! leaves the previous status and error exactly as they were.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

use super::favorites::{self, Partition};
use super::state::{LoadStatus, SliceEvent, SliceState};
use crate::domain::{Keyed, SliceKind};
use crate::gateway::Gateway;

/// Capacity of each slice's event channel
const EVENT_CAPACITY: usize = 64;

/// Message recorded when a gateway error renders as an empty string
const FALLBACK_ERROR: &str = "Failed to fetch data";

/// What happened to a fetch once its gateway call resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The resolution was applied with this status
    Applied(LoadStatus),
    /// A newer fetch had already been applied; this resolution was dropped
    Superseded,
}

struct Inner<T> {
    /// Last settled state; `status` is never `Pending` here
    state: SliceState<T>,
    /// Sequence number of the last resolution applied to `state`
    applied_seq: u64,
}

impl<T> Inner<T> {
    fn has_newer(&self, in_flight: &BTreeSet<u64>) -> bool {
        in_flight.range(self.applied_seq + 1..).next().is_some()
    }
}

/// One independently owned partition of dashboard state
pub struct Slice<T> {
    kind: SliceKind,
    gateway: Arc<dyn Gateway<T>>,
    inner: RwLock<Inner<T>>,
    /// Sequence numbers of fetches whose gateway call has not resolved
    in_flight: Mutex<BTreeSet<u64>>,
    next_seq: AtomicU64,
    events: broadcast::Sender<SliceEvent>,
}

impl<T> Slice<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    /// Create an idle, empty slice
    pub fn new(kind: SliceKind, gateway: Arc<dyn Gateway<T>>) -> Self {
        Self::with_favorites(kind, gateway, BTreeSet::new())
    }

    /// Create an idle, empty slice with favorites restored from elsewhere
    pub fn with_favorites(
        kind: SliceKind,
        gateway: Arc<dyn Gateway<T>>,
        favorites: BTreeSet<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            kind,
            gateway,
            inner: RwLock::new(Inner {
                state: SliceState::with_favorites(favorites),
                applied_seq: 0,
            }),
            in_flight: Mutex::new(BTreeSet::new()),
            next_seq: AtomicU64::new(0),
            events,
        }
    }

    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> SliceState<T> {
        let inner = self.inner.read().await;
        let mut state = inner.state.clone();
        if inner.has_newer(&self.in_flight()) {
            state.status = LoadStatus::Pending;
            state.error = None;
        }
        state
    }

    pub async fn status(&self) -> LoadStatus {
        let inner = self.inner.read().await;
        self.visible_status(&inner)
    }

    pub async fn favorites(&self) -> BTreeSet<String> {
        self.inner.read().await.state.favorites.clone()
    }

    pub async fn is_favorite(&self, key: &str) -> bool {
        self.inner.read().await.state.is_favorite(key)
    }

    /// Receive an event for every transition of this slice
    ///
    /// A receiver that falls behind gets `RecvError::Lagged` and should
    /// re-read `state()`.
    pub fn subscribe(&self) -> broadcast::Receiver<SliceEvent> {
        self.events.subscribe()
    }

    /// Fetch from the gateway and apply the result
    ///
    /// On success the data is replaced wholesale. On failure the previous data
    /// is kept and `error` carries the gateway's message. Failures never
    /// escape this call. When fetches overlap, a resolution older than one
    /// already applied is dropped. If this future is dropped before the
    /// gateway resolves, the slice reads as it did before the fetch began.
    pub async fn fetch(&self) -> FetchOutcome {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight().insert(seq);
        let mut guard = InFlight {
            slice: self,
            seq,
            armed: true,
        };

        let status = self.status().await;
        if status == LoadStatus::Pending {
            self.publish_status(status, seq);
        }
        tracing::debug!(slice = %self.kind, gateway = self.gateway.name(), seq, "Fetch started");

        let result = self.gateway.fetch().await;

        let mut inner = self.inner.write().await;
        self.in_flight().remove(&seq);
        guard.armed = false;

        if seq <= inner.applied_seq {
            tracing::debug!(
                slice = %self.kind,
                seq,
                applied_seq = inner.applied_seq,
                "Dropping superseded fetch result"
            );
            // This request may have been the last one keeping the slice pending
            let visible = self.visible_status(&inner);
            if visible != LoadStatus::Pending {
                self.publish_status(visible, inner.applied_seq);
            }
            return FetchOutcome::Superseded;
        }
        inner.applied_seq = seq;

        match result {
            Ok(data) => {
                tracing::info!(slice = %self.kind, seq, records = data.len(), "Fetch succeeded");
                inner.state.data = data;
                inner.state.status = LoadStatus::Succeeded;
                inner.state.error = None;
                inner.state.last_updated = Some(Utc::now());
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.is_empty() {
                    message = FALLBACK_ERROR.to_string();
                }
                tracing::warn!(slice = %self.kind, seq, error = %message, "Fetch failed");
                inner.state.status = LoadStatus::Failed;
                inner.state.error = Some(message);
            }
        }

        let applied = inner.state.status;
        let visible = self.visible_status(&inner);
        drop(inner);

        self.publish_status(visible, seq);
        FetchOutcome::Applied(applied)
    }

    /// Add `key` to favorites if absent, remove it if present
    ///
    /// Returns whether the key is a favorite afterwards. The key does not
    /// have to exist in the current data.
    pub async fn toggle_favorite(&self, key: &str) -> bool {
        let favorited = {
            let mut inner = self.inner.write().await;
            favorites::toggle(&mut inner.state.favorites, key)
        };

        tracing::debug!(slice = %self.kind, key, favorited, "Favorite toggled");
        self.publish(SliceEvent::FavoritesChanged {
            slice: self.kind,
            key: key.to_string(),
            favorited,
        });

        favorited
    }

    /// Current data split into favorited and other records
    pub async fn partition(&self) -> Partition<T> {
        let inner = self.inner.read().await;
        favorites::partition(&inner.state.data, &inner.state.favorites)
    }

    fn in_flight(&self) -> MutexGuard<'_, BTreeSet<u64>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn visible_status(&self, inner: &Inner<T>) -> LoadStatus {
        if inner.has_newer(&self.in_flight()) {
            LoadStatus::Pending
        } else {
            inner.state.status
        }
    }

    fn publish_status(&self, status: LoadStatus, seq: u64) {
        self.publish(SliceEvent::StatusChanged {
            slice: self.kind,
            status,
            seq,
        });
    }

    fn publish(&self, event: SliceEvent) {
        // No receivers is fine: nobody is watching this slice right now
        let _ = self.events.send(event);
    }
}

/// Removes an abandoned fetch from the in-flight set
struct InFlight<'a, T> {
    slice: &'a Slice<T>,
    seq: u64,
    armed: bool,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        self.slice
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.seq);
        tracing::debug!(slice = %self.slice.kind, seq = self.seq, "Fetch abandoned");

        // A writer holding the lock publishes its own transition
        if let Ok(inner) = self.slice.inner.try_read() {
            let in_flight = self
                .slice
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !inner.has_newer(&in_flight) {
                let _ = self.slice.events.send(SliceEvent::StatusChanged {
                    slice: self.slice.kind,
                    status: inner.state.status,
                    seq: inner.applied_seq,
                });
            }
        }
    }
}
