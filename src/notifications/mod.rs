//! Notification Feed
//!
//! An append-only log of alerts the dashboard surfaces, plus the monitor that
//! produces them from slice data.
//!
//! - **entry**: `NotificationEntry` and `NotificationKind`
//! - **feed**: bounded newest-first storage with `append` / `all` / `clear_all`
//! - **alerts**: `AlertMonitor`, turning price swings and severe weather into
//!   entries

pub mod alerts;
pub mod entry;
pub mod feed;

pub use alerts::{AlertConfig, AlertMonitor};
pub use entry::{NotificationEntry, NotificationKind};
pub use feed::{FeedEvent, NotificationFeed, DEFAULT_CAPACITY};
