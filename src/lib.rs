//! # Nexus
//!
//! State core for the CryptoWeather Nexus dashboard: weather, crypto and news
//! slices refreshed from HTTP gateways, user favorites, and a notification
//! feed fed by price and weather alerts.
//!
//! ## Modules
//!
//! - [`domain`]: Records held by each slice
//! - [`gateway`]: Data sources slices fetch from
//! - [`slice`]: Per-slice state machine, favorites and partitioning
//! - [`notifications`]: Bounded notification feed and alert monitor
//! - [`scheduler`]: Interval pollers with start/stop handles
//! - [`store`]: `AppStore`, the owner of all of the above
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nexus::{AppStore, Config, Gateways, SliceKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = AppStore::open(config.clone(), Gateways::http(&config)?);
//!
//!     // Refresh crypto prices every minute while the handle lives
//!     let _pollers = store.start_polling();
//!
//!     store.toggle_favorite(SliceKind::Crypto, "bitcoin").await;
//!     store.crypto().fetch().await;
//!
//!     let split = store.crypto().partition().await;
//!     println!("{} favorites, {} others", split.favorited.len(), split.others.len());
//!
//!     store.save_favorites().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod domain;
pub mod gateway;
pub mod notifications;
pub mod scheduler;
pub mod slice;
pub mod store;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LoggingConfig};

pub use domain::{CryptoRecord, Keyed, NewsRecord, SliceKind, WeatherRecord};

pub use gateway::{Gateway, GatewayError, GatewayResult, HttpGateway, HttpGatewayConfig};

pub use slice::{FetchOutcome, LoadStatus, Partition, Slice, SliceEvent, SliceState};

pub use notifications::{
    AlertConfig, AlertMonitor, FeedEvent, NotificationEntry, NotificationFeed, NotificationKind,
};

pub use scheduler::{PollHandle, Poller};

pub use store::{AppStore, FavoritesFile, FavoritesSnapshot, Gateways, PersistError, RefreshReport};
