//! Application Store
//!
//! `AppStore` is the single owner of dashboard state. It is built once and
//! handed by reference to whatever presents or drives the state; there is no
//! global instance.
//!
//! ```text
//!   AppStore
//!   ├── weather: Slice<WeatherRecord>  ◀── HttpGateway (weather_url)
//!   ├── crypto:  Slice<CryptoRecord>   ◀── HttpGateway (crypto_url)
//!   ├── news:    Slice<NewsRecord>     ◀── HttpGateway (news_url)
//!   └── notifications: NotificationFeed ◀── AlertMonitor
//! ```

mod persist;

pub use persist::{FavoritesFile, FavoritesSnapshot, PersistError};

use futures_util::future::join3;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::domain::{CryptoRecord, NewsRecord, SliceKind, WeatherRecord};
use crate::gateway::{Gateway, GatewayResult, HttpGateway};
use crate::notifications::{AlertMonitor, NotificationFeed};
use crate::scheduler::{PollHandle, Poller};
use crate::slice::{FetchOutcome, Slice};

/// The gateways backing each slice
pub struct Gateways {
    pub weather: Arc<dyn Gateway<WeatherRecord>>,
    pub crypto: Arc<dyn Gateway<CryptoRecord>>,
    pub news: Arc<dyn Gateway<NewsRecord>>,
}

impl Gateways {
    /// HTTP gateways for the endpoints in `config`
    pub fn http(config: &Config) -> GatewayResult<Self> {
        Ok(Self {
            weather: Arc::new(HttpGateway::<WeatherRecord>::new(
                config.gateway_config(SliceKind::Weather),
            )?),
            crypto: Arc::new(HttpGateway::<CryptoRecord>::new(
                config.gateway_config(SliceKind::Crypto),
            )?),
            news: Arc::new(HttpGateway::<NewsRecord>::new(
                config.gateway_config(SliceKind::News),
            )?),
        })
    }
}

/// Outcome of refreshing every slice at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub weather: FetchOutcome,
    pub crypto: FetchOutcome,
    pub news: FetchOutcome,
}

/// Owner of all dashboard state
pub struct AppStore {
    weather: Arc<Slice<WeatherRecord>>,
    crypto: Arc<Slice<CryptoRecord>>,
    news: Arc<Slice<NewsRecord>>,
    notifications: Arc<NotificationFeed>,
    config: Config,
}

impl AppStore {
    /// Build the store with empty slices and no favorites
    pub fn new(config: Config, gateways: Gateways) -> Self {
        Self::with_favorites(config, gateways, FavoritesSnapshot::default())
    }

    /// Build the store with favorites restored from a snapshot
    pub fn with_favorites(config: Config, gateways: Gateways, favorites: FavoritesSnapshot) -> Self {
        let FavoritesSnapshot {
            weather,
            crypto,
            news,
        } = favorites;

        Self {
            weather: Arc::new(Slice::with_favorites(
                SliceKind::Weather,
                gateways.weather,
                weather,
            )),
            crypto: Arc::new(Slice::with_favorites(
                SliceKind::Crypto,
                gateways.crypto,
                crypto,
            )),
            news: Arc::new(Slice::with_favorites(SliceKind::News, gateways.news, news)),
            notifications: Arc::new(NotificationFeed::new(config.notifications.capacity)),
            config,
        }
    }

    /// Build the store, restoring favorites from the configured file
    ///
    /// An unreadable favorites file is logged and ignored.
    pub fn open(config: Config, gateways: Gateways) -> Self {
        let favorites = match config.favorites_path() {
            Some(path) => match FavoritesFile::load(&path) {
                Ok(snapshot) => {
                    tracing::info!(path = ?path, favorites = snapshot.total(), "Loaded favorites");
                    snapshot
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Ignoring unreadable favorites file");
                    FavoritesSnapshot::default()
                }
            },
            None => FavoritesSnapshot::default(),
        };

        Self::with_favorites(config, gateways, favorites)
    }

    pub fn weather(&self) -> &Arc<Slice<WeatherRecord>> {
        &self.weather
    }

    pub fn crypto(&self) -> &Arc<Slice<CryptoRecord>> {
        &self.crypto
    }

    pub fn news(&self) -> &Arc<Slice<NewsRecord>> {
        &self.news
    }

    pub fn notifications(&self) -> &Arc<NotificationFeed> {
        &self.notifications
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch one slice
    pub async fn fetch(&self, kind: SliceKind) -> FetchOutcome {
        match kind {
            SliceKind::Weather => self.weather.fetch().await,
            SliceKind::Crypto => self.crypto.fetch().await,
            SliceKind::News => self.news.fetch().await,
        }
    }

    /// Toggle a favorite on one slice
    pub async fn toggle_favorite(&self, kind: SliceKind, key: &str) -> bool {
        match kind {
            SliceKind::Weather => self.weather.toggle_favorite(key).await,
            SliceKind::Crypto => self.crypto.toggle_favorite(key).await,
            SliceKind::News => self.news.toggle_favorite(key).await,
        }
    }

    /// Fetch every slice concurrently
    pub async fn refresh_all(&self) -> RefreshReport {
        let (weather, crypto, news) =
            join3(self.weather.fetch(), self.crypto.fetch(), self.news.fetch()).await;

        RefreshReport {
            weather,
            crypto,
            news,
        }
    }

    /// Start a poller per slice using the configured intervals
    pub fn start_polling(&self) -> Vec<PollHandle> {
        vec![
            Poller::start(&self.weather, self.config.poll_interval(SliceKind::Weather)),
            Poller::start(&self.crypto, self.config.poll_interval(SliceKind::Crypto)),
            Poller::start(&self.news, self.config.poll_interval(SliceKind::News)),
        ]
    }

    /// Start the alert monitor feeding this store's notifications
    pub fn start_alerts(&self) -> JoinHandle<()> {
        AlertMonitor::new(self.config.alert_config()).spawn(
            self.crypto.clone(),
            self.weather.clone(),
            self.notifications.clone(),
        )
    }

    /// Favorites of every slice
    pub async fn favorites_snapshot(&self) -> FavoritesSnapshot {
        FavoritesSnapshot {
            weather: self.weather.favorites().await,
            crypto: self.crypto.favorites().await,
            news: self.news.favorites().await,
        }
    }

    /// Write favorites to the configured file
    ///
    /// Fails with `PersistError::Disabled` when persistence is turned off.
    pub async fn save_favorites(&self) -> Result<(), PersistError> {
        let Some(path) = self.config.favorites_path() else {
            return Err(PersistError::Disabled);
        };

        let snapshot = self.favorites_snapshot().await;
        FavoritesFile::save(&path, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::ScriptedGateway;
    use crate::notifications::NotificationEntry;
    use crate::slice::LoadStatus;
    use chrono::Utc;

    fn news_item(id: &str) -> NewsRecord {
        NewsRecord {
            id: id.to_string(),
            title: format!("Headline {}", id),
            source: "Wire".to_string(),
            url: format!("https://example.com/{}", id),
            published_at: Utc::now(),
            description: None,
        }
    }

    fn gateways() -> Gateways {
        Gateways {
            weather: Arc::new(ScriptedGateway::new(vec![Ok(vec![WeatherRecord::new(
                "London", 12.0, "overcast",
            )])])),
            crypto: Arc::new(ScriptedGateway::<CryptoRecord>::new(vec![Err(
                "network down".to_string(),
            )])),
            news: Arc::new(ScriptedGateway::new(vec![Ok(vec![news_item("a1")])])),
        }
    }

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.state.favorites_path = dir.join("favorites.json").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_new_store_is_idle() {
        let store = AppStore::new(Config::default(), gateways());

        for kind in SliceKind::all() {
            let status = match kind {
                SliceKind::Weather => store.weather().status().await,
                SliceKind::Crypto => store.crypto().status().await,
                SliceKind::News => store.news().status().await,
            };
            assert_eq!(status, LoadStatus::Idle);
        }
        assert!(store.notifications().is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_all_is_independent_per_slice() {
        let store = AppStore::new(Config::default(), gateways());

        let report = store.refresh_all().await;

        assert_eq!(report.weather, FetchOutcome::Applied(LoadStatus::Succeeded));
        assert_eq!(report.crypto, FetchOutcome::Applied(LoadStatus::Failed));
        assert_eq!(report.news, FetchOutcome::Applied(LoadStatus::Succeeded));
        assert_eq!(store.news().state().await.data.len(), 1);
        assert_eq!(
            store.crypto().state().await.error.as_deref(),
            Some("network down")
        );
    }

    #[tokio::test]
    async fn test_toggle_through_store() {
        let store = AppStore::new(Config::default(), gateways());

        assert!(store.toggle_favorite(SliceKind::Crypto, "bitcoin").await);
        assert!(store.crypto().is_favorite("bitcoin").await);
        assert!(!store.weather().is_favorite("bitcoin").await);

        let snapshot = store.favorites_snapshot().await;
        assert_eq!(snapshot.total(), 1);
    }

    #[tokio::test]
    async fn test_favorites_persist_across_stores() {
        let dir = tempfile::tempdir().unwrap();

        let store = AppStore::open(config_in(dir.path()), gateways());
        store.toggle_favorite(SliceKind::Weather, "London").await;
        store.toggle_favorite(SliceKind::News, "a1").await;
        store.save_favorites().await.unwrap();
        drop(store);

        let reopened = AppStore::open(config_in(dir.path()), gateways());
        assert!(reopened.weather().is_favorite("London").await);
        assert!(reopened.news().is_favorite("a1").await);
        assert_eq!(reopened.weather().status().await, LoadStatus::Idle);
    }

    #[tokio::test]
    async fn test_corrupt_favorites_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("favorites.json"), "not json").unwrap();

        let store = AppStore::open(config_in(dir.path()), gateways());
        assert!(store.favorites_snapshot().await.total() == 0);
    }

    #[tokio::test]
    async fn test_save_without_persistence_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.state.persist_favorites = false;
        let store = AppStore::new(config, gateways());

        store.toggle_favorite(SliceKind::Crypto, "bitcoin").await;

        let err = store.save_favorites().await.unwrap_err();
        assert!(matches!(err, PersistError::Disabled));
        assert!(!dir.path().join("favorites.json").exists());
    }

    #[tokio::test]
    async fn test_notifications_clear_all() {
        let store = AppStore::new(Config::default(), gateways());
        store
            .notifications()
            .append(NotificationEntry::price_alert("Bitcoin up 6.00%", "BTC"))
            .await;

        store.notifications().clear_all().await;

        assert!(store.notifications().all().await.is_empty());
    }
}
