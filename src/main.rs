//! Nexus CLI
//!
//! Runs the dashboard state core headless:
//! - Poll the weather, crypto and news gateways and log every transition
//! - Fetch a single slice once and print it
//! - Manage favorites
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nexus::config::generate_default_config;
use nexus::{
    AppStore, Config, FeedEvent, Gateways, LoadStatus, LoggingConfig, NotificationFeed,
    PersistError, Slice, SliceEvent, SliceKind,
};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weather, crypto and news dashboard state core")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll all gateways until interrupted
    Run,

    /// Fetch one slice once and print its state as JSON
    Fetch {
        /// Slice to fetch (weather, crypto, news)
        slice: SliceKind,
    },

    /// Toggle a favorite and save it
    Favorite {
        /// Slice the key belongs to (weather, crypto, news)
        slice: SliceKind,
        /// Record key (city name, coin id or article id)
        key: String,
    },

    /// List saved favorites
    Favorites,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    tracing::info!("Nexus v{}", env!("CARGO_PKG_VERSION"));

    let gateways = Gateways::http(&config).context("Failed to build HTTP gateways")?;
    let store = AppStore::open(config, gateways);

    match cli.command {
        Commands::Run => run(store).await,
        Commands::Fetch { slice } => fetch(&store, slice).await,
        Commands::Favorite { slice, key } => {
            if store.config().favorites_path().is_none() {
                bail!("Favorites persistence is disabled; set state.persist_favorites = true");
            }
            let favorited = store.toggle_favorite(slice, &key).await;
            store.save_favorites().await?;
            println!(
                "{} {} {} favorites",
                key,
                if favorited { "added to" } else { "removed from" },
                slice
            );
            Ok(())
        }
        Commands::Favorites => {
            let snapshot = store.favorites_snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("nexus={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Config written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

async fn run(store: AppStore) -> anyhow::Result<()> {
    let store = Arc::new(store);

    let mut watchers = vec![
        watch_slice(store.weather().clone()),
        watch_slice(store.crypto().clone()),
        watch_slice(store.news().clone()),
        watch_feed(store.notifications().clone()),
    ];

    if store.config().notifications.alerts_enabled {
        watchers.push(store.start_alerts());
    }

    let mut pollers = if store.config().polling.enabled {
        store.start_polling()
    } else {
        let report = store.refresh_all().await;
        tracing::info!(?report, "Polling disabled, refreshed once");
        Vec::new()
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down...");

    for poller in pollers.iter_mut() {
        poller.stop();
    }
    for watcher in watchers {
        watcher.abort();
    }

    match store.save_favorites().await {
        Ok(()) | Err(PersistError::Disabled) => {}
        Err(e) => tracing::error!(error = %e, "Failed to save favorites"),
    }

    tracing::info!("Nexus shutdown complete");
    Ok(())
}

async fn fetch(store: &AppStore, kind: SliceKind) -> anyhow::Result<()> {
    store.fetch(kind).await;

    let (json, status) = match kind {
        SliceKind::Weather => snapshot_json(store.weather()).await?,
        SliceKind::Crypto => snapshot_json(store.crypto()).await?,
        SliceKind::News => snapshot_json(store.news()).await?,
    };
    println!("{}", json);

    if status == LoadStatus::Failed {
        bail!("{} fetch failed", kind);
    }
    Ok(())
}

async fn snapshot_json<T>(slice: &Slice<T>) -> anyhow::Result<(String, LoadStatus)>
where
    T: nexus::Keyed + Clone + serde::Serialize + Send + Sync + 'static,
{
    let state = slice.state().await;
    Ok((serde_json::to_string_pretty(&state)?, state.status))
}

/// Log every transition of a slice, the way a view would re-render on it
fn watch_slice<T>(slice: Arc<Slice<T>>) -> tokio::task::JoinHandle<()>
where
    T: nexus::Keyed + Clone + Send + Sync + 'static,
{
    let mut rx = slice.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(SliceEvent::StatusChanged { slice: kind, status, seq }) => {
                    let state = slice.state().await;
                    match status {
                        _ if state.is_initial_load() => {
                            tracing::info!(slice = %kind, seq, "Initial load started")
                        }
                        LoadStatus::Failed => tracing::warn!(
                            slice = %kind,
                            seq,
                            error = state.error.as_deref().unwrap_or_default(),
                            stale_records = state.data.len(),
                            "Slice failed"
                        ),
                        _ => tracing::info!(
                            slice = %kind,
                            seq,
                            %status,
                            records = state.data.len(),
                            favorites = state.favorites.len(),
                            "Slice updated"
                        ),
                    }
                }
                Ok(SliceEvent::FavoritesChanged { slice: kind, key, favorited }) => {
                    tracing::info!(slice = %kind, %key, favorited, "Favorites changed");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Slice watcher lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn watch_feed(feed: Arc<NotificationFeed>) -> tokio::task::JoinHandle<()> {
    let mut rx = feed.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(FeedEvent::Appended(entry)) => {
                    let unread = feed.len().await;
                    tracing::info!(
                        kind = %entry.kind,
                        title = %entry.title,
                        message = %entry.message,
                        unread = unread,
                        "Notification"
                    );
                }
                Ok(FeedEvent::Cleared) => tracing::info!("Notifications cleared"),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    })
}
