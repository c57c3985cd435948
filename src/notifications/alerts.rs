//! Alert Monitor
//!
//! Watches the crypto and weather slices and appends notifications when a
//! coin moves more than the configured threshold in 24h or a city reports
//! severe weather. Alerts are edge-triggered per record key: an alert fires
//! when the condition starts and again only after it has cleared.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::entry::NotificationEntry;
use super::feed::NotificationFeed;
use crate::domain::{CryptoRecord, Keyed, WeatherRecord};
use crate::slice::{LoadStatus, Slice, SliceEvent};

/// Thresholds for raising alerts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    /// Absolute 24h change in percent that raises a price alert
    pub price_change_threshold: f64,
    /// Case-insensitive substrings of a weather condition that raise an alert
    pub severe_keywords: Vec<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            price_change_threshold: 5.0,
            severe_keywords: [
                "thunder",
                "storm",
                "blizzard",
                "heavy rain",
                "hurricane",
                "tornado",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Turns slice data into notification entries
pub struct AlertMonitor {
    config: AlertConfig,
    active_price: HashSet<String>,
    active_weather: HashSet<String>,
}

impl AlertMonitor {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            active_price: HashSet::new(),
            active_weather: HashSet::new(),
        }
    }

    /// Price alerts for coins that newly crossed the threshold
    pub fn evaluate_crypto(&mut self, data: &[CryptoRecord]) -> Vec<NotificationEntry> {
        let threshold = self.config.price_change_threshold;
        let triggered: Vec<&CryptoRecord> = data
            .iter()
            .filter(|coin| coin.change_24h.abs() >= threshold)
            .collect();

        let alerts = triggered
            .iter()
            .filter(|coin| !self.active_price.contains(coin.key()))
            .map(|coin| price_alert(coin))
            .collect();

        self.active_price = triggered.iter().map(|c| c.key().to_string()).collect();
        alerts
    }

    /// Weather alerts for cities that newly report a severe condition
    pub fn evaluate_weather(&mut self, data: &[WeatherRecord]) -> Vec<NotificationEntry> {
        let triggered: Vec<&WeatherRecord> = data
            .iter()
            .filter(|city| self.is_severe(&city.condition))
            .collect();

        let alerts = triggered
            .iter()
            .filter(|city| !self.active_weather.contains(city.key()))
            .map(|city| weather_alert(city))
            .collect();

        self.active_weather = triggered.iter().map(|c| c.key().to_string()).collect();
        alerts
    }

    fn is_severe(&self, condition: &str) -> bool {
        let condition = condition.to_lowercase();
        self.config
            .severe_keywords
            .iter()
            .any(|keyword| condition.contains(&keyword.to_lowercase()))
    }

    /// Run the monitor against live slices
    ///
    /// The task holds only weak references and ends once both slices are
    /// dropped.
    pub fn spawn(
        mut self,
        crypto: Arc<Slice<CryptoRecord>>,
        weather: Arc<Slice<WeatherRecord>>,
        feed: Arc<NotificationFeed>,
    ) -> JoinHandle<()> {
        let mut crypto_rx = crypto.subscribe();
        let mut weather_rx = weather.subscribe();
        let crypto = Arc::downgrade(&crypto);
        let weather = Arc::downgrade(&weather);

        tokio::spawn(async move {
            let mut crypto_open = true;
            let mut weather_open = true;

            while crypto_open || weather_open {
                tokio::select! {
                    event = crypto_rx.recv(), if crypto_open => {
                        match should_evaluate(event) {
                            Evaluate::Yes => {
                                if let Some(slice) = crypto.upgrade() {
                                    let data = slice.state().await.data;
                                    for entry in self.evaluate_crypto(&data) {
                                        feed.append(entry).await;
                                    }
                                }
                            }
                            Evaluate::No => {}
                            Evaluate::Closed => crypto_open = false,
                        }
                    }
                    event = weather_rx.recv(), if weather_open => {
                        match should_evaluate(event) {
                            Evaluate::Yes => {
                                if let Some(slice) = weather.upgrade() {
                                    let data = slice.state().await.data;
                                    for entry in self.evaluate_weather(&data) {
                                        feed.append(entry).await;
                                    }
                                }
                            }
                            Evaluate::No => {}
                            Evaluate::Closed => weather_open = false,
                        }
                    }
                }
            }

            tracing::debug!("Alert monitor stopped");
        })
    }
}

enum Evaluate {
    Yes,
    No,
    Closed,
}

fn should_evaluate(event: Result<SliceEvent, RecvError>) -> Evaluate {
    match event {
        Ok(SliceEvent::StatusChanged {
            status: LoadStatus::Succeeded,
            ..
        }) => Evaluate::Yes,
        Ok(_) => Evaluate::No,
        // Missed events; the current data is still worth a look
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Alert monitor lagged behind slice events");
            Evaluate::Yes
        }
        Err(RecvError::Closed) => Evaluate::Closed,
    }
}

fn price_alert(coin: &CryptoRecord) -> NotificationEntry {
    let direction = if coin.is_rising() { "up" } else { "down" };
    NotificationEntry::price_alert(
        format!("{} {} {:.2}%", coin.name, direction, coin.change_24h.abs()),
        format!(
            "{} is trading at ${:.2} ({:+.2}% in 24h)",
            coin.symbol, coin.price, coin.change_24h
        ),
    )
}

fn weather_alert(city: &WeatherRecord) -> NotificationEntry {
    NotificationEntry::weather_alert(
        format!("Severe weather in {}", city.city),
        format!(
            "{} reported: {:.1}°C, wind {:.1}",
            city.condition, city.temperature, city.wind_speed
        ),
    )
}
