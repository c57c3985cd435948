//! Record types delivered by the data gateways
//!
//! Field names follow the gateways' JSON (camelCase), so these types
//! deserialize straight from a response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record with a stable string key, unique within its slice
pub trait Keyed {
    /// The key used for favorites and partitioning
    fn key(&self) -> &str;
}

/// Current weather for a single city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    /// City name (slice key)
    pub city: String,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed
    pub wind_speed: f64,
    /// Free-text condition, e.g. "light rain"
    pub condition: String,
}

impl WeatherRecord {
    pub fn new(city: impl Into<String>, temperature: f64, condition: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            temperature,
            humidity: 0.0,
            wind_speed: 0.0,
            condition: condition.into(),
        }
    }

    /// Builder method: set humidity
    pub fn humidity(mut self, humidity: f64) -> Self {
        self.humidity = humidity;
        self
    }

    /// Builder method: set wind speed
    pub fn wind_speed(mut self, wind_speed: f64) -> Self {
        self.wind_speed = wind_speed;
        self
    }
}

impl Keyed for WeatherRecord {
    fn key(&self) -> &str {
        &self.city
    }
}

/// Market snapshot for a single cryptocurrency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CryptoRecord {
    /// Coin id, e.g. "bitcoin" (slice key)
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// Price in currency units
    pub price: f64,
    /// Signed 24 hour change in percent
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub market_cap: f64,
}

impl CryptoRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            price: 0.0,
            change_24h: 0.0,
            market_cap: 0.0,
        }
    }

    /// Builder method: set price
    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Builder method: set 24h change
    pub fn change_24h(mut self, change: f64) -> Self {
        self.change_24h = change;
        self
    }

    /// Builder method: set market cap
    pub fn market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = market_cap;
        self
    }

    /// True when the 24h change is zero or positive
    pub fn is_rising(&self) -> bool {
        self.change_24h >= 0.0
    }
}

impl Keyed for CryptoRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A single news headline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    /// Article id (slice key)
    pub id: String,
    pub title: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Keyed for NewsRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Which slice a record, event or config entry belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    Weather,
    Crypto,
    News,
}

impl SliceKind {
    /// Get all slice kinds for iteration
    pub fn all() -> &'static [SliceKind] {
        &[SliceKind::Weather, SliceKind::Crypto, SliceKind::News]
    }
}

impl std::fmt::Display for SliceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceKind::Weather => write!(f, "weather"),
            SliceKind::Crypto => write!(f, "crypto"),
            SliceKind::News => write!(f, "news"),
        }
    }
}

impl std::str::FromStr for SliceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weather" => Ok(SliceKind::Weather),
            "crypto" => Ok(SliceKind::Crypto),
            "news" => Ok(SliceKind::News),
            other => Err(format!("unknown slice: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_deserializes_gateway_json() {
        let json = r#"{
            "id": "bitcoin",
            "name": "Bitcoin",
            "symbol": "BTC",
            "price": 50000.0,
            "change24h": 2.5,
            "marketCap": 950000000000.0
        }"#;

        let record: CryptoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key(), "bitcoin");
        assert_eq!(record.change_24h, 2.5);
        assert_eq!(record.market_cap, 950000000000.0);
        assert!(record.is_rising());
    }

    #[test]
    fn test_weather_deserializes_gateway_json() {
        let json = r#"{
            "city": "London",
            "temperature": 12.5,
            "humidity": 81,
            "windSpeed": 4.2,
            "condition": "light rain"
        }"#;

        let record: WeatherRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key(), "London");
        assert_eq!(record.wind_speed, 4.2);
        assert_eq!(record.humidity, 81.0);
    }

    #[test]
    fn test_news_optional_description() {
        let json = r#"{
            "id": "a1",
            "title": "ETF inflows rise",
            "source": "Wire",
            "url": "https://example.com/a1",
            "publishedAt": "2024-05-01T08:30:00Z"
        }"#;

        let record: NewsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key(), "a1");
        assert!(record.description.is_none());
    }

    #[test]
    fn test_slice_kind_parse_and_display() {
        for kind in SliceKind::all() {
            let parsed: SliceKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!("stocks".parse::<SliceKind>().is_err());
        assert_eq!("Crypto".parse::<SliceKind>().unwrap(), SliceKind::Crypto);
    }
}
