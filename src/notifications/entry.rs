//! Notification entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What raised a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PriceAlert,
    WeatherAlert,
    Other,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::PriceAlert => write!(f, "price_alert"),
            NotificationKind::WeatherAlert => write!(f, "weather_alert"),
            NotificationKind::Other => write!(f, "other"),
        }
    }
}

/// A single entry in the notification feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEntry {
    /// Create an entry stamped with the current time
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn price_alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::PriceAlert, title, message)
    }

    pub fn weather_alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::WeatherAlert, title, message)
    }

    /// Builder method: override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serialization() {
        let entry = NotificationEntry::price_alert("Bitcoin up 6.20%", "BTC moved");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["type"], "price_alert");
        assert_eq!(json["title"], "Bitcoin up 6.20%");
        // RFC 3339 timestamp
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_entry_ids_unique() {
        let a = NotificationEntry::new(NotificationKind::Other, "a", "a");
        let b = NotificationEntry::new(NotificationKind::Other, "a", "a");
        assert_ne!(a.id, b.id);
    }
}
