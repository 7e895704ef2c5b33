use std::collections::BTreeMap;

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ViewPage,
    ClickButton,
    Search,
    Conversion,
}

/// Client-side analytics event as posted by the web app.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    pub user_id: Option<String>,
    pub event_type: EventType,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventLog {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: Option<String>,
    pub event_type: EventType,
    pub path: String,
    pub meta: BTreeMap<String, String>,
    pub timestamp: DateTime,
}

impl From<LogEntry> for EventLog {
    fn from(entry: LogEntry) -> Self {
        let timestamp = entry
            .timestamp
            .map(|ts| DateTime::from_millis(ts.timestamp_millis()))
            .unwrap_or_else(DateTime::now);

        Self {
            id: None,
            user_id: entry.user_id,
            event_type: entry.event_type,
            path: entry.path,
            meta: entry.meta,
            timestamp,
        }
    }
}
