//! Backend server health and log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health metrics reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServerHealth {
    pub status: String,
    #[serde(default)]
    pub uptime_seconds: u64,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub disk_usage: f64,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
}

impl ServerHealth {
    /// Placeholder shown when metrics cannot be fetched.
    pub fn unavailable() -> Self {
        Self {
            status: "unavailable".to_string(),
            uptime_seconds: 0,
            cpu_usage: 0.0,
            memory_usage: 0.0,
            disk_usage: 0.0,
            version: None,
            checked_at: Some(Utc::now()),
        }
    }
}

/// One backend log line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: Option<serde_json::Value>,
}
