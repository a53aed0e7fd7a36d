//! Wire format of the messaging channel.
//!
//! Incoming frames carry a download-task event, either bare or wrapped in a
//! `{"channel": ..., "event": ...}` envelope. Outgoing frames are
//! subscribe/unsubscribe requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle event of a download task, pushed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadTaskEvent {
    Created {
        task_id: String,
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    ProgressUpdate {
        task_id: String,
        /// Percentage, 0 to 100
        progress: f64,
        #[serde(default)]
        speed: Option<String>,
        #[serde(default)]
        eta_seconds: Option<u64>,
    },
    Completed {
        task_id: String,
        #[serde(default)]
        title: Option<String>,
        file_url: String,
    },
    Failed {
        task_id: String,
        error: String,
    },
}

impl DownloadTaskEvent {
    pub fn task_id(&self) -> &str {
        match self {
            DownloadTaskEvent::Created { task_id, .. }
            | DownloadTaskEvent::ProgressUpdate { task_id, .. }
            | DownloadTaskEvent::Completed { task_id, .. }
            | DownloadTaskEvent::Failed { task_id, .. } => task_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DownloadTaskEvent::Created { .. } => "created",
            DownloadTaskEvent::ProgressUpdate { .. } => "progress_update",
            DownloadTaskEvent::Completed { .. } => "completed",
            DownloadTaskEvent::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    channel: Option<String>,
    event: DownloadTaskEvent,
}

/// Decode a text frame received on `channel`.
///
/// `Ok(None)` means the frame is addressed to another channel or is a
/// control message (subscription acks and the like) rather than an event.
pub fn decode_frame(text: &str, channel: &str) -> Result<Option<DownloadTaskEvent>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;

    if value.get("event").is_some() {
        let envelope: Envelope = serde_json::from_value(value)?;
        return Ok(match envelope.channel.as_deref() {
            Some(other) if other != channel => None,
            _ => Some(envelope.event),
        });
    }

    if value.get("type").is_none() {
        return Ok(None);
    }
    serde_json::from_value(value).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Subscribe,
    Unsubscribe,
}

/// Outgoing subscription request.
#[derive(Serialize)]
pub struct ControlMessage<'a> {
    pub action: ControlAction,
    pub channel: &'a str,
    pub token: &'a str,
}

impl<'a> ControlMessage<'a> {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Channel carrying the events of one user's downloads.
pub fn user_channel(prefix: &str, user_id: &str) -> String {
    format!("{}.{}", prefix, user_id)
}
