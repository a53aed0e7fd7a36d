//! Download task model. Lifecycle is owned by the backend; the web layer only observes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What the user asked to download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    #[default]
    Video,
    Audio,
    Thumbnail,
}

impl DownloadType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "thumbnail" => Some(Self::Thumbnail),
            _ => None,
        }
    }
}

/// Backend-reported task status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    #[default]
    Created,
    Processing,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Download task record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadTask {
    pub id: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub download_type: DownloadType,
    #[serde(default)]
    pub status: DownloadStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload submitted to start a download
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    pub url: String,
    #[serde(rename = "type", default)]
    pub download_type: DownloadType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_parses_minimal_payload() {
        let task: DownloadTask =
            serde_json::from_str(r#"{"id":"t1","url":"https://v.example/1"}"#).unwrap();
        assert_eq!(task.status, DownloadStatus::Created);
        assert_eq!(task.download_type, DownloadType::Video);
        assert_eq!(task.progress, 0);
        assert!(!task.status.is_terminal());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(DownloadStatus::Completed.is_terminal());
        assert!(DownloadStatus::Failed.is_terminal());
        assert!(!DownloadStatus::Processing.is_terminal());
    }

    #[test]
    fn test_request_serializes_type_field() {
        let req = DownloadRequest {
            url: "https://v.example/1".into(),
            download_type: DownloadType::Audio,
            platform_id: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""type":"audio""#));
        assert!(!json.contains("platform_id"));
    }
}
