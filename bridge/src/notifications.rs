//! Local notifications for download-task events.

use crate::event_bus::{BridgeEvent, EventBus};
use crate::events::DownloadTaskEvent;

/// A notification shown to the user. Posting one with an existing `key`
/// replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: String,
    pub title: String,
    pub body: String,
    /// Stays until explicitly cancelled
    pub ongoing: bool,
}

/// Sink for local notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
    fn cancel(&self, key: &str);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            key = %notification.key,
            ongoing = notification.ongoing,
            body = %notification.body,
            "{}",
            notification.title
        );
    }

    fn cancel(&self, key: &str) {
        tracing::info!(key = %key, "Notification cancelled");
    }
}

/// The notification an event produces, if any.
pub fn notification_for(event: &DownloadTaskEvent) -> Option<Notification> {
    match event {
        DownloadTaskEvent::Created { task_id, url, title } => Some(Notification {
            key: task_id.clone(),
            title: "Download started".to_string(),
            body: title.clone().unwrap_or_else(|| url.clone()),
            ongoing: true,
        }),
        DownloadTaskEvent::ProgressUpdate { .. } => None,
        DownloadTaskEvent::Completed {
            task_id,
            title,
            file_url,
        } => Some(Notification {
            key: task_id.clone(),
            title: "Download completed".to_string(),
            body: title.clone().unwrap_or_else(|| file_url.clone()),
            ongoing: true,
        }),
        DownloadTaskEvent::Failed { task_id, error } => Some(Notification {
            key: task_id.clone(),
            title: "Download failed".to_string(),
            body: error.clone(),
            ongoing: false,
        }),
    }
}

/// Turn one event into its notification and publish it to observers.
pub fn dispatch(event: DownloadTaskEvent, notifier: &dyn Notifier, bus: &EventBus) {
    if let DownloadTaskEvent::ProgressUpdate {
        task_id,
        progress,
        speed,
        eta_seconds,
    } = &event
    {
        tracing::debug!(
            task_id = %task_id,
            progress = progress,
            speed = speed.as_deref().unwrap_or("-"),
            eta_seconds = ?eta_seconds,
            "Download progress"
        );
    } else {
        tracing::info!(task_id = %event.task_id(), kind = event.kind(), "Download task event");
    }

    if let Some(notification) = notification_for(&event) {
        notifier.notify(notification);
    }
    bus.publish(BridgeEvent::Task(event));
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Notification, Notifier};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Recorded {
        Notify(Notification),
        Cancel(String),
    }

    /// Notifier that keeps everything it was asked to do.
    #[derive(Default)]
    pub struct RecordingNotifier {
        calls: Mutex<Vec<Recorded>>,
    }

    impl RecordingNotifier {
        pub fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().unwrap().clone()
        }

        pub fn notifications(&self) -> Vec<Notification> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Recorded::Notify(n) => Some(n),
                    Recorded::Cancel(_) => None,
                })
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.calls.lock().unwrap().push(Recorded::Notify(notification));
        }

        fn cancel(&self, key: &str) {
            self.calls.lock().unwrap().push(Recorded::Cancel(key.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    #[test]
    fn test_completed_replaces_created() {
        let created = notification_for(&DownloadTaskEvent::Created {
            task_id: "t1".into(),
            url: "https://v.test/1".into(),
            title: None,
        })
        .unwrap();
        let completed = notification_for(&DownloadTaskEvent::Completed {
            task_id: "t1".into(),
            title: Some("Cat video".into()),
            file_url: "https://cdn.test/t1.mp4".into(),
        })
        .unwrap();

        assert_eq!(created.key, completed.key);
        assert_eq!(created.title, "Download started");
        assert_eq!(created.body, "https://v.test/1");
        assert_eq!(completed.title, "Download completed");
        assert_eq!(completed.body, "Cat video");
    }

    #[test]
    fn test_failed_body_is_backend_error_verbatim() {
        let notification = notification_for(&DownloadTaskEvent::Failed {
            task_id: "t2".into(),
            error: "  Video is private (403)".into(),
        })
        .unwrap();
        assert_eq!(notification.key, "t2");
        assert_eq!(notification.body, "  Video is private (403)");
        assert!(!notification.ongoing);
    }

    #[tokio::test]
    async fn test_progress_goes_to_bus_only() {
        let notifier = RecordingNotifier::default();
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let event = DownloadTaskEvent::ProgressUpdate {
            task_id: "t1".into(),
            progress: 10.0,
            speed: None,
            eta_seconds: None,
        };
        dispatch(event.clone(), &notifier, &bus);

        assert!(notifier.calls().is_empty());
        assert_eq!(rx.recv().await.unwrap(), BridgeEvent::Task(event));
    }
}
