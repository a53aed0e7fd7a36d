//! Long-lived service hosting the bridge.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;

use crate::bridge::NotificationBridge;
use crate::context::AppContext;
use crate::notifications::Notification;
use crate::state::ConnectionState;

/// Key of the ongoing notification shown while the service runs
pub const FOREGROUND_KEY: &str = "vidgrab-bridge";

pub struct DownloadNotificationService {
    context: AppContext,
    bridge: NotificationBridge,
    destroying: AtomicBool,
    torn_down: OnceCell<()>,
}

impl DownloadNotificationService {
    pub fn new(context: AppContext) -> Self {
        let bridge = context.bridge();
        Self {
            context,
            bridge,
            destroying: AtomicBool::new(false),
            torn_down: OnceCell::new(),
        }
    }

    pub fn bridge(&self) -> &NotificationBridge {
        &self.bridge
    }

    pub fn state(&self) -> ConnectionState {
        self.bridge.state()
    }

    /// Post the foreground notification and connect.
    pub async fn start(&self) {
        if self.destroying.load(Ordering::SeqCst) {
            tracing::warn!("start() after destroy() ignored");
            return;
        }
        self.context.notifier.notify(Notification {
            key: FOREGROUND_KEY.to_string(),
            title: "VidGrab".to_string(),
            body: "Listening for download updates".to_string(),
            ongoing: true,
        });
        self.bridge.connect().await;
    }

    /// Unsubscribe and close the connection. Runs once; every caller returns
    /// only after teardown has finished.
    pub async fn destroy(&self) {
        self.destroying.store(true, Ordering::SeqCst);
        self.torn_down
            .get_or_init(|| async {
                self.bridge.shutdown().await;
                self.context.notifier.cancel(FOREGROUND_KEY);
                tracing::info!("Download notification service destroyed");
            })
            .await;
    }
}
