//! Explicitly constructed application context.

use std::sync::Arc;

use crate::bridge::NotificationBridge;
use crate::config::BridgeConfig;
use crate::event_bus::EventBus;
use crate::notifications::{Notifier, TracingNotifier};
use crate::transport::{MessagingTransport, WebSocketTransport};

/// Everything the bridge and its hosting service need, built once in `main`.
#[derive(Clone)]
pub struct AppContext {
    pub config: BridgeConfig,
    pub events: Arc<EventBus>,
    pub notifier: Arc<dyn Notifier>,
    pub transport: Arc<dyn MessagingTransport>,
}

impl AppContext {
    pub fn new(
        config: BridgeConfig,
        transport: Arc<dyn MessagingTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            events: Arc::new(EventBus::default()),
            notifier,
            transport,
        }
    }

    /// Production wiring: WebSocket transport, log-backed notifications.
    pub fn from_config(config: BridgeConfig) -> Self {
        let transport = Arc::new(WebSocketTransport::from_config(&config));
        Self::new(config, transport, Arc::new(TracingNotifier))
    }

    pub fn bridge(&self) -> NotificationBridge {
        NotificationBridge::new(
            self.transport.clone(),
            self.notifier.clone(),
            self.events.clone(),
            self.config.channel(),
            self.config.retry.clone(),
            self.config.connect_timeout,
        )
    }
}
