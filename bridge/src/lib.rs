//! VidGrab notification bridge.
//!
//! Keeps one messaging connection per process subscribed to the signed-in
//! user's download channel and turns download-task events into local
//! notifications, hosted by [`service::DownloadNotificationService`].

pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod notifications;
pub mod retry;
pub mod service;
pub mod state;
pub mod transport;

pub use bridge::NotificationBridge;
pub use config::BridgeConfig;
pub use context::AppContext;
pub use error::{BridgeError, Result};
pub use service::DownloadNotificationService;
pub use state::ConnectionState;
