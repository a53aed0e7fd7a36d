use tokio::sync::broadcast;

use crate::events::DownloadTaskEvent;
use crate::state::ConnectionState;

/// Something UI observers may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    StateChanged(ConnectionState),
    Task(DownloadTaskEvent),
}

/// Broadcast-based event bus for bridge observers.
///
/// A subscriber that falls behind receives `RecvError::Lagged` and should
/// re-read the bridge state.
pub struct EventBus {
    tx: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Dropped silently when nobody listens.
    pub fn publish(&self, event: BridgeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(BridgeEvent::StateChanged(ConnectionState::Connecting));

        assert_eq!(
            rx.recv().await.unwrap(),
            BridgeEvent::StateChanged(ConnectionState::Connecting)
        );
    }

    #[tokio::test]
    async fn no_subscribers_does_not_panic() {
        let bus = EventBus::new(16);
        bus.publish(BridgeEvent::StateChanged(ConnectionState::Disconnected));
    }
}
