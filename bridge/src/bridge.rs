//! Notification bridge: one messaging session per process, subscribed to the
//! user's channel, turning download-task events into local notifications.
//!
//! `connect()` spawns a session task guarded by a [`CancellationToken`];
//! `disconnect()` cancels it and waits for its teardown (unsubscribe, close)
//! before returning. Only one session task exists at a time. `shutdown()` is
//! terminal: the bridge refuses every later `connect()`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::BridgeError;
use crate::event_bus::{BridgeEvent, EventBus};
use crate::events::decode_frame;
use crate::notifications::{dispatch, Notifier};
use crate::retry::RetryPolicy;
use crate::state::ConnectionState;
use crate::transport::{MessagingTransport, TransportSession};

/// Session task handle
struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// State shared between the bridge and its session task.
struct Shared {
    transport: Arc<dyn MessagingTransport>,
    notifier: Arc<dyn Notifier>,
    events: Arc<EventBus>,
    channel: String,
    retry: RetryPolicy,
    connect_timeout: Duration,
    state: watch::Sender<ConnectionState>,
}

#[derive(Default)]
struct Slot {
    running: Option<Running>,
    shut_down: bool,
}

pub struct NotificationBridge {
    shared: Arc<Shared>,
    slot: Mutex<Slot>,
}

impl NotificationBridge {
    pub fn new(
        transport: Arc<dyn MessagingTransport>,
        notifier: Arc<dyn Notifier>,
        events: Arc<EventBus>,
        channel: impl Into<String>,
        retry: RetryPolicy,
        connect_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                transport,
                notifier,
                events,
                channel: channel.into(),
                retry,
                connect_timeout,
                state,
            }),
            slot: Mutex::new(Slot::default()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn channel(&self) -> &str {
        &self.shared.channel
    }

    /// Start connecting. No-op while connecting or connected, and after
    /// [`shutdown`](Self::shutdown).
    pub async fn connect(&self) {
        let mut slot = self.slot.lock().await;
        if slot.shut_down {
            tracing::warn!(channel = %self.shared.channel, "connect() after shutdown ignored");
            return;
        }
        if self.state().is_active() {
            tracing::debug!(state = %self.state(), "connect() ignored, session already active");
            return;
        }

        // A previous session that ended in error still has a finished task.
        if let Some(previous) = slot.running.take() {
            stop(previous).await;
        }

        self.shared.set_state(ConnectionState::Connecting);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(self.shared.clone(), cancel.clone()));
        slot.running = Some(Running { cancel, task });
    }

    /// Tear the session down and wait for it. Safe when never connected.
    pub async fn disconnect(&self) {
        let mut slot = self.slot.lock().await;
        self.release(&mut slot).await;
    }

    /// Disconnect for good. Later `connect()` calls do nothing.
    pub async fn shutdown(&self) {
        let mut slot = self.slot.lock().await;
        slot.shut_down = true;
        self.release(&mut slot).await;
    }

    pub async fn is_shut_down(&self) -> bool {
        self.slot.lock().await.shut_down
    }

    async fn release(&self, slot: &mut Slot) {
        if let Some(session) = slot.running.take() {
            stop(session).await;
        }
        self.shared.set_state(ConnectionState::Disconnected);
    }
}

async fn stop(session: Running) {
    session.cancel.cancel();
    if let Err(e) = session.task.await {
        tracing::warn!("Session task failed: {}", e);
    }
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
        if changed {
            tracing::info!(channel = %self.channel, state = %next, "Bridge state changed");
            self.events.publish(BridgeEvent::StateChanged(next));
        }
    }

    /// Handshake with retries; see [`RetryPolicy`].
    async fn establish(&self) -> Result<Box<dyn TransportSession>, BridgeError> {
        let attempts = self.retry.attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.retry.delay(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying handshake");
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.connect_timeout, self.transport.connect()).await {
                Ok(Ok(session)) => return Ok(session),
                Ok(Err(e)) => {
                    tracing::warn!(attempt, attempts, error = %e, "Handshake failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    let e = BridgeError::Timeout(self.connect_timeout);
                    tracing::warn!(attempt, attempts, error = %e, "Handshake failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(BridgeError::RetriesExhausted {
            attempts,
            last: last_error,
        })
    }

    fn handle_frame(&self, text: &str) {
        match decode_frame(text, &self.channel) {
            Ok(Some(event)) => dispatch(event, self.notifier.as_ref(), &self.events),
            Ok(None) => tracing::trace!("Ignoring non-event frame"),
            Err(e) => tracing::warn!(error = %e, "Skipping undecodable frame"),
        }
    }
}

async fn run_session(shared: Arc<Shared>, cancel: CancellationToken) {
    let established = tokio::select! {
        _ = cancel.cancelled() => return,
        result = shared.establish() => result,
    };
    let mut session = match established {
        Ok(session) => session,
        Err(e) => {
            shared.set_state(ConnectionState::Error(e.to_string()));
            return;
        }
    };

    shared.set_state(ConnectionState::Connected);
    if let Err(e) = session.subscribe(&shared.channel).await {
        shared.set_state(ConnectionState::Error(e.to_string()));
        close_quietly(session.as_mut()).await;
        return;
    }
    tracing::info!(channel = %shared.channel, "Subscribed to download events");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = session.unsubscribe(&shared.channel).await {
                    tracing::debug!(error = %e, "Unsubscribe failed during teardown");
                }
                close_quietly(session.as_mut()).await;
                return;
            }
            frame = session.next_frame() => match frame {
                Some(Ok(text)) => shared.handle_frame(&text),
                Some(Err(e)) => {
                    shared.set_state(ConnectionState::Error(e.to_string()));
                    close_quietly(session.as_mut()).await;
                    return;
                }
                None => {
                    shared.set_state(ConnectionState::Error(BridgeError::Closed.to_string()));
                    return;
                }
            },
        }
    }
}

async fn close_quietly(session: &mut dyn TransportSession) {
    if let Err(e) = session.close().await {
        tracing::debug!(error = %e, "Close failed");
    }
}
