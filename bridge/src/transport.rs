//! Messaging transport.
//!
//! The bridge only sees the [`MessagingTransport`] and [`TransportSession`]
//! traits; [`WebSocketTransport`] is the production implementation.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::events::{ControlAction, ControlMessage};

/// Opens sessions with the messaging service.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn TransportSession>>;
}

/// One open connection.
#[async_trait]
pub trait TransportSession: Send {
    async fn subscribe(&mut self, channel: &str) -> Result<()>;

    async fn unsubscribe(&mut self, channel: &str) -> Result<()>;

    /// Next text frame; `None` once the server has closed the connection.
    async fn next_frame(&mut self) -> Option<Result<String>>;

    async fn close(&mut self) -> Result<()>;
}

/// WebSocket transport authenticated with the user's session token.
pub struct WebSocketTransport {
    url: Url,
    token: String,
    api_key: Option<String>,
}

impl WebSocketTransport {
    pub fn new(url: Url, token: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url,
            token: token.into(),
            api_key,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(
            config.messaging_url.clone(),
            config.session_token.clone(),
            config.api_key.clone(),
        )
    }

    fn endpoint(&self) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("token", &self.token);
        url
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| BridgeError::Config(format!("Invalid header value: {}", e)))
}

#[async_trait]
impl MessagingTransport for WebSocketTransport {
    async fn connect(&self) -> Result<Box<dyn TransportSession>> {
        let mut request = self
            .endpoint()
            .as_str()
            .into_client_request()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        let headers = request.headers_mut();
        headers.insert(
            header::AUTHORIZATION,
            header_value(&format!("Bearer {}", self.token))?,
        );
        if let Some(api_key) = &self.api_key {
            headers.insert("X-API-Key", header_value(api_key)?);
        }

        let (stream, response) = connect_async(request)
            .await
            .map_err(|e| BridgeError::Transport(format!("WebSocket connect failed: {}", e)))?;
        tracing::debug!(
            host = self.url.host_str().unwrap_or_default(),
            status = %response.status(),
            "WebSocket handshake complete"
        );

        Ok(Box::new(WebSocketSession {
            stream,
            token: self.token.clone(),
        }))
    }
}

struct WebSocketSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    token: String,
}

impl WebSocketSession {
    async fn send_control(&mut self, action: ControlAction, channel: &str) -> Result<()> {
        let text = ControlMessage {
            action,
            channel,
            token: &self.token,
        }
        .to_text()?;
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| BridgeError::Transport(format!("WebSocket send failed: {}", e)))
    }
}

#[async_trait]
impl TransportSession for WebSocketSession {
    async fn subscribe(&mut self, channel: &str) -> Result<()> {
        self.send_control(ControlAction::Subscribe, channel).await
    }

    async fn unsubscribe(&mut self, channel: &str) -> Result<()> {
        self.send_control(ControlAction::Unsubscribe, channel).await
    }

    async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => {
                    return Some(Err(BridgeError::Transport(format!(
                        "WebSocket receive failed: {}",
                        e
                    ))))
                }
            };

            match message {
                Message::Text(text) => return Some(Ok(text)),
                Message::Binary(data) => match String::from_utf8(data) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => tracing::debug!("Skipping non UTF-8 binary frame"),
                },
                Message::Ping(data) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(BridgeError::Transport(format!(
                            "WebSocket pong failed: {}",
                            e
                        ))));
                    }
                }
                Message::Close(_) => return None,
                Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| BridgeError::Transport(format!("WebSocket close failed: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory transport for exercising the bridge without a network.

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::{MessagingTransport, TransportSession};
    use crate::error::{BridgeError, Result};

    #[derive(Default)]
    struct Shared {
        failures_left: AtomicU32,
        connects: AtomicU32,
        closes: AtomicU32,
        subscribed: Mutex<Vec<String>>,
        unsubscribed: Mutex<Vec<String>>,
        frames: Mutex<Option<mpsc::UnboundedSender<String>>>,
    }

    #[derive(Clone, Default)]
    pub struct MemoryTransport {
        shared: Arc<Shared>,
    }

    impl MemoryTransport {
        /// The first `n` handshakes are refused.
        pub fn failing(n: u32) -> Self {
            let transport = Self::default();
            transport.shared.failures_left.store(n, Ordering::SeqCst);
            transport
        }

        /// Deliver a frame to the open session.
        pub fn push(&self, frame: &str) {
            if let Some(tx) = self.shared.frames.lock().unwrap().as_ref() {
                let _ = tx.send(frame.to_string());
            }
        }

        /// Close the open session from the server side.
        pub fn hang_up(&self) {
            self.shared.frames.lock().unwrap().take();
        }

        pub fn connects(&self) -> u32 {
            self.shared.connects.load(Ordering::SeqCst)
        }

        pub fn closes(&self) -> u32 {
            self.shared.closes.load(Ordering::SeqCst)
        }

        pub fn subscribed(&self) -> Vec<String> {
            self.shared.subscribed.lock().unwrap().clone()
        }

        pub fn unsubscribed(&self) -> Vec<String> {
            self.shared.unsubscribed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingTransport for MemoryTransport {
        async fn connect(&self) -> Result<Box<dyn TransportSession>> {
            self.shared.connects.fetch_add(1, Ordering::SeqCst);
            let refused = self
                .shared
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if refused {
                return Err(BridgeError::Transport("connection refused".into()));
            }

            let (tx, rx) = mpsc::unbounded_channel();
            *self.shared.frames.lock().unwrap() = Some(tx);
            Ok(Box::new(MemorySession {
                shared: self.shared.clone(),
                rx,
            }))
        }
    }

    struct MemorySession {
        shared: Arc<Shared>,
        rx: mpsc::UnboundedReceiver<String>,
    }

    #[async_trait]
    impl TransportSession for MemorySession {
        async fn subscribe(&mut self, channel: &str) -> Result<()> {
            self.shared.subscribed.lock().unwrap().push(channel.to_string());
            Ok(())
        }

        async fn unsubscribe(&mut self, channel: &str) -> Result<()> {
            self.shared.unsubscribed.lock().unwrap().push(channel.to_string());
            Ok(())
        }

        async fn next_frame(&mut self) -> Option<Result<String>> {
            self.rx.recv().await.map(Ok)
        }

        async fn close(&mut self) -> Result<()> {
            self.shared.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_carries_token() {
        let transport = WebSocketTransport::new(
            Url::parse("wss://push.vidgrab.test/ws?app=web").unwrap(),
            "tok en",
            None,
        );
        let endpoint = transport.endpoint();
        assert_eq!(endpoint.host_str(), Some("push.vidgrab.test"));
        let pairs: Vec<(String, String)> = endpoint.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("app".to_string(), "web".to_string()),
                ("token".to_string(), "tok en".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport_error() {
        let transport = WebSocketTransport::new(
            Url::parse("ws://127.0.0.1:9/ws").unwrap(),
            "tok",
            Some("key".into()),
        );
        match transport.connect().await {
            Err(BridgeError::Transport(message)) => assert!(message.contains("connect failed")),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("connected to a closed port"),
        }
    }
}
