//! Bridge configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{BridgeError, Result};
use crate::events::user_channel;
use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct BridgeConfig {
    /// WebSocket endpoint of the messaging service
    pub messaging_url: Url,
    /// Optional API key sent as `X-API-Key`
    pub api_key: Option<String>,
    /// Session token of the signed-in user
    pub session_token: String,
    pub user_id: String,
    pub channel_prefix: String,
    pub retry: RetryPolicy,
    /// Upper bound on a single handshake attempt
    pub connect_timeout: Duration,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("messaging_url", &self.messaging_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("session_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("channel_prefix", &self.channel_prefix)
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self> {
        let messaging_url = required("MESSAGING_URL")?;
        let messaging_url = parse_messaging_url(&messaging_url)?;

        let defaults = RetryPolicy::default();
        Ok(Self {
            messaging_url,
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            session_token: required("SESSION_TOKEN")?,
            user_id: required("USER_ID")?,
            channel_prefix: env::var("CHANNEL_PREFIX")
                .ok()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "downloads".into()),
            retry: RetryPolicy {
                max_attempts: parse_or("RETRY_MAX_ATTEMPTS", defaults.max_attempts),
                initial_delay: Duration::from_millis(parse_or(
                    "RETRY_INITIAL_DELAY_MS",
                    defaults.initial_delay.as_millis() as u64,
                )),
                max_delay: Duration::from_millis(parse_or(
                    "RETRY_MAX_DELAY_MS",
                    defaults.max_delay.as_millis() as u64,
                )),
            },
            connect_timeout: Duration::from_secs(parse_or("CONNECT_TIMEOUT_SECS", 15)),
        })
    }

    /// Channel the bridge subscribes to
    pub fn channel(&self) -> String {
        user_channel(&self.channel_prefix, &self.user_id)
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BridgeError::Config(format!("{} not set", name)))
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Only `ws` and `wss` endpoints are accepted.
pub fn parse_messaging_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| BridgeError::Config(format!("MESSAGING_URL is invalid: {}", e)))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(BridgeError::Config(format!(
            "MESSAGING_URL must use ws or wss, got {}",
            other
        ))),
    }
}
