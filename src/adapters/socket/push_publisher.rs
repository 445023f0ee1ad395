//! Socket push publisher - delivers draw announcements to the event sink.
//!
//! Performs one HTTP POST per announcement to a configured sink URL. The
//! sink fans the event out to channel subscribers; response codes and
//! bodies are logged but never acted upon. There is no retry: delivery is
//! best-effort and a lost announcement is not re-sent.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::foundation::DomainError;
use crate::domain::game::DrawAnnouncement;
use crate::ports::DrawPublisher;

/// Configuration for the socket publisher.
#[derive(Debug, Clone)]
pub struct SocketPublisherConfig {
    /// Sink endpoint that accepts the channel POST.
    pub sink_url: String,
    /// Channel the events are emitted on.
    pub channel: String,
    /// Auth token for the channel.
    token: Secret<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl SocketPublisherConfig {
    /// Creates a new configuration.
    pub fn new(
        sink_url: impl Into<String>,
        channel: impl Into<String>,
        token: Secret<String>,
    ) -> Self {
        Self {
            sink_url: sink_url.into(),
            channel: channel.into(),
            token,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the token (for building requests).
    fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Outbound wire format accepted by the sink.
#[derive(Debug, Serialize)]
struct WireEvent<'a> {
    channel: &'a str,
    token: &'a str,
    event: &'a str,
    message: serde_json::Value,
}

/// HTTP implementation of `DrawPublisher`.
pub struct SocketPublisher {
    config: SocketPublisherConfig,
    client: Client,
}

impl SocketPublisher {
    /// Creates a new socket publisher with the given configuration.
    pub fn new(config: SocketPublisherConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl DrawPublisher for SocketPublisher {
    async fn publish(&self, announcement: &DrawAnnouncement) -> Result<(), DomainError> {
        let body = WireEvent {
            channel: &self.config.channel,
            token: self.config.token(),
            event: &announcement.event_name,
            message: announcement.payload(),
        };

        let response = self
            .client
            .post(&self.config.sink_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::publish(format!("Sink unreachable: {}", e)))?;

        let status = response.status();
        let response_body = response.text().await.unwrap_or_default();
        debug!(
            event = %announcement.event_name,
            status = %status,
            body = %response_body,
            "sink responded"
        );

        if !status.is_success() {
            return Err(DomainError::publish(format!(
                "Sink rejected event {}: {}",
                announcement.event_name, status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{GameId, Timestamp};

    fn announcement() -> DrawAnnouncement {
        DrawAnnouncement {
            game_id: GameId::from_i64(1),
            event_name: "Bingo_2024-05-20_14:30".to_string(),
            number: 42,
            sequence: 7,
            announced_at: Timestamp::now(),
        }
    }

    #[test]
    fn wire_event_serializes_all_fields() {
        let a = announcement();
        let body = WireEvent {
            channel: "bingo-hall",
            token: "secret-token",
            event: &a.event_name,
            message: a.payload(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["channel"], "bingo-hall");
        assert_eq!(json["token"], "secret-token");
        assert_eq!(json["event"], "Bingo_2024-05-20_14:30");
        assert_eq!(json["message"]["number"], 42);
        assert_eq!(json["message"]["sequence"], 7);
    }

    #[test]
    fn config_debug_does_not_leak_the_token() {
        let config = SocketPublisherConfig::new(
            "http://sink.local/emit",
            "bingo-hall",
            Secret::new("super-secret".to_string()),
        );
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }
}
