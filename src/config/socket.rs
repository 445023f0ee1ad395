//! Socket sink configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Socket sink configuration (outbound draw announcements)
#[derive(Debug, Deserialize)]
pub struct SocketConfig {
    /// Sink endpoint URL
    pub url: String,

    /// Channel the draw events are emitted on
    pub channel: String,

    /// Channel auth token
    pub token: Secret<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SocketConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate socket configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("SOCKET_URL"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidSinkUrl);
        }
        if self.channel.is_empty() {
            return Err(ValidationError::MissingRequired("SOCKET_CHANNEL"));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}
