//! DrawPublisher port - outbound contract for announcing draws.
//!
//! The domain publishes each draw without knowing the transport. Delivery
//! is best-effort fire-and-forget: a failed publish is logged by the
//! caller and the already-persisted draw is never rolled back, so a draw
//! may not reach subscribers.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::game::DrawAnnouncement;

/// Port for announcing drawn numbers to the external event channel.
#[async_trait]
pub trait DrawPublisher: Send + Sync {
    /// Deliver one announcement.
    ///
    /// # Errors
    ///
    /// - `PublishError` if the sink is unreachable or refuses the event
    async fn publish(&self, announcement: &DrawAnnouncement) -> Result<(), DomainError>;
}
