//! Recording draw publisher for testing.
//!
//! Captures every announcement for assertions and can be configured to
//! fail, for exercising the fire-and-forget publish path.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::domain::game::DrawAnnouncement;
use crate::ports::DrawPublisher;

/// In-memory `DrawPublisher` that records published announcements.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct RecordingPublisher {
    published: RwLock<Vec<DrawAnnouncement>>,
    fail: bool,
}

impl RecordingPublisher {
    /// Creates a publisher that accepts everything.
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            fail: false,
        }
    }

    /// Creates a publisher that rejects every announcement.
    pub fn failing() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns all recorded announcements (for test assertions).
    pub fn published(&self) -> Vec<DrawAnnouncement> {
        self.published
            .read()
            .expect("RecordingPublisher: lock poisoned")
            .clone()
    }

    /// Announcements published under a given event name.
    pub fn published_for(&self, event_name: &str) -> Vec<DrawAnnouncement> {
        self.published()
            .into_iter()
            .filter(|a| a.event_name == event_name)
            .collect()
    }
}

impl Default for RecordingPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrawPublisher for RecordingPublisher {
    async fn publish(&self, announcement: &DrawAnnouncement) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::publish("Simulated publish failure"));
        }
        self.published
            .write()
            .expect("RecordingPublisher: lock poisoned")
            .push(announcement.clone());
        Ok(())
    }
}
