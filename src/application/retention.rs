//! RetentionTrimmer - bounds storage growth.
//!
//! Runs opportunistically before new games are created: counts all rows
//! and deletes the oldest (smallest `starts_at`, any state) beyond the cap.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ports::GameStore;

/// Default maximum number of game rows kept in the store.
pub const DEFAULT_RETENTION_CAP: u64 = 200;

/// Deletes the oldest games once the table grows past a cap.
pub struct RetentionTrimmer {
    store: Arc<dyn GameStore>,
    cap: u64,
}

impl RetentionTrimmer {
    /// Creates a trimmer with the given row cap.
    pub fn new(store: Arc<dyn GameStore>, cap: u64) -> Self {
        Self { store, cap }
    }

    /// Trim rows beyond the cap, oldest `starts_at` first.
    ///
    /// Storage errors are logged and swallowed; trimming is best-effort
    /// and never blocks the caller's main operation. Returns how many
    /// rows were removed.
    pub async fn trim(&self) -> u64 {
        let total = match self.store.count().await {
            Ok(total) => total,
            Err(e) => {
                warn!(error = %e, "retention count failed");
                return 0;
            }
        };

        if total <= self.cap {
            debug!(total, cap = self.cap, "retention cap not reached");
            return 0;
        }

        let excess = total - self.cap;
        match self.store.delete_oldest(excess).await {
            Ok(deleted) => {
                debug!(deleted, total, "trimmed oldest games");
                deleted
            }
            Err(e) => {
                warn!(error = %e, excess, "retention delete failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryGameStore;
    use crate::domain::foundation::Timestamp;
    use chrono::{TimeZone, Utc};

    fn base_slot() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    async fn seed(store: &InMemoryGameStore, count: i64) {
        for i in 0..count {
            store.create(base_slot().plus_minutes(30 * i)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn trim_is_a_no_op_under_the_cap() {
        let store = Arc::new(InMemoryGameStore::new());
        seed(&store, 10).await;

        let trimmer = RetentionTrimmer::new(store.clone(), 200);
        assert_eq!(trimmer.trim().await, 0);
        assert_eq!(store.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn trim_removes_exactly_the_excess() {
        let store = Arc::new(InMemoryGameStore::new());
        seed(&store, 205).await;

        let trimmer = RetentionTrimmer::new(store.clone(), 200);
        assert_eq!(trimmer.trim().await, 5);
        assert_eq!(store.count().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn trim_drops_the_oldest_slots_first() {
        let store = Arc::new(InMemoryGameStore::new());
        seed(&store, 205).await;

        RetentionTrimmer::new(store.clone(), 200).trim().await;

        let remaining = store.list_all().await.unwrap();
        let earliest = remaining
            .iter()
            .map(|g| g.starts_at())
            .min()
            .unwrap();
        // The five oldest slots (offsets 0..5) are gone.
        assert_eq!(earliest, base_slot().plus_minutes(30 * 5));
    }

    #[tokio::test]
    async fn trim_swallows_storage_failures() {
        let store = Arc::new(InMemoryGameStore::new());
        seed(&store, 205).await;
        store.fail_next_delete();

        let trimmer = RetentionTrimmer::new(store.clone(), 200);
        assert_eq!(trimmer.trim().await, 0);
        // Nothing deleted, nothing panicked.
        assert_eq!(store.count().await.unwrap(), 205);
    }
}
