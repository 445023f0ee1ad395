//! Game store port.
//!
//! Defines the access contract over the durable store. Implementations own
//! the actual database operations; every call resolves to an explicit
//! `Result` and is awaited to completion before the caller's next step.
//!
//! # Errors
//!
//! Mutations fail with `StorageError` on underlying I/O failure. Callers
//! log and abort the current operation; there is no automatic retry.

use crate::domain::foundation::{DomainError, GameId, GameState, Timestamp};
use crate::domain::game::Game;
use async_trait::async_trait;

/// Durable store contract for `Game` rows.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a freshly scheduled game for `starts_at` and return its id.
    ///
    /// The new row starts Scheduled with one observer and no draws.
    async fn create(&self, starts_at: Timestamp) -> Result<GameId, DomainError>;

    /// Point lookup by id. Absence is a typed `None`, not an error.
    async fn find_by_id(&self, id: GameId) -> Result<Option<Game>, DomainError>;

    /// Games in `state` with `starts_at` strictly after `after`,
    /// ascending by `starts_at`.
    async fn list_by_state(
        &self,
        state: GameState,
        after: Timestamp,
    ) -> Result<Vec<Game>, DomainError>;

    /// The scheduled game starting exactly at `starts_at`, if any.
    ///
    /// When more than one row matches, the one with the smallest id wins.
    async fn find_scheduled_at(&self, starts_at: Timestamp)
        -> Result<Option<Game>, DomainError>;

    /// The currently running game, if any.
    async fn find_running(&self) -> Result<Option<Game>, DomainError>;

    /// Every game, newest slot first. Serves the history view.
    async fn list_all(&self) -> Result<Vec<Game>, DomainError>;

    /// Replace the draw history of a game.
    async fn update_numbers(&self, id: GameId, numbers: &[i16]) -> Result<(), DomainError>;

    /// Set the lifecycle state of a game.
    async fn set_state(&self, id: GameId, state: GameState) -> Result<(), DomainError>;

    /// Move a game to Finished and stamp `ends_at` in one write.
    async fn mark_finished(&self, id: GameId, ended_at: Timestamp) -> Result<(), DomainError>;

    /// Bump the observer counter of a game.
    async fn increment_observers(&self, id: GameId) -> Result<(), DomainError>;

    /// Total row count across all states.
    async fn count(&self) -> Result<u64, DomainError>;

    /// Delete the `n` rows with the smallest `starts_at`, regardless of
    /// state. Returns how many rows were removed.
    async fn delete_oldest(&self, n: u64) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn game_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn GameStore) {}
    }
}
