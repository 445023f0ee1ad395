//! In-memory game store for testing.
//!
//! Mirrors the row-level semantics of the SQL store (blind updates,
//! store-assigned ids) with deterministic, dependency-free behavior.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in
//! production. It uses `.expect()` on lock operations which will panic if
//! locks are poisoned.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, GameId, GameState, Timestamp};
use crate::domain::game::Game;
use crate::ports::GameStore;

/// In-memory implementation of `GameStore`.
pub struct InMemoryGameStore {
    games: RwLock<BTreeMap<i64, Game>>,
    next_id: AtomicI64,
    fail_next_delete: AtomicBool,
}

impl InMemoryGameStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            games: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            fail_next_delete: AtomicBool::new(false),
        }
    }

    /// Makes the next `delete_oldest` call fail with a storage error.
    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<i64, Game>> {
        self.games.read().expect("InMemoryGameStore: lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<i64, Game>> {
        self.games.write().expect("InMemoryGameStore: lock poisoned")
    }

    /// Applies a row-level rewrite, mirroring a SQL UPDATE by id.
    fn rewrite(
        &self,
        id: GameId,
        f: impl FnOnce(&Game) -> Game,
    ) -> Result<(), DomainError> {
        let mut games = self.write();
        match games.get(&id.as_i64()) {
            Some(game) => {
                let updated = f(game);
                games.insert(id.as_i64(), updated);
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::GameNotFound,
                format!("Game not found: {}", id),
            )),
        }
    }
}

impl Default for InMemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn create(&self, starts_at: Timestamp) -> Result<GameId, DomainError> {
        let id = GameId::from_i64(self.next_id.fetch_add(1, Ordering::SeqCst));
        let game = Game::schedule(id, starts_at)?;
        self.write().insert(id.as_i64(), game);
        Ok(id)
    }

    async fn find_by_id(&self, id: GameId) -> Result<Option<Game>, DomainError> {
        Ok(self.read().get(&id.as_i64()).cloned())
    }

    async fn list_by_state(
        &self,
        state: GameState,
        after: Timestamp,
    ) -> Result<Vec<Game>, DomainError> {
        let mut games: Vec<Game> = self
            .read()
            .values()
            .filter(|g| g.state() == state && g.starts_at().is_after(&after))
            .cloned()
            .collect();
        games.sort_by_key(|g| (g.starts_at(), g.id()));
        Ok(games)
    }

    async fn find_scheduled_at(
        &self,
        starts_at: Timestamp,
    ) -> Result<Option<Game>, DomainError> {
        // BTreeMap iterates in id order, so the first match has the
        // smallest id, like ORDER BY id LIMIT 1.
        Ok(self
            .read()
            .values()
            .find(|g| g.state() == GameState::Scheduled && g.starts_at() == starts_at)
            .cloned())
    }

    async fn find_running(&self) -> Result<Option<Game>, DomainError> {
        Ok(self
            .read()
            .values()
            .find(|g| g.state() == GameState::Running)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Game>, DomainError> {
        let mut games: Vec<Game> = self.read().values().cloned().collect();
        games.sort_by_key(|g| std::cmp::Reverse((g.starts_at(), g.id())));
        Ok(games)
    }

    async fn update_numbers(&self, id: GameId, numbers: &[i16]) -> Result<(), DomainError> {
        let numbers = numbers.to_vec();
        self.rewrite(id, move |game| {
            Game::reconstitute(
                game.id(),
                game.state(),
                game.starts_at(),
                numbers,
                game.ends_at(),
                game.observer_count(),
                game.created_at(),
            )
        })
    }

    async fn set_state(&self, id: GameId, state: GameState) -> Result<(), DomainError> {
        self.rewrite(id, move |game| {
            Game::reconstitute(
                game.id(),
                state,
                game.starts_at(),
                game.drawn_numbers().to_vec(),
                game.ends_at(),
                game.observer_count(),
                game.created_at(),
            )
        })
    }

    async fn mark_finished(&self, id: GameId, ended_at: Timestamp) -> Result<(), DomainError> {
        self.rewrite(id, move |game| {
            Game::reconstitute(
                game.id(),
                GameState::Finished,
                game.starts_at(),
                game.drawn_numbers().to_vec(),
                Some(ended_at),
                game.observer_count(),
                game.created_at(),
            )
        })
    }

    async fn increment_observers(&self, id: GameId) -> Result<(), DomainError> {
        self.rewrite(id, |game| {
            let mut updated = game.clone();
            updated.add_observer();
            updated
        })
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.read().len() as u64)
    }

    async fn delete_oldest(&self, n: u64) -> Result<u64, DomainError> {
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            return Err(DomainError::storage("Simulated delete failure"));
        }

        let mut games = self.write();
        let mut ordered: Vec<(Timestamp, i64)> = games
            .values()
            .map(|g| (g.starts_at(), g.id().as_i64()))
            .collect();
        ordered.sort();

        let mut deleted = 0;
        for (_, id) in ordered.into_iter().take(n as usize) {
            games.remove(&id);
            deleted += 1;
        }
        Ok(deleted)
    }
}
