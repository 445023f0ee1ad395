//! DrawEngine - per-game timed number drawing.
//!
//! One independent timer loop per running game, keyed by game id in a
//! registry owned by the engine (constructed once per process, no ambient
//! global state). Each tick draws one unused number, persists it, and
//! announces it through the publisher port. The loop stops when the pool
//! is exhausted, at which point the game is finished.
//!
//! ## Failure model
//!
//! A failed tick (storage or publish) is logged and the loop continues on
//! the next tick; the missed draw is not retried early and the game is not
//! aborted. A failed publish never rolls back the persisted draw.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, GameId, Timestamp};
use crate::domain::game::{draw_unused, DrawAnnouncement};
use crate::ports::{DrawPublisher, GameStore};

/// Configuration for the draw loops.
#[derive(Debug, Clone)]
pub struct DrawEngineConfig {
    /// Delay between consecutive draws of one game. Whole seconds.
    pub tick_interval: Duration,
}

impl Default for DrawEngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
        }
    }
}

impl DrawEngineConfig {
    /// Create config with a custom tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

/// What a single tick accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// One number was drawn and persisted.
    Drawn { number: i16, sequence: u32 },
    /// The pool is exhausted; the game is finished and the loop stops.
    Completed,
    /// The game row no longer exists; the loop stops.
    Abandoned,
}

/// Runs the timed draw loops for running games.
pub struct DrawEngine {
    store: Arc<dyn GameStore>,
    publisher: Arc<dyn DrawPublisher>,
    config: DrawEngineConfig,
    active: Mutex<HashMap<GameId, JoinHandle<()>>>,
}

impl DrawEngine {
    /// Creates an engine with the default tick interval.
    pub fn new(store: Arc<dyn GameStore>, publisher: Arc<dyn DrawPublisher>) -> Self {
        Self::with_config(store, publisher, DrawEngineConfig::default())
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(
        store: Arc<dyn GameStore>,
        publisher: Arc<dyn DrawPublisher>,
        config: DrawEngineConfig,
    ) -> Self {
        Self {
            store,
            publisher,
            config,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Start the draw loop for a game. Idempotent: starting an id that is
    /// already running is a no-op.
    pub async fn start(self: &Arc<Self>, id: GameId) {
        let mut active = self.active.lock().await;
        if active.contains_key(&id) {
            debug!(game_id = %id, "draw loop already active");
            return;
        }

        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            engine.run_loop(id).await;
        });
        active.insert(id, handle);
        info!(game_id = %id, interval = ?self.config.tick_interval, "draw loop started");
    }

    /// Whether a loop is currently registered for this game.
    pub async fn is_active(&self, id: GameId) -> bool {
        self.active.lock().await.contains_key(&id)
    }

    /// Number of currently registered loops.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Perform a single draw tick for a game.
    ///
    /// Exposed so tests can drive the engine without waiting on timers.
    ///
    /// # Errors
    ///
    /// - `StorageError` if reading or persisting the game fails
    pub async fn draw_once(&self, id: GameId) -> Result<DrawOutcome, DomainError> {
        let Some(mut game) = self.store.find_by_id(id).await? else {
            warn!(game_id = %id, "draw target no longer exists");
            return Ok(DrawOutcome::Abandoned);
        };

        if game.is_complete() {
            // Catch-up for a fully drawn game left unfinished (e.g. the
            // process died between the last draw and the state write).
            if !game.state().is_terminal() {
                self.store.mark_finished(id, Timestamp::now()).await?;
            }
            return Ok(DrawOutcome::Completed);
        }

        let number = {
            let mut rng = rand::thread_rng();
            draw_unused(game.drawn_numbers(), &mut rng).ok_or_else(|| {
                DomainError::new(ErrorCode::PoolExhausted, "No numbers left to draw")
            })?
        };

        let sequence = game.record_draw(number)?;
        self.store.update_numbers(id, game.drawn_numbers()).await?;

        let announcement = DrawAnnouncement::for_draw(&game, number, sequence, Timestamp::now());
        if let Err(e) = self.publisher.publish(&announcement).await {
            // Fire-and-forget: the draw stays persisted even when the
            // announcement never reaches subscribers.
            warn!(game_id = %id, sequence, error = %e, "draw publish failed");
        }

        debug!(game_id = %id, number, sequence, "number drawn");

        if game.is_complete() {
            self.store.mark_finished(id, Timestamp::now()).await?;
            info!(game_id = %id, "pool exhausted, game finished");
            return Ok(DrawOutcome::Completed);
        }

        Ok(DrawOutcome::Drawn { number, sequence })
    }

    async fn run_loop(self: Arc<Self>, id: GameId) {
        let mut interval = time::interval(self.config.tick_interval);
        // The first tick of a tokio interval resolves immediately; burn it
        // so the first draw happens one full interval after promotion.
        interval.tick().await;

        loop {
            interval.tick().await;
            match self.draw_once(id).await {
                Ok(DrawOutcome::Drawn { .. }) => {}
                Ok(DrawOutcome::Completed) | Ok(DrawOutcome::Abandoned) => break,
                Err(e) => {
                    warn!(game_id = %id, error = %e, "draw tick failed, continuing");
                }
            }
        }

        self.active.lock().await.remove(&id);
        debug!(game_id = %id, "draw loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryGameStore, RecordingPublisher};
    use crate::domain::foundation::GameState;
    use crate::domain::game::POOL_SIZE;
    use chrono::{TimeZone, Utc};

    fn slot() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 20, 14, 30, 0).unwrap())
    }

    async fn running_game(store: &InMemoryGameStore) -> GameId {
        let id = store.create(slot()).await.unwrap();
        store.set_state(id, GameState::Running).await.unwrap();
        id
    }

    fn engine(
        store: &Arc<InMemoryGameStore>,
        publisher: &Arc<RecordingPublisher>,
    ) -> Arc<DrawEngine> {
        Arc::new(DrawEngine::with_config(
            store.clone(),
            publisher.clone(),
            DrawEngineConfig::default().with_tick_interval(Duration::from_secs(3600)),
        ))
    }

    #[tokio::test]
    async fn draw_once_persists_and_publishes() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let id = running_game(&store).await;

        let outcome = engine(&store, &publisher).draw_once(id).await.unwrap();

        let DrawOutcome::Drawn { number, sequence } = outcome else {
            panic!("expected a draw");
        };
        assert_eq!(sequence, 1);

        let game = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(game.drawn_numbers(), &[number]);

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].number, number);
        assert_eq!(published[0].sequence, 1);
        assert_eq!(published[0].event_name, "Bingo_2024-05-20_14:30");
    }

    #[tokio::test]
    async fn sequence_continues_from_existing_history() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let id = running_game(&store).await;
        store.update_numbers(id, &[7, 12, 40]).await.unwrap();

        let outcome = engine(&store, &publisher).draw_once(id).await.unwrap();

        let DrawOutcome::Drawn { sequence, .. } = outcome else {
            panic!("expected a draw");
        };
        assert_eq!(sequence, 4);
        assert_eq!(publisher.published()[0].sequence, 4);
    }

    #[tokio::test]
    async fn seventy_five_ticks_exhaust_the_pool() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let id = running_game(&store).await;
        let engine = engine(&store, &publisher);

        for expected in 1..POOL_SIZE as u32 {
            let outcome = engine.draw_once(id).await.unwrap();
            assert!(
                matches!(outcome, DrawOutcome::Drawn { sequence, .. } if sequence == expected),
                "tick {} should draw",
                expected
            );
        }
        // The 75th draw completes the game.
        assert_eq!(engine.draw_once(id).await.unwrap(), DrawOutcome::Completed);

        let game = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(game.state(), GameState::Finished);
        assert!(game.ends_at().is_some());

        // Every number drawn exactly once: a permutation of 1..=75.
        let mut numbers = game.drawn_numbers().to_vec();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=75).collect::<Vec<i16>>());

        assert_eq!(publisher.published().len(), POOL_SIZE);
    }

    #[tokio::test]
    async fn further_ticks_after_completion_stay_completed() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let id = running_game(&store).await;
        let full: Vec<i16> = (1..=75).collect();
        store.update_numbers(id, &full).await.unwrap();
        let engine = engine(&store, &publisher);

        assert_eq!(engine.draw_once(id).await.unwrap(), DrawOutcome::Completed);
        assert_eq!(engine.draw_once(id).await.unwrap(), DrawOutcome::Completed);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_persisted_draw() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::failing());
        let id = running_game(&store).await;

        let outcome = engine(&store, &publisher).draw_once(id).await.unwrap();

        assert!(matches!(outcome, DrawOutcome::Drawn { .. }));
        let game = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(game.drawn_numbers().len(), 1);
    }

    #[tokio::test]
    async fn missing_game_abandons_the_loop() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());

        let outcome = engine(&store, &publisher)
            .draw_once(GameId::from_i64(999))
            .await
            .unwrap();

        assert_eq!(outcome, DrawOutcome::Abandoned);
    }

    #[tokio::test]
    async fn start_is_idempotent_per_game() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let id = running_game(&store).await;
        let engine = engine(&store, &publisher);

        engine.start(id).await;
        engine.start(id).await;

        assert!(engine.is_active(id).await);
        assert_eq!(engine.active_count().await, 1);
    }

    #[tokio::test]
    async fn loops_are_keyed_per_game() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let first = running_game(&store).await;
        let second = store.create(slot().plus_minutes(30)).await.unwrap();
        store.set_state(second, GameState::Running).await.unwrap();
        let engine = engine(&store, &publisher);

        engine.start(first).await;
        engine.start(second).await;

        assert_eq!(engine.active_count().await, 2);
    }

    #[tokio::test]
    async fn timed_loop_draws_and_deregisters_when_done() {
        let store = Arc::new(InMemoryGameStore::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let id = running_game(&store).await;
        // One number short of complete so the first tick finishes it.
        let almost: Vec<i16> = (1..=74).collect();
        store.update_numbers(id, &almost).await.unwrap();

        let engine = Arc::new(DrawEngine::with_config(
            store.clone(),
            publisher.clone(),
            DrawEngineConfig::default().with_tick_interval(Duration::from_millis(10)),
        ));
        engine.start(id).await;

        // Give the loop a few intervals to run to completion.
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!engine.is_active(id).await);
        let game = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(game.state(), GameState::Finished);
        assert_eq!(game.drawn_numbers().last().copied(), Some(75));
        assert_eq!(publisher.published().len(), 1);
    }
}
