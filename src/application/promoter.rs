//! LifecyclePromoter - promotes scheduled games at half-hour boundaries.
//!
//! Driven by a wall-clock tick on every :00 and :30 (plus one catch-up
//! check at process start). A tick promotes at most one game: the
//! scheduled row whose start time exactly equals the second-truncated
//! boundary instant.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info};

use crate::application::draw_engine::DrawEngine;
use crate::domain::foundation::{DomainError, GameId, GameState, Timestamp};
use crate::domain::schedule::next_slot;
use crate::ports::GameStore;

/// Promotes due games and hands them to the draw engine.
pub struct LifecyclePromoter {
    store: Arc<dyn GameStore>,
    engine: Arc<DrawEngine>,
}

impl LifecyclePromoter {
    pub fn new(store: Arc<dyn GameStore>, engine: Arc<DrawEngine>) -> Self {
        Self { store, engine }
    }

    /// Run one promotion check against the given wall-clock instant.
    ///
    /// Returns the promoted game id, or `None` when the minute is not a
    /// boundary or no scheduled game matches the boundary exactly.
    ///
    /// # Errors
    ///
    /// - `StorageError` if querying or updating the store fails
    pub async fn tick(&self, now: Timestamp) -> Result<Option<GameId>, DomainError> {
        let minute = now.minute();
        if minute != 0 && minute != 30 {
            debug!(minute, "not a promotion boundary");
            return Ok(None);
        }

        let boundary = now.truncate_to_minute();
        let Some(game) = self.store.find_scheduled_at(boundary).await? else {
            info!(boundary = %boundary, "no game scheduled for this boundary");
            return Ok(None);
        };

        self.store.set_state(game.id(), GameState::Running).await?;
        info!(game_id = %game.id(), starts_at = %game.starts_at(), "game promoted to running");

        self.engine.start(game.id()).await;
        Ok(Some(game.id()))
    }

    /// Tick on every half-hour boundary until shutdown is signalled.
    ///
    /// Performs one immediate catch-up check first, matching the process
    /// start behavior: a game whose boundary just passed while the
    /// process was down still gets promoted if the clock still sits
    /// inside its boundary minute.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.tick(Timestamp::now()).await {
            error!(error = %e, "startup promotion check failed");
        }

        loop {
            let wait = Self::until_next_boundary(Timestamp::now());
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }

                _ = time::sleep(wait) => {
                    if let Err(e) = self.tick(Timestamp::now()).await {
                        error!(error = %e, "promotion tick failed");
                    }
                }
            }
        }
    }

    /// Time left until the next :00 or :30 boundary.
    fn until_next_boundary(now: Timestamp) -> Duration {
        next_slot(now)
            .duration_since(&now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
