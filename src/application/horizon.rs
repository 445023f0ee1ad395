//! HorizonMaintainer - keeps the rolling window of future games populated.
//!
//! Triggered on demand (the sync endpoint). Computes the required upcoming
//! slots, creates games for the ones that are missing, and when the horizon
//! is already full counts the request as demand on the nearest game instead.

use std::sync::Arc;

use tracing::info;

use crate::application::retention::RetentionTrimmer;
use crate::domain::foundation::{DomainError, GameId, GameState, Timestamp};
use crate::domain::game::Game;
use crate::domain::schedule::upcoming_slots;
use crate::ports::GameStore;

/// Two slots within this distance are considered the same slot. Guards
/// against sub-second skew between a computed slot and a stored row.
const SLOT_MATCH_TOLERANCE_SECS: i64 = 1;

/// Outcome of one horizon pass.
#[derive(Debug, Clone)]
pub struct HorizonReport {
    /// Upcoming scheduled games after the pass, ascending by start time.
    ///
    /// When the pass only counted an observer, the affected entry carries
    /// the bumped count in this view.
    pub upcoming: Vec<Game>,

    /// Ids of games created by this pass, in slot order.
    pub created: Vec<GameId>,

    /// Game that received an observer increment, when nothing was created.
    pub observed: Option<GameId>,
}

/// Keeps at least the required number of future scheduled games alive.
pub struct HorizonMaintainer {
    store: Arc<dyn GameStore>,
    trimmer: RetentionTrimmer,
}

impl HorizonMaintainer {
    pub fn new(store: Arc<dyn GameStore>, trimmer: RetentionTrimmer) -> Self {
        Self { store, trimmer }
    }

    /// Run one horizon pass for the given reference time.
    ///
    /// Concurrent passes may race; the tolerance match (not a uniqueness
    /// constraint) is what prevents duplicate slots, so a narrow window
    /// for duplicates is accepted.
    ///
    /// # Errors
    ///
    /// - `StorageError` if any store operation fails; the pass aborts
    pub async fn ensure(&self, now: Timestamp) -> Result<HorizonReport, DomainError> {
        let existing = self.store.list_by_state(GameState::Scheduled, now).await?;

        let missing: Vec<Timestamp> = upcoming_slots(now)
            .filter(|slot| !Self::has_slot(&existing, slot))
            .collect();

        if missing.is_empty() {
            return self.observe_nearest(existing).await;
        }

        // Bound table growth before inserting new rows.
        self.trimmer.trim().await;

        let mut created = Vec::with_capacity(missing.len());
        for slot in missing {
            let id = self.store.create(slot).await?;
            info!(game_id = %id, starts_at = %slot, "scheduled game for open slot");
            created.push(id);
        }

        let upcoming = self.store.list_by_state(GameState::Scheduled, now).await?;
        Ok(HorizonReport {
            upcoming,
            created,
            observed: None,
        })
    }

    /// The horizon is full: record demand on the nearest upcoming game.
    async fn observe_nearest(
        &self,
        mut upcoming: Vec<Game>,
    ) -> Result<HorizonReport, DomainError> {
        let Some(nearest) = upcoming.first_mut() else {
            // Unreachable in practice: a full horizon implies upcoming rows.
            return Ok(HorizonReport {
                upcoming,
                created: Vec::new(),
                observed: None,
            });
        };

        self.store.increment_observers(nearest.id()).await?;
        info!(game_id = %nearest.id(), "observer added to nearest game");

        // Patch the returned view; re-reading the row would cost a query
        // for a value we already know.
        nearest.add_observer();
        let observed = Some(nearest.id());

        Ok(HorizonReport {
            upcoming,
            created: Vec::new(),
            observed,
        })
    }

    fn has_slot(existing: &[Game], slot: &Timestamp) -> bool {
        existing
            .iter()
            .any(|game| game.starts_at().abs_diff_secs(slot) <= SLOT_MATCH_TOLERANCE_SECS)
    }
}
