//! Game aggregate entity.
//!
//! A game is one timed bingo run: it occupies a half-hour slot, is promoted
//! to running at its exact start time, accumulates drawn numbers until the
//! pool is exhausted, and is then finished.

use crate::domain::foundation::{DomainError, ErrorCode, GameId, GameState, Timestamp};
use serde::{Deserialize, Serialize};

/// Size of the number pool; a finished game has drawn every value once.
pub const POOL_SIZE: usize = 75;

/// Smallest drawable number.
pub const MIN_NUMBER: i16 = 1;

/// Largest drawable number.
pub const MAX_NUMBER: i16 = 75;

/// Game aggregate - one bingo run with a draw history and lifecycle state.
///
/// # Invariants
///
/// - `drawn_numbers` has no duplicates, each value in 1..=75, length <= 75
/// - `state` only moves Scheduled -> Running -> Finished
/// - `starts_at` is half-hour aligned with seconds zero
/// - `observer_count` >= 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Store-assigned identity.
    id: GameId,

    /// Current lifecycle state.
    state: GameState,

    /// The half-hour slot this game occupies.
    starts_at: Timestamp,

    /// Numbers drawn so far, in draw order.
    drawn_numbers: Vec<i16>,

    /// Set when the game finishes.
    ends_at: Option<Timestamp>,

    /// Demand counter, bumped when a client hits an existing future slot.
    observer_count: i32,

    /// When the row was inserted.
    created_at: Timestamp,
}

impl Game {
    /// Creates a freshly scheduled game for a slot.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `starts_at` is not half-hour aligned
    pub fn schedule(id: GameId, starts_at: Timestamp) -> Result<Self, DomainError> {
        Self::validate_slot(&starts_at)?;

        Ok(Self {
            id,
            state: GameState::Scheduled,
            starts_at,
            drawn_numbers: Vec::new(),
            ends_at: None,
            observer_count: 1,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitute a game from persistence (no validation).
    pub fn reconstitute(
        id: GameId,
        state: GameState,
        starts_at: Timestamp,
        drawn_numbers: Vec<i16>,
        ends_at: Option<Timestamp>,
        observer_count: i32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            state,
            starts_at,
            drawn_numbers,
            ends_at,
            observer_count,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the game ID.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Returns the slot this game occupies.
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    /// Returns the numbers drawn so far, in draw order.
    pub fn drawn_numbers(&self) -> &[i16] {
        &self.drawn_numbers
    }

    /// Returns the most recently drawn number, if any.
    pub fn last_number(&self) -> Option<i16> {
        self.drawn_numbers.last().copied()
    }

    /// Returns when the game finished, if it has.
    pub fn ends_at(&self) -> Option<Timestamp> {
        self.ends_at
    }

    /// Returns the demand counter.
    pub fn observer_count(&self) -> i32 {
        self.observer_count
    }

    /// Returns when the row was inserted.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// True once every number in the pool has been drawn.
    pub fn is_complete(&self) -> bool {
        self.drawn_numbers.len() >= POOL_SIZE
    }

    /// The 1-based sequence index the next draw will carry.
    pub fn next_sequence(&self) -> u32 {
        self.drawn_numbers.len() as u32 + 1
    }

    /// True if the game's slot is still ahead of `now`.
    pub fn is_future(&self, now: &Timestamp) -> bool {
        self.starts_at.is_after(now)
    }

    /// Event name this game's draws are published under.
    ///
    /// Derived from the slot, so every draw of one game shares the name:
    /// `Bingo_2024-05-20_14:30`.
    pub fn event_name(&self) -> String {
        format!(
            "Bingo_{}",
            self.starts_at.as_datetime().format("%Y-%m-%d_%H:%M")
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Promote the game from scheduled to running.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the game is scheduled
    pub fn promote(&mut self) -> Result<(), DomainError> {
        self.transition_to(GameState::Running)
    }

    /// Record one drawn number.
    ///
    /// Returns the 1-based sequence index of the draw.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the game is running
    /// - `ValidationFailed` if the number is outside 1..=75
    /// - `DuplicateDraw` if the number was already drawn
    /// - `PoolExhausted` if all 75 numbers are already drawn
    pub fn record_draw(&mut self, number: i16) -> Result<u32, DomainError> {
        if self.state != GameState::Running {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot draw in state {}", self.state),
            ));
        }
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
            return Err(DomainError::validation(
                "number",
                format!("Number must be between {} and {}", MIN_NUMBER, MAX_NUMBER),
            ));
        }
        if self.is_complete() {
            return Err(DomainError::new(
                ErrorCode::PoolExhausted,
                "All numbers have been drawn",
            ));
        }
        if self.drawn_numbers.contains(&number) {
            return Err(DomainError::new(
                ErrorCode::DuplicateDraw,
                format!("Number {} was already drawn", number),
            ));
        }

        self.drawn_numbers.push(number);
        Ok(self.drawn_numbers.len() as u32)
    }

    /// Finish the game, stamping when it ended.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the game is running
    pub fn finish(&mut self, ended_at: Timestamp) -> Result<(), DomainError> {
        self.transition_to(GameState::Finished)?;
        self.ends_at = Some(ended_at);
        Ok(())
    }

    /// Bump the demand counter.
    ///
    /// Policy (only counting observers on future scheduled games) is owned
    /// by the horizon maintainer, not the aggregate.
    pub fn add_observer(&mut self) {
        self.observer_count += 1;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn transition_to(&mut self, target: GameState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(&target) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move from {} to {}", self.state, target),
            ));
        }
        self.state = target;
        Ok(())
    }

    fn validate_slot(starts_at: &Timestamp) -> Result<(), DomainError> {
        let aligned = starts_at.truncate_to_minute() == *starts_at
            && (starts_at.minute() == 0 || starts_at.minute() == 30);
        if aligned {
            Ok(())
        } else {
            Err(DomainError::validation(
                "starts_at",
                "Start time must fall on a half-hour boundary",
            ))
        }
    }
}
