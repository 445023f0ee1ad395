//! GameState enum for tracking the lifecycle of a bingo game.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a bingo game.
///
/// Transitions are monotonic: Scheduled -> Running -> Finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Scheduled,
    Running,
    Finished,
}

impl GameState {
    /// Validates a transition from this state to another.
    ///
    /// Valid transitions:
    /// - Scheduled -> Running
    /// - Running -> Finished
    pub fn can_transition_to(&self, target: &GameState) -> bool {
        use GameState::*;
        matches!((self, target), (Scheduled, Running) | (Running, Finished))
    }

    /// Returns true once the game has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::Finished)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Scheduled => "scheduled",
            GameState::Running => "running",
            GameState::Finished => "finished",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(GameState::Scheduled),
            "running" => Some(GameState::Running),
            "finished" => Some(GameState::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
