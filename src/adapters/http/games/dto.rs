//! HTTP DTOs for game endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::Serialize;

use crate::application::HorizonReport;
use crate::domain::foundation::{GameState, Timestamp};
use crate::domain::game::Game;

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Draw history view embedded in game responses.
#[derive(Debug, Clone, Serialize)]
pub struct NumbersView {
    pub list: Vec<i16>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<i16>,
}

/// Detailed game view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct GameResponse {
    pub id: i64,
    pub state: GameState,
    /// Derived from the slot relative to the request time.
    pub phase: &'static str,
    pub starts_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    pub observer_count: i32,
    pub created_at: String,
    pub numbers: NumbersView,
}

impl GameResponse {
    /// Builds the response view, deriving the future/past phase from `now`.
    pub fn from_game(game: &Game, now: &Timestamp) -> Self {
        let numbers = game.drawn_numbers().to_vec();
        Self {
            id: game.id().as_i64(),
            state: game.state(),
            phase: if game.is_future(now) { "future" } else { "past" },
            starts_at: game.starts_at().to_string(),
            ends_at: game.ends_at().map(|ts| ts.to_string()),
            observer_count: game.observer_count(),
            created_at: game.created_at().to_string(),
            numbers: NumbersView {
                last: numbers.last().copied(),
                total: numbers.len(),
                list: numbers,
            },
        }
    }
}

/// Aggregate counts over the full history.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub future: usize,
    pub past: usize,
    pub total_observers: i64,
    pub completed: usize,
}

/// Response for the history listing.
#[derive(Debug, Clone, Serialize)]
pub struct GameListResponse {
    pub total: usize,
    pub queried_at: String,
    pub summary: HistorySummary,
    pub games: Vec<GameResponse>,
}

impl GameListResponse {
    pub fn from_games(games: &[Game], now: &Timestamp) -> Self {
        let views: Vec<GameResponse> =
            games.iter().map(|g| GameResponse::from_game(g, now)).collect();
        let future = views.iter().filter(|v| v.phase == "future").count();
        Self {
            total: views.len(),
            queried_at: now.to_string(),
            summary: HistorySummary {
                future,
                past: views.len() - future,
                total_observers: games.iter().map(|g| g.observer_count() as i64).sum(),
                completed: games.iter().filter(|g| g.is_complete()).count(),
            },
            games: views,
        }
    }
}

/// Compact view of an upcoming scheduled game.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingGame {
    pub id: i64,
    pub starts_at: String,
    pub observer_count: i32,
    pub event_name: String,
}

impl From<&Game> for UpcomingGame {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id().as_i64(),
            starts_at: game.starts_at().to_string(),
            observer_count: game.observer_count(),
            event_name: game.event_name(),
        }
    }
}

/// Response for the upcoming listing.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingResponse {
    pub total: usize,
    pub games: Vec<UpcomingGame>,
}

/// Response for the currently running game. `game` is null when idle.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentGameResponse {
    pub game: Option<GameResponse>,
}

/// Response for a horizon sync pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub triggered_at: String,
    pub draw_interval_secs: u64,
    /// Ids of games created by this pass.
    pub created: Vec<i64>,
    /// Game that absorbed the request as demand, when nothing was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<i64>,
    pub upcoming: Vec<UpcomingGame>,
}

impl SyncResponse {
    pub fn from_report(report: &HorizonReport, now: &Timestamp, draw_interval_secs: u64) -> Self {
        Self {
            triggered_at: now.to_string(),
            draw_interval_secs,
            created: report.created.iter().map(|id| id.as_i64()).collect(),
            observed: report.observed.map(|id| id.as_i64()),
            upcoming: report.upcoming.iter().map(UpcomingGame::from).collect(),
        }
    }
}

/// Error payload for non-2xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::GameId;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 20, h, m, 0).unwrap())
    }

    fn game(id: i64, h: u32, m: u32, numbers: Vec<i16>) -> Game {
        Game::reconstitute(
            GameId::from_i64(id),
            GameState::Scheduled,
            at(h, m),
            numbers,
            None,
            1,
            at(h, m),
        )
    }

    #[test]
    fn phase_derives_from_request_time() {
        let g = game(1, 15, 0, vec![]);
        assert_eq!(GameResponse::from_game(&g, &at(14, 0)).phase, "future");
        assert_eq!(GameResponse::from_game(&g, &at(16, 0)).phase, "past");
    }

    #[test]
    fn numbers_view_exposes_last_draw() {
        let g = game(1, 15, 0, vec![7, 12, 40]);
        let view = GameResponse::from_game(&g, &at(14, 0));
        assert_eq!(view.numbers.total, 3);
        assert_eq!(view.numbers.last, Some(40));
    }

    #[test]
    fn summary_counts_future_and_past() {
        let games = vec![game(1, 13, 0, vec![]), game(2, 15, 0, vec![])];
        let response = GameListResponse::from_games(&games, &at(14, 0));
        assert_eq!(response.summary.future, 1);
        assert_eq!(response.summary.past, 1);
        assert_eq!(response.summary.total_observers, 2);
    }

    #[test]
    fn upcoming_game_carries_event_name() {
        let view = UpcomingGame::from(&game(3, 14, 30, vec![]));
        assert_eq!(view.event_name, "Bingo_2024-05-20_14:30");
    }
}
