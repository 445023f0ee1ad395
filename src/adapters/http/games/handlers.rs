//! HTTP handlers for game endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::HorizonMaintainer;
use crate::domain::foundation::{DomainError, ErrorCode, GameId, GameState, Timestamp};
use crate::ports::GameStore;

use super::dto::{
    CurrentGameResponse, ErrorResponse, GameListResponse, GameResponse, SyncResponse,
    UpcomingGame, UpcomingResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct GameHandlers {
    store: Arc<dyn GameStore>,
    horizon: Arc<HorizonMaintainer>,
    draw_interval_secs: u64,
}

impl GameHandlers {
    pub fn new(
        store: Arc<dyn GameStore>,
        horizon: Arc<HorizonMaintainer>,
        draw_interval_secs: u64,
    ) -> Self {
        Self {
            store,
            horizon,
            draw_interval_secs,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/games/{id} - Game details with derived future/past phase
pub async fn get_game(
    State(handlers): State<GameHandlers>,
    Path(game_id): Path<String>,
) -> Response {
    let game_id = match game_id.parse::<GameId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid game ID")),
            )
                .into_response()
        }
    };

    match handlers.store.find_by_id(game_id).await {
        Ok(Some(game)) => {
            let response = GameResponse::from_game(&game, &Timestamp::now());
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(format!(
                "No game with ID {}",
                game_id
            ))),
        )
            .into_response(),
        Err(e) => handle_store_error(e),
    }
}

/// GET /api/games - Full history, newest slot first
pub async fn list_games(State(handlers): State<GameHandlers>) -> Response {
    match handlers.store.list_all().await {
        Ok(games) => {
            let response = GameListResponse::from_games(&games, &Timestamp::now());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_store_error(e),
    }
}

/// GET /api/games/upcoming - Scheduled games still ahead of now
pub async fn upcoming_games(State(handlers): State<GameHandlers>) -> Response {
    let now = Timestamp::now();
    match handlers.store.list_by_state(GameState::Scheduled, now).await {
        Ok(games) => {
            let views: Vec<UpcomingGame> = games.iter().map(UpcomingGame::from).collect();
            let response = UpcomingResponse {
                total: views.len(),
                games: views,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_store_error(e),
    }
}

/// GET /api/games/current - The running game, if any
pub async fn current_game(State(handlers): State<GameHandlers>) -> Response {
    match handlers.store.find_running().await {
        Ok(game) => {
            let response = CurrentGameResponse {
                game: game.map(|g| GameResponse::from_game(&g, &Timestamp::now())),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_store_error(e),
    }
}

/// POST /api/games/sync - Run one horizon pass
pub async fn sync_games(State(handlers): State<GameHandlers>) -> Response {
    let now = Timestamp::now();
    match handlers.horizon.ensure(now).await {
        Ok(report) => {
            let response = SyncResponse::from_report(&report, &now, handlers.draw_interval_secs);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_store_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn handle_store_error(e: DomainError) -> Response {
    error!(error = %e, "game request failed");
    let status = match e.code {
        ErrorCode::GameNotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse::new(e.code.to_string(), e.message)),
    )
        .into_response()
}
