//! HTTP routes for game endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    current_game, get_game, list_games, sync_games, upcoming_games, GameHandlers,
};

/// Creates the game router with all endpoints.
pub fn game_routes(handlers: GameHandlers) -> Router {
    Router::new()
        .route("/", get(list_games))
        .route("/sync", post(sync_games))
        .route("/upcoming", get(upcoming_games))
        .route("/current", get(current_game))
        .route("/:id", get(get_game))
        .with_state(handlers)
}
