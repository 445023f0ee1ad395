//! Game HTTP endpoints.

mod dto;
mod handlers;
mod routes;

pub use handlers::GameHandlers;
pub use routes::game_routes;
