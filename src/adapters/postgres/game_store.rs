//! PostgreSQL implementation of GameStore.
//!
//! Persists `Game` rows to the `games` table. Drawn numbers live in a
//! SMALLINT[] column so ordering and element typing stay in the schema.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, GameId, GameState, Timestamp};
use crate::domain::game::Game;
use crate::ports::GameStore;

/// PostgreSQL implementation of GameStore.
#[derive(Clone)]
pub struct PostgresGameStore {
    pool: PgPool,
}

impl PostgresGameStore {
    /// Creates a new PostgresGameStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameStore for PostgresGameStore {
    async fn create(&self, starts_at: Timestamp) -> Result<GameId, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO games (state, starts_at, drawn_numbers, observer_count, created_at)
            VALUES ($1, $2, '{}', 1, NOW())
            RETURNING id
            "#,
        )
        .bind(GameState::Scheduled.as_str())
        .bind(starts_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert game: {}", e)))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| DomainError::storage(format!("Failed to get id: {}", e)))?;

        Ok(GameId::from_i64(id))
    }

    async fn find_by_id(&self, id: GameId) -> Result<Option<Game>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, state, starts_at, drawn_numbers, ends_at, observer_count, created_at
            FROM games
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to fetch game: {}", e)))?;

        row.map(row_to_game).transpose()
    }

    async fn list_by_state(
        &self,
        state: GameState,
        after: Timestamp,
    ) -> Result<Vec<Game>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, state, starts_at, drawn_numbers, ends_at, observer_count, created_at
            FROM games
            WHERE state = $1 AND starts_at > $2
            ORDER BY starts_at ASC, id ASC
            "#,
        )
        .bind(state.as_str())
        .bind(after.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list games by state: {}", e)))?;

        rows.into_iter().map(row_to_game).collect()
    }

    async fn find_scheduled_at(
        &self,
        starts_at: Timestamp,
    ) -> Result<Option<Game>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, state, starts_at, drawn_numbers, ends_at, observer_count, created_at
            FROM games
            WHERE state = $1 AND starts_at = $2
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(GameState::Scheduled.as_str())
        .bind(starts_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to fetch due game: {}", e)))?;

        row.map(row_to_game).transpose()
    }

    async fn find_running(&self) -> Result<Option<Game>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, state, starts_at, drawn_numbers, ends_at, observer_count, created_at
            FROM games
            WHERE state = $1
            ORDER BY starts_at DESC
            LIMIT 1
            "#,
        )
        .bind(GameState::Running.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to fetch running game: {}", e)))?;

        row.map(row_to_game).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Game>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, state, starts_at, drawn_numbers, ends_at, observer_count, created_at
            FROM games
            ORDER BY starts_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list games: {}", e)))?;

        rows.into_iter().map(row_to_game).collect()
    }

    async fn update_numbers(&self, id: GameId, numbers: &[i16]) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE games SET drawn_numbers = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(numbers)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update numbers: {}", e)))?;

        ensure_row_touched(result.rows_affected(), id)
    }

    async fn set_state(&self, id: GameId, state: GameState) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE games SET state = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(state.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to set state: {}", e)))?;

        ensure_row_touched(result.rows_affected(), id)
    }

    async fn mark_finished(&self, id: GameId, ended_at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE games SET state = $2, ends_at = $3 WHERE id = $1")
            .bind(id.as_i64())
            .bind(GameState::Finished.as_str())
            .bind(ended_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to finish game: {}", e)))?;

        ensure_row_touched(result.rows_affected(), id)
    }

    async fn increment_observers(&self, id: GameId) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE games SET observer_count = observer_count + 1 WHERE id = $1")
                .bind(id.as_i64())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to increment observers: {}", e))
                })?;

        ensure_row_touched(result.rows_affected(), id)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count games: {}", e)))?;

        Ok(result.0 as u64)
    }

    async fn delete_oldest(&self, n: u64) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM games
            WHERE id IN (
                SELECT id FROM games
                ORDER BY starts_at ASC, id ASC
                LIMIT $1
            )
            "#,
        )
        .bind(n as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete oldest games: {}", e)))?;

        Ok(result.rows_affected())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn ensure_row_touched(rows_affected: u64, id: GameId) -> Result<(), DomainError> {
    if rows_affected == 0 {
        return Err(DomainError::new(
            ErrorCode::GameNotFound,
            format!("Game not found: {}", id),
        ));
    }
    Ok(())
}

fn row_to_game(row: sqlx::postgres::PgRow) -> Result<Game, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Failed to get id: {}", e)))?;

    let state_str: String = row
        .try_get("state")
        .map_err(|e| DomainError::storage(format!("Failed to get state: {}", e)))?;
    let state = GameState::parse(&state_str)
        .ok_or_else(|| DomainError::storage(format!("Invalid game state: {}", state_str)))?;

    let starts_at: chrono::DateTime<chrono::Utc> = row
        .try_get("starts_at")
        .map_err(|e| DomainError::storage(format!("Failed to get starts_at: {}", e)))?;

    let drawn_numbers: Vec<i16> = row
        .try_get("drawn_numbers")
        .map_err(|e| DomainError::storage(format!("Failed to get drawn_numbers: {}", e)))?;

    let ends_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("ends_at")
        .map_err(|e| DomainError::storage(format!("Failed to get ends_at: {}", e)))?;

    let observer_count: i32 = row
        .try_get("observer_count")
        .map_err(|e| DomainError::storage(format!("Failed to get observer_count: {}", e)))?;

    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::storage(format!("Failed to get created_at: {}", e)))?;

    Ok(Game::reconstitute(
        GameId::from_i64(id),
        state,
        Timestamp::from_datetime(starts_at),
        drawn_numbers,
        ends_at.map(Timestamp::from_datetime),
        observer_count,
        Timestamp::from_datetime(created_at),
    ))
}
