//! Bingo caller service entry point.
//!
//! Wires the store, publisher, draw engine, promoter, and HTTP surface
//! together, then serves until an interrupt signal arrives. In-flight
//! draw timers are abandoned on shutdown; the store handle is closed.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bingo_caller::adapters::http::games::{game_routes, GameHandlers};
use bingo_caller::adapters::{PostgresGameStore, SocketPublisher, SocketPublisherConfig};
use bingo_caller::application::{
    DrawEngine, DrawEngineConfig, HorizonMaintainer, LifecyclePromoter, RetentionTrimmer,
};
use bingo_caller::config::AppConfig;
use bingo_caller::ports::{DrawPublisher, GameStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        environment = ?config.server.environment,
        "starting bingo caller"
    );

    // Durable store
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let store: Arc<dyn GameStore> = Arc::new(PostgresGameStore::new(pool.clone()));

    // Outbound sink
    let socket_timeout = config.socket.timeout();
    let socket_config = SocketPublisherConfig::new(
        config.socket.url.clone(),
        config.socket.channel.clone(),
        config.socket.token,
    )
    .with_timeout(socket_timeout);
    let publisher: Arc<dyn DrawPublisher> = Arc::new(SocketPublisher::new(socket_config));

    // Scheduler components
    let engine = Arc::new(DrawEngine::with_config(
        store.clone(),
        publisher,
        DrawEngineConfig::default().with_tick_interval(config.game.draw_interval()),
    ));
    let promoter = Arc::new(LifecyclePromoter::new(store.clone(), engine));
    let trimmer = RetentionTrimmer::new(store.clone(), config.game.retention_cap);
    let horizon = Arc::new(HorizonMaintainer::new(store.clone(), trimmer));

    // Promotion loop: fires on every half-hour boundary.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let promoter_task = {
        let promoter = promoter.clone();
        tokio::spawn(async move {
            promoter.run(shutdown_rx).await;
        })
    };

    // HTTP surface
    let handlers = GameHandlers::new(store, horizon, config.game.draw_interval_secs);
    let app = axum::Router::new()
        .nest("/api/games", game_routes(handlers))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    let addr = config.server.socket_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the promotion loop; running draw timers are abandoned.
    if shutdown_tx.send(true).is_err() {
        error!("promoter already stopped");
    }
    let _ = promoter_task.await;

    pool.close().await;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for interrupt signal");
    }
    info!("interrupt received, shutting down");
}
