//! Server setup and initialization
//!
//! Provides the application builder and server runner. The gateway's
//! WebSocket route is mounted into the same process so the in-process
//! delivery registry sees the events the managers emit.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use parley_common::{AppConfig, AppError, JwtService};
use parley_core::SnowflakeGenerator;
use parley_db::{PgConversationRepository, PgMessageRepository, PgUserRepository};
use parley_gateway::{gateway_router, EventDispatcher, GatewayState};
use parley_service::ServiceContext;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application: REST routes with middleware, health
/// probes, and the gateway WebSocket route
pub fn create_app(state: AppState) -> Router {
    let gateway_state = GatewayState::new(state.service_context_arc(), state.registry().clone());

    let api = apply_middleware(create_router(), &state.config().cors);
    let api = api.merge(health_routes());

    api.with_state(state).merge(gateway_router(gateway_state))
}

/// Initialize PostgreSQL-backed dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = parley_db::DatabaseConfig::from(&config.database);
    let pool = parley_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    parley_db::pool::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let service_context = ServiceContext::new(
        Arc::new(PgConversationRepository::new(pool.clone())),
        Arc::new(PgMessageRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(JwtService::new(
            &config.auth.jwt_secret,
            config.auth.token_expiry_secs,
        )),
        Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)),
    );

    Ok(AppState::new(service_context, config))
}

/// Create AppState around an existing service context (any repository
/// implementations); used by the integration test harness
pub fn create_app_state_with(service_context: ServiceContext, config: AppConfig) -> AppState {
    AppState::new(service_context, config)
}

/// Start the event dispatcher that fans domain events out to connections
pub fn start_dispatcher(state: &AppState) -> Arc<EventDispatcher> {
    let dispatcher = EventDispatcher::new(
        state.registry().clone(),
        state.service_context().clone(),
    );
    dispatcher.start();
    dispatcher
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid server address: {e}")))?;

    let state = create_app_state(config).await?;
    let _dispatcher = start_dispatcher(&state);
    let app = create_app(state);

    run_server(app, addr).await
}
