//! Gateway server wiring

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::routing::get;
use axum::Router;

/// Build the gateway router, ready to merge into the serving process
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .with_state(state)
}
