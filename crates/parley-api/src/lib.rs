//! # parley-api
//!
//! REST API server built with Axum, serving the conversation and message
//! surface plus the WebSocket gateway route in one process (the in-process
//! delivery registry requires colocation).

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_app_state_with, run, start_dispatcher};
pub use state::AppState;
