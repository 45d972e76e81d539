//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{conversations, health, messages, reactions};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (mounted outside the versioned prefix)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}

/// Conversation routes
fn conversation_routes() -> Router<AppState> {
    Router::new()
        // Conversation CRUD
        .route("/conversations", post(conversations::create_conversation))
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/:conversation_id", get(conversations::get_conversation))
        .route("/conversations/:conversation_id", patch(conversations::update_conversation))
        .route("/conversations/:conversation_id", delete(conversations::delete_conversation))
        // Participants
        .route(
            "/conversations/:conversation_id/participants",
            post(conversations::add_participant),
        )
        .route(
            "/conversations/:conversation_id/participants/:user_id",
            delete(conversations::remove_participant),
        )
        // Messages within a conversation
        .route(
            "/conversations/:conversation_id/messages",
            post(messages::send_message),
        )
        .route(
            "/conversations/:conversation_id/messages",
            get(messages::get_messages),
        )
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages/:message_id", patch(messages::edit_message))
        .route("/messages/:message_id", delete(messages::delete_message))
        // The caller's reaction on a message
        .route("/messages/:message_id/reactions", put(reactions::add_reaction))
        .route("/messages/:message_id/reactions", delete(reactions::remove_reaction))
}
