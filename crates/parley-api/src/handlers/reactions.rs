//! Reaction handlers
//!
//! Endpoints for adding and removing the caller's reaction on a message.

use axum::extract::{Path, State};
use parley_service::{MessageResponse, MessageService, ReactionRequest};

use crate::extractors::{parse_snowflake, AuthUser, ValidatedJson};
use crate::response::{ok, ApiJson, ApiResult};
use crate::state::AppState;

/// Add or replace the caller's reaction (last write wins)
///
/// PUT /messages/{message_id}/reactions
pub async fn add_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReactionRequest>,
) -> ApiResult<ApiJson<MessageResponse>> {
    let message_id = parse_snowflake(&message_id, "message_id")?;

    let service = MessageService::new(state.service_context());
    let message = service.add_reaction(auth.user_id, message_id, request).await?;

    Ok(ok("Reaction added successfully", message))
}

/// Remove the caller's reaction (no-op when absent)
///
/// DELETE /messages/{message_id}/reactions
pub async fn remove_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<ApiJson<MessageResponse>> {
    let message_id = parse_snowflake(&message_id, "message_id")?;

    let service = MessageService::new(state.service_context());
    let message = service.remove_reaction(auth.user_id, message_id).await?;

    Ok(ok("Reaction removed successfully", message))
}
