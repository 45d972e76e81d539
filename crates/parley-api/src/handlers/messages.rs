//! Message handlers
//!
//! Endpoints for message operations.

use axum::extract::{Path, State};
use parley_service::{
    EditMessageRequest, MessageResponse, MessageService, SendMessageRequest,
};

use crate::extractors::{parse_snowflake, AuthUser, Pagination, ValidatedJson};
use crate::response::{created, ok, ok_message, ok_page, ApiJson, ApiResult};
use crate::state::AppState;

/// Send a message
///
/// POST /conversations/{conversation_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<ApiJson<MessageResponse>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;

    let service = MessageService::new(state.service_context());
    let message = service.send_message(auth.user_id, conversation_id, request).await?;

    Ok(created("Message sent successfully", message))
}

/// List messages (oldest-first page; records read receipts as a side effect)
///
/// GET /conversations/{conversation_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    pagination: Pagination,
) -> ApiResult<ApiJson<Vec<MessageResponse>>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;

    let service = MessageService::new(state.service_context());
    let page = service
        .get_messages(auth.user_id, conversation_id, pagination.page, pagination.limit)
        .await?;

    Ok(ok_page("Messages fetched successfully", page))
}

/// Edit a message (sender only)
///
/// PATCH /messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
    ValidatedJson(request): ValidatedJson<EditMessageRequest>,
) -> ApiResult<ApiJson<MessageResponse>> {
    let message_id = parse_snowflake(&message_id, "message_id")?;

    let service = MessageService::new(state.service_context());
    let message = service.edit_message(auth.user_id, message_id, request).await?;

    Ok(ok("Message edited successfully", message))
}

/// Soft-delete a message (sender only)
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(message_id): Path<String>,
) -> ApiResult<ApiJson<serde_json::Value>> {
    let message_id = parse_snowflake(&message_id, "message_id")?;

    let service = MessageService::new(state.service_context());
    service.delete_message(auth.user_id, message_id).await?;

    Ok(ok_message("Message deleted successfully"))
}
