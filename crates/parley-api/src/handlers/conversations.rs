//! Conversation handlers
//!
//! Endpoints for conversation lifecycle and participant management.

use axum::extract::{Path, State};
use parley_service::{
    AddParticipantRequest, ConversationResponse, ConversationService, CreateConversationRequest,
    UpdateConversationRequest,
};

use crate::extractors::{parse_snowflake, AuthUser, Pagination, ValidatedJson};
use crate::response::{created, ok, ok_message, ok_page, ApiJson, ApiResult};
use crate::state::AppState;

/// Create a conversation (idempotent for direct pairs)
///
/// POST /conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateConversationRequest>,
) -> ApiResult<ApiJson<ConversationResponse>> {
    let service = ConversationService::new(state.service_context());
    let creation = service.create_conversation(auth.user_id, request).await?;

    if creation.created {
        Ok(created("Conversation created successfully", creation.conversation))
    } else {
        Ok(ok("Conversation already exists", creation.conversation))
    }
}

/// List the caller's conversations
///
/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
    pagination: Pagination,
) -> ApiResult<ApiJson<Vec<ConversationResponse>>> {
    let service = ConversationService::new(state.service_context());
    let page = service
        .list_conversations(auth.user_id, pagination.page, pagination.limit)
        .await?;

    Ok(ok_page("Conversations fetched successfully", page))
}

/// Get a conversation
///
/// GET /conversations/{conversation_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<ApiJson<ConversationResponse>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;

    let service = ConversationService::new(state.service_context());
    let conversation = service.get_conversation(auth.user_id, conversation_id).await?;

    Ok(ok("Conversation fetched successfully", conversation))
}

/// Update conversation profile fields (admin only)
///
/// PATCH /conversations/{conversation_id}
pub async fn update_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateConversationRequest>,
) -> ApiResult<ApiJson<ConversationResponse>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;

    let service = ConversationService::new(state.service_context());
    let conversation = service
        .update_conversation(auth.user_id, conversation_id, request)
        .await?;

    Ok(ok("Conversation updated successfully", conversation))
}

/// Delete a conversation and its messages (admin only)
///
/// DELETE /conversations/{conversation_id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<ApiJson<serde_json::Value>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;

    let service = ConversationService::new(state.service_context());
    service.delete_conversation(auth.user_id, conversation_id).await?;

    Ok(ok_message("Conversation deleted successfully"))
}

/// Add a participant (admin only, idempotent)
///
/// POST /conversations/{conversation_id}/participants
pub async fn add_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddParticipantRequest>,
) -> ApiResult<ApiJson<ConversationResponse>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;

    let service = ConversationService::new(state.service_context());
    let conversation = service
        .add_participant(auth.user_id, conversation_id, request)
        .await?;

    Ok(ok("Participant added successfully", conversation))
}

/// Remove a participant (admin only)
///
/// DELETE /conversations/{conversation_id}/participants/{user_id}
pub async fn remove_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((conversation_id, user_id)): Path<(String, String)>,
) -> ApiResult<ApiJson<ConversationResponse>> {
    let conversation_id = parse_snowflake(&conversation_id, "conversation_id")?;
    let user_id = parse_snowflake(&user_id, "user_id")?;

    let service = ConversationService::new(state.service_context());
    let conversation = service
        .remove_participant(auth.user_id, conversation_id, user_id)
        .await?;

    Ok(ok("Participant removed successfully", conversation))
}
