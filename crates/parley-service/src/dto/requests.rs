//! Request DTOs with validation

use parley_core::{ContentType, ConversationKind, ConversationSettings, MessageMetadata, ParticipantRole};
use serde::Deserialize;
use validator::Validate;

/// Request body for creating a conversation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConversationRequest {
    pub kind: ConversationKind,
    /// Ids of the other participants (the actor is implicit)
    #[validate(length(min = 1, message = "at least one participant is required"))]
    pub participant_ids: Vec<String>,
    /// Required for group conversations
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for updating conversation profile fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateConversationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub picture: Option<String>,
    pub settings: Option<ConversationSettings>,
}

/// Request body for adding a participant
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddParticipantRequest {
    pub user_id: String,
    /// Defaults to member
    pub role: Option<ParticipantRole>,
}

/// Request body for sending a message
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "content must be 1-4000 characters"))]
    pub content: String,
    /// Defaults to text
    pub content_type: Option<ContentType>,
    /// Required (with type-specific fields) for non-text content
    pub metadata: Option<MessageMetadata>,
    /// Id of the message being replied to; must belong to the same conversation
    pub reply_to: Option<String>,
}

/// Request body for editing a message
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "content must be 1-4000 characters"))]
    pub content: String,
}

/// Request body for adding or replacing a reaction
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32))]
    pub emoji: String,
}
