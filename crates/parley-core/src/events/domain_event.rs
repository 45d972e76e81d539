//! Domain events - events emitted when domain state changes
//!
//! These events feed the live-delivery fan-out to WebSocket clients. Delivery
//! is best-effort; the store remains the source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ContentType, ConversationKind, ParticipantRole};
use crate::value_objects::Snowflake;

/// All domain events this core emits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatEvent {
    // =========================================================================
    // Conversation Events
    // =========================================================================
    ConversationCreated(ConversationCreatedEvent),
    ConversationUpdated(ConversationUpdatedEvent),
    ConversationDeleted(ConversationDeletedEvent),

    // =========================================================================
    // Participant Events
    // =========================================================================
    ParticipantAdded(ParticipantAddedEvent),
    ParticipantRemoved(ParticipantRemovedEvent),

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageCreated(MessageCreatedEvent),
    MessageUpdated(MessageUpdatedEvent),
    MessageDeleted(MessageDeletedEvent),

    // =========================================================================
    // Reaction Events
    // =========================================================================
    ReactionAdded(ReactionAddedEvent),
    ReactionRemoved(ReactionRemovedEvent),

    // =========================================================================
    // Presence Events
    // =========================================================================
    TypingStarted(TypingStartedEvent),
}

impl ChatEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ConversationCreated(_) => "CONVERSATION_CREATED",
            Self::ConversationUpdated(_) => "CONVERSATION_UPDATED",
            Self::ConversationDeleted(_) => "CONVERSATION_DELETED",
            Self::ParticipantAdded(_) => "PARTICIPANT_ADDED",
            Self::ParticipantRemoved(_) => "PARTICIPANT_REMOVED",
            Self::MessageCreated(_) => "MESSAGE_CREATED",
            Self::MessageUpdated(_) => "MESSAGE_UPDATED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
            Self::ReactionAdded(_) => "REACTION_ADDED",
            Self::ReactionRemoved(_) => "REACTION_REMOVED",
            Self::TypingStarted(_) => "TYPING_STARTED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ConversationCreated(e) => e.timestamp,
            Self::ConversationUpdated(e) => e.timestamp,
            Self::ConversationDeleted(e) => e.timestamp,
            Self::ParticipantAdded(e) => e.timestamp,
            Self::ParticipantRemoved(e) => e.timestamp,
            Self::MessageCreated(e) => e.timestamp,
            Self::MessageUpdated(e) => e.timestamp,
            Self::MessageDeleted(e) => e.timestamp,
            Self::ReactionAdded(e) => e.timestamp,
            Self::ReactionRemoved(e) => e.timestamp,
            Self::TypingStarted(e) => e.timestamp,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationCreatedEvent {
    pub conversation_id: Snowflake,
    pub kind: ConversationKind,
    pub created_by: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationUpdatedEvent {
    pub conversation_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDeletedEvent {
    pub conversation_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantAddedEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub role: ParticipantRole,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRemovedEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content_type: ContentType,
    pub preview: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdatedEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemovedEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartedEvent {
    pub conversation_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Creation Helpers
// ============================================================================

impl MessageCreatedEvent {
    pub fn new(
        message_id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content_type: ContentType,
        preview: String,
    ) -> Self {
        Self {
            message_id,
            conversation_id,
            sender_id,
            content_type,
            preview,
            timestamp: Utc::now(),
        }
    }
}

impl TypingStartedEvent {
    pub fn new(conversation_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            conversation_id,
            user_id,
            timestamp: Utc::now(),
        }
    }
}
