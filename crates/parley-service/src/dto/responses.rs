//! Response DTOs

use chrono::{DateTime, Utc};
use parley_core::{
    ContentType, ConversationKind, ConversationSettings, MessageMetadata, ParticipantRole,
    Snowflake,
};
use serde::Serialize;

/// Participant entry in a conversation response
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub user_id: Snowflake,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

/// Last-message summary in a conversation response
#[derive(Debug, Clone, Serialize)]
pub struct LastMessageResponse {
    pub message_id: Snowflake,
    pub preview: String,
    pub sender_id: Snowflake,
    pub timestamp: DateTime<Utc>,
    pub content_type: ContentType,
}

/// Conversation response body
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: Snowflake,
    pub kind: ConversationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub participants: Vec<ParticipantResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessageResponse>,
    pub is_encrypted: bool,
    pub settings: ConversationSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reaction entry in a message response
#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub user_id: Snowflake,
    pub emoji: String,
    pub timestamp: DateTime<Utc>,
}

/// Read receipt entry in a message response
#[derive(Debug, Clone, Serialize)]
pub struct ReadReceiptResponse {
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

/// Message response body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Snowflake>,
    pub reactions: Vec<ReactionResponse>,
    pub read_by: Vec<ReadReceiptResponse>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    /// Build metadata from a page request and a total count
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A page of items plus its pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(page, limit, total),
        }
    }
}
