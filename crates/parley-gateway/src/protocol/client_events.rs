//! Inbound client event frames

use parley_core::{ContentType, MessageMetadata, Snowflake};
use serde::Deserialize;

/// Typed events a connected client may send.
///
/// Deserialization fails for unknown `type` values; the handler logs and
/// drops those frames without closing the connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    /// Send a message through the live connection
    Chat(ChatPayload),
    /// The user started typing in a conversation
    Typing(TypingPayload),
}

/// Payload of a `chat` frame
#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    pub conversation_id: Snowflake,
    pub content: String,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

/// Payload of a `typing` frame
#[derive(Debug, Clone, Deserialize)]
pub struct TypingPayload {
    pub conversation_id: Snowflake,
}
