//! Conversation database model

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use parley_core::{ConversationSettings, LastMessageSummary, Participant};

/// Database model for the conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: i64,
    pub kind: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub picture: Option<String>,
    pub direct_key: Option<String>,
    pub participants: Json<Vec<Participant>>,
    pub last_message: Option<Json<LastMessageSummary>>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub is_encrypted: bool,
    pub settings: Json<ConversationSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationRow {
    /// Check whether this row represents a direct conversation
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.kind == "direct"
    }
}
