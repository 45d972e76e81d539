//! Conversation row ↔ entity mapping

use parley_core::{Conversation, ConversationKind, Snowflake};

use crate::models::ConversationRow;

/// Parse the stored kind discriminator
pub fn parse_kind(kind: &str) -> ConversationKind {
    match kind {
        "group" => ConversationKind::Group,
        _ => ConversationKind::Direct,
    }
}

/// Stored discriminator for a conversation kind
pub fn kind_to_str(kind: ConversationKind) -> &'static str {
    match kind {
        ConversationKind::Direct => "direct",
        ConversationKind::Group => "group",
    }
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            kind: parse_kind(&row.kind),
            name: row.name,
            description: row.description,
            picture: row.picture,
            participants: row.participants.0,
            last_message: row.last_message.map(|json| json.0),
            is_encrypted: row.is_encrypted,
            settings: row.settings.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
