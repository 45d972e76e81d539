//! Message row ↔ entity mapping

use parley_core::{ContentType, Message, Snowflake};

use crate::models::MessageRow;

/// Parse the stored content type discriminator
pub fn parse_content_type(value: &str) -> ContentType {
    match value {
        "image" => ContentType::Image,
        "file" => ContentType::File,
        "audio" => ContentType::Audio,
        "video" => ContentType::Video,
        "location" => ContentType::Location,
        _ => ContentType::Text,
    }
}

/// Stored discriminator for a content type
pub fn content_type_to_str(value: ContentType) -> &'static str {
    value.as_str()
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            conversation_id: Snowflake::new(row.conversation_id),
            sender_id: Snowflake::new(row.sender_id),
            content: row.content,
            content_type: parse_content_type(&row.content_type),
            metadata: row.metadata.map(|json| json.0),
            reply_to: row.reply_to.map(Snowflake::new),
            reactions: row.reactions.0,
            read_by: row.read_by.0,
            is_edited: row.is_edited,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
