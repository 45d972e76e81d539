//! Message entity - a message within a conversation
//!
//! Reactions and read receipts are keyed by user id so the at-most-one-entry
//! per user invariant is structural rather than enforced by lookup logic.
//! Messages are only ever soft-deleted by their sender; the content stays in
//! storage and is hidden from default reads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::conversation::LastMessageSummary;
use crate::value_objects::Snowflake;

/// Content type of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Image,
    File,
    Audio,
    Video,
    Location,
}

impl ContentType {
    #[inline]
    pub fn is_text(self) -> bool {
        self == Self::Text
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Location => "location",
        }
    }
}

/// Structured metadata for non-text message kinds
///
/// Which fields must be populated depends on the content type; see
/// [`MessageMetadata::missing_field`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl MessageMetadata {
    /// First metadata field required by `kind` that is not populated
    pub fn missing_field(&self, kind: ContentType) -> Option<&'static str> {
        match kind {
            ContentType::Text => None,
            ContentType::Image => {
                if self.url.is_none() {
                    Some("url")
                } else {
                    None
                }
            }
            ContentType::File => {
                if self.url.is_none() {
                    Some("url")
                } else if self.file_name.is_none() {
                    Some("file_name")
                } else {
                    None
                }
            }
            ContentType::Audio | ContentType::Video => {
                if self.url.is_none() {
                    Some("url")
                } else if self.duration_seconds.is_none() {
                    Some("duration_seconds")
                } else {
                    None
                }
            }
            ContentType::Location => {
                if self.latitude.is_none() {
                    Some("latitude")
                } else if self.longitude.is_none() {
                    Some("longitude")
                } else {
                    None
                }
            }
        }
    }
}

/// A single user's reaction to a message (the user id is the map key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub reacted_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(emoji: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            reacted_at: Utc::now(),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Snowflake>,
    /// At most one reaction per user; a repeat reaction replaces the entry
    #[serde(default)]
    pub reactions: BTreeMap<Snowflake, Reaction>,
    /// At most one receipt per user; the first read wins
    #[serde(default)]
    pub read_by: BTreeMap<Snowflake, DateTime<Utc>>,
    pub is_edited: bool,
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        content_type: ContentType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            content_type,
            metadata: None,
            reply_to: None,
            reactions: BTreeMap::new(),
            read_by: BTreeMap::new(),
            is_edited: false,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this message replies to another
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Replace the content and flag the message as edited
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.is_edited = true;
        self.updated_at = Utc::now();
    }

    /// Hide the message without removing its stored data
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Set or replace the user's reaction (last write wins)
    pub fn set_reaction(&mut self, user_id: Snowflake, emoji: impl Into<String>) {
        self.reactions.insert(user_id, Reaction::new(emoji));
    }

    /// Remove the user's reaction. Returns true when one was present.
    pub fn remove_reaction(&mut self, user_id: Snowflake) -> bool {
        self.reactions.remove(&user_id).is_some()
    }

    /// Record a read receipt; repeat reads keep the original timestamp.
    /// Returns true when a new receipt was recorded.
    pub fn mark_read(&mut self, user_id: Snowflake, at: DateTime<Utc>) -> bool {
        if self.read_by.contains_key(&user_id) {
            return false;
        }
        self.read_by.insert(user_id, at);
        true
    }

    /// Check whether the user has read this message
    #[inline]
    pub fn is_read_by(&self, user_id: Snowflake) -> bool {
        self.read_by.contains_key(&user_id)
    }

    /// Truncated content preview (for summaries and notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }

    /// Build the conversation summary entry for this message
    pub fn summarize(&self) -> LastMessageSummary {
        LastMessageSummary {
            message_id: self.id,
            preview: self.preview(100).to_string(),
            sender_id: self.sender_id,
            timestamp: self.created_at,
            content_type: self.content_type,
        }
    }
}
