//! Message database model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use parley_core::{MessageMetadata, Reaction, Snowflake};

/// Database model for the messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub content_type: String,
    pub metadata: Option<Json<MessageMetadata>>,
    pub reply_to: Option<i64>,
    pub reactions: Json<BTreeMap<Snowflake, Reaction>>,
    pub read_by: Json<BTreeMap<Snowflake, DateTime<Utc>>>,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
