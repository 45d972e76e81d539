//! User row ↔ entity mapping

use parley_core::{PresenceStatus, Snowflake, User};

use crate::models::UserRow;

/// Parse the stored presence discriminator
pub fn parse_presence(value: &str) -> PresenceStatus {
    match value {
        "online" => PresenceStatus::Online,
        "away" => PresenceStatus::Away,
        _ => PresenceStatus::Offline,
    }
}

/// Stored discriminator for a presence status
pub fn presence_to_str(value: PresenceStatus) -> &'static str {
    value.as_str()
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            username: row.username,
            display_name: row.display_name,
            avatar: row.avatar,
            presence: parse_presence(&row.presence),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
