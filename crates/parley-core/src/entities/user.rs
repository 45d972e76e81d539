//! User entity - external identity referenced by the messaging core
//!
//! Identity issuance and credentials live in the auth service; this core only
//! reads display data and updates presence through the delivery registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Presence status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Away,
    #[default]
    Offline,
}

impl PresenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
        }
    }
}

/// User entity (identity mirror)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub presence: PresenceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with default presence
    pub fn new(id: Snowflake, username: String, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            display_name,
            avatar: None,
            presence: PresenceStatus::Offline,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_online(&self) -> bool {
        self.presence == PresenceStatus::Online
    }
}
