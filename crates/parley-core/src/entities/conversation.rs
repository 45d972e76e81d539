//! Conversation entity - a direct or group message thread
//!
//! A conversation exclusively owns its participant entries and the
//! denormalized summary of its newest visible message. The summary exists
//! for list rendering only and is never authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::message::ContentType;
use crate::value_objects::Snowflake;

/// Conversation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
}

/// Role of a participant within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Admin,
    #[default]
    Member,
}

/// A user bound to a conversation with a role and a read cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Snowflake,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

impl Participant {
    /// Create a participant joining now
    pub fn new(user_id: Snowflake, role: ParticipantRole) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            joined_at: now,
            last_read_at: now,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == ParticipantRole::Admin
    }
}

/// Denormalized snapshot of the newest non-deleted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessageSummary {
    pub message_id: Snowflake,
    pub preview: String,
    pub sender_id: Snowflake,
    pub timestamp: DateTime<Utc>,
    pub content_type: ContentType,
}

/// Per-conversation settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_mode_seconds: Option<u32>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_link: Option<String>,
}

impl ConversationSettings {
    /// Generate a random join link token
    pub fn generate_join_link() -> String {
        use rand::distributions::Alphanumeric;
        use rand::Rng;

        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect()
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Snowflake,
    pub kind: ConversationKind,
    /// Required for group conversations, absent for direct ones
    pub name: Option<String>,
    pub description: Option<String>,
    pub picture: Option<String>,
    /// Ordered set of participants; user_id unique within the set
    pub participants: Vec<Participant>,
    pub last_message: Option<LastMessageSummary>,
    pub is_encrypted: bool,
    pub settings: ConversationSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a direct conversation between two users; the creator is admin
    pub fn new_direct(id: Snowflake, creator_id: Snowflake, other_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: ConversationKind::Direct,
            name: None,
            description: None,
            picture: None,
            participants: vec![
                Participant::new(creator_id, ParticipantRole::Admin),
                Participant::new(other_id, ParticipantRole::Member),
            ],
            last_message: None,
            is_encrypted: false,
            settings: ConversationSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a group conversation; the creator is the sole initial admin
    pub fn new_group(
        id: Snowflake,
        name: String,
        creator_id: Snowflake,
        member_ids: impl IntoIterator<Item = Snowflake>,
    ) -> Self {
        let now = Utc::now();
        let mut participants = vec![Participant::new(creator_id, ParticipantRole::Admin)];
        for member_id in member_ids {
            if member_id != creator_id
                && !participants.iter().any(|p| p.user_id == member_id)
            {
                participants.push(Participant::new(member_id, ParticipantRole::Member));
            }
        }

        Self {
            id,
            kind: ConversationKind::Group,
            name: Some(name),
            description: None,
            picture: None,
            participants,
            last_message: None,
            is_encrypted: false,
            settings: ConversationSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalized key for an unordered user pair (used for direct uniqueness)
    pub fn direct_key_for(a: Snowflake, b: Snowflake) -> String {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        format!("{lo}:{hi}")
    }

    /// Normalized direct key of this conversation, if it is direct
    pub fn direct_key(&self) -> Option<String> {
        if self.kind != ConversationKind::Direct {
            return None;
        }
        match self.participants.as_slice() {
            [a, b] => Some(Self::direct_key_for(a.user_id, b.user_id)),
            _ => None,
        }
    }

    /// Look up a participant entry by user id
    pub fn participant(&self, user_id: Snowflake) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    /// Check whether a user belongs to this conversation
    #[inline]
    pub fn is_participant(&self, user_id: Snowflake) -> bool {
        self.participant(user_id).is_some()
    }

    /// Check whether a user is an admin of this conversation
    #[inline]
    pub fn is_admin(&self, user_id: Snowflake) -> bool {
        self.participant(user_id).is_some_and(Participant::is_admin)
    }

    /// Number of admins currently in the conversation
    pub fn admin_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_admin()).count()
    }

    /// Add a participant; no-op when the user is already present.
    /// Returns true when the set changed.
    pub fn add_participant(&mut self, user_id: Snowflake, role: ParticipantRole) -> bool {
        if self.is_participant(user_id) {
            return false;
        }
        self.participants.push(Participant::new(user_id, role));
        self.updated_at = Utc::now();
        true
    }

    /// Remove a participant. Returns true when the set changed.
    pub fn remove_participant(&mut self, user_id: Snowflake) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.user_id != user_id);
        let changed = self.participants.len() != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Advance a participant's read cursor
    pub fn update_last_read(&mut self, user_id: Snowflake, at: DateTime<Utc>) {
        if let Some(participant) = self.participants.iter_mut().find(|p| p.user_id == user_id) {
            if at > participant.last_read_at {
                participant.last_read_at = at;
            }
        }
    }
}
