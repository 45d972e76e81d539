//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs from the document store, and the
//! infrastructure layer provides the implementation. The store contract is:
//! find-by-id, filtered/paginated query with count, per-document atomic field
//! updates, and delete-one/delete-many. The sub-entity operations
//! (participants, reactions, read receipts, last-message summary) are each a
//! single atomic update on one document; there are no cross-document
//! transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Conversation, LastMessageSummary, Message, Participant, PresenceStatus, Reaction, User,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Create a user record (identity mirror; used by seeding and tests)
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Update the user's presence status
    async fn set_presence(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Find the direct conversation between two users (either order)
    async fn find_direct(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Conversation>>;

    /// List conversations containing the user, ordered by last-message
    /// timestamp descending; conversations without messages sort last
    async fn list_for_user(
        &self,
        user_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Conversation>>;

    /// Count conversations containing the user
    async fn count_for_user(&self, user_id: Snowflake) -> RepoResult<i64>;

    /// Create a new conversation.
    ///
    /// Direct conversations carry a unique normalized pair key; a concurrent
    /// duplicate create fails with `DomainError::Conflict`.
    async fn create(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Persist profile fields (name, description, picture, settings)
    async fn update_profile(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Atomically add a participant; no-op when already present.
    /// Returns true when the document changed.
    async fn add_participant(
        &self,
        conversation_id: Snowflake,
        participant: &Participant,
    ) -> RepoResult<bool>;

    /// Atomically remove a participant. Returns true when the document changed.
    async fn remove_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool>;

    /// Atomically advance a participant's read cursor
    async fn update_last_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Atomically replace the last-message summary (None clears it)
    async fn set_last_message(
        &self,
        conversation_id: Snowflake,
        summary: Option<&LastMessageSummary>,
    ) -> RepoResult<()>;

    /// Hard-delete the conversation document
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID (soft-deleted messages are returned, flagged)
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Create a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// List non-deleted messages of a conversation, newest first
    async fn list_page(
        &self,
        conversation_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Message>>;

    /// Count non-deleted messages of a conversation
    async fn count(&self, conversation_id: Snowflake) -> RepoResult<i64>;

    /// Newest non-deleted message of a conversation (for summary recompute)
    async fn latest_visible(&self, conversation_id: Snowflake) -> RepoResult<Option<Message>>;

    /// Replace the content and set the edited flag
    async fn update_content(&self, id: Snowflake, content: &str) -> RepoResult<()>;

    /// Soft-delete the message (content retained, hidden from listings)
    async fn soft_delete(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Atomically set or replace a user's reaction (last write wins)
    async fn upsert_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction: &Reaction,
    ) -> RepoResult<()>;

    /// Atomically remove a user's reaction. Returns true when one was present.
    async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool>;

    /// Atomically record a read receipt; the first write wins.
    /// Returns true when a new receipt was recorded.
    async fn mark_read(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Hard-delete every message of a conversation (cascade path).
    /// Returns the number of deleted documents.
    async fn delete_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<u64>;
}
