//! In-memory implementation of the repository ports
//!
//! Mirrors the persistence contract the services are written against:
//! per-document updates are atomic (one mutex-guarded map mutation), the
//! direct-pair key is unique, reactions are last-write-wins, receipts are
//! first-write-wins, and listings hide soft-deleted messages.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use parley_core::{
    Conversation, ConversationRepository, DomainError, LastMessageSummary, Message,
    MessageRepository, Participant, PresenceStatus, Reaction, RepoResult, Snowflake, User,
    UserRepository,
};

/// Shared in-memory store implementing all repository ports
#[derive(Default)]
pub struct InMemoryStore {
    conversations: Mutex<HashMap<Snowflake, Conversation>>,
    direct_keys: Mutex<HashMap<String, Snowflake>>,
    messages: Mutex<HashMap<Snowflake, Message>>,
    users: Mutex<HashMap<Snowflake, User>>,
}

impl InMemoryStore {
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Direct read access for assertions
    pub fn message(&self, id: Snowflake) -> Option<Message> {
        self.messages.lock().get(&id).cloned()
    }

    /// Direct read access for assertions
    pub fn conversation(&self, id: Snowflake) -> Option<Conversation> {
        self.conversations.lock().get(&id).cloned()
    }

    /// Direct read access for assertions
    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.users.lock().get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        self.users.lock().insert(user.id, user.clone());
        Ok(())
    }

    async fn set_presence(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()> {
        if let Some(user) = self.users.lock().get_mut(&id) {
            user.presence = status;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.conversations.lock().get(&id).cloned())
    }

    async fn find_direct(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Conversation>> {
        let key = Conversation::direct_key_for(a, b);
        let id = match self.direct_keys.lock().get(&key) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.conversations.lock().get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Conversation>> {
        let mut matching: Vec<Conversation> = self
            .conversations
            .lock()
            .values()
            .filter(|c| c.is_participant(user_id))
            .cloned()
            .collect();

        // Last-message timestamp descending, empty conversations last.
        matching.sort_by(|a, b| {
            let a_ts = a.last_message.as_ref().map(|m| m.timestamp);
            let b_ts = b.last_message.as_ref().map(|m| m.timestamp);
            b_ts.cmp(&a_ts).then(b.id.cmp(&a.id))
        });

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_for_user(&self, user_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .conversations
            .lock()
            .values()
            .filter(|c| c.is_participant(user_id))
            .count() as i64)
    }

    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        if let Some(key) = conversation.direct_key() {
            let mut direct_keys = self.direct_keys.lock();
            if direct_keys.contains_key(&key) {
                return Err(DomainError::Conflict(
                    "direct conversation already exists".to_string(),
                ));
            }
            direct_keys.insert(key, conversation.id);
        }
        self.conversations
            .lock()
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn update_profile(&self, conversation: &Conversation) -> RepoResult<()> {
        let mut conversations = self.conversations.lock();
        let stored = conversations
            .get_mut(&conversation.id)
            .ok_or(DomainError::ConversationNotFound(conversation.id))?;
        stored.name = conversation.name.clone();
        stored.description = conversation.description.clone();
        stored.picture = conversation.picture.clone();
        stored.settings = conversation.settings.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn add_participant(
        &self,
        conversation_id: Snowflake,
        participant: &Participant,
    ) -> RepoResult<bool> {
        let mut conversations = self.conversations.lock();
        let Some(conversation) = conversations.get_mut(&conversation_id) else {
            return Ok(false);
        };
        Ok(conversation.add_participant(participant.user_id, participant.role))
    }

    async fn remove_participant(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        let mut conversations = self.conversations.lock();
        let Some(conversation) = conversations.get_mut(&conversation_id) else {
            return Ok(false);
        };
        Ok(conversation.remove_participant(user_id))
    }

    async fn update_last_read(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        if let Some(conversation) = self.conversations.lock().get_mut(&conversation_id) {
            conversation.update_last_read(user_id, at);
        }
        Ok(())
    }

    async fn set_last_message(
        &self,
        conversation_id: Snowflake,
        summary: Option<&LastMessageSummary>,
    ) -> RepoResult<()> {
        if let Some(conversation) = self.conversations.lock().get_mut(&conversation_id) {
            conversation.last_message = summary.cloned();
            conversation.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        if let Some(conversation) = self.conversations.lock().remove(&id) {
            if let Some(key) = conversation.direct_key() {
                self.direct_keys.lock().remove(&key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.messages.lock().get(&id).cloned())
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.messages.lock().insert(message.id, message.clone());
        Ok(())
    }

    async fn list_page(
        &self,
        conversation_id: Snowflake,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Message>> {
        let mut visible: Vec<Message> = self
            .messages
            .lock()
            .values()
            .filter(|m| m.conversation_id == conversation_id && !m.is_deleted)
            .cloned()
            .collect();

        // Newest first.
        visible.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(visible
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, conversation_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .messages
            .lock()
            .values()
            .filter(|m| m.conversation_id == conversation_id && !m.is_deleted)
            .count() as i64)
    }

    async fn latest_visible(&self, conversation_id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self
            .messages
            .lock()
            .values()
            .filter(|m| m.conversation_id == conversation_id && !m.is_deleted)
            .max_by_key(|m| m.id)
            .cloned())
    }

    async fn update_content(&self, id: Snowflake, content: &str) -> RepoResult<()> {
        let mut messages = self.messages.lock();
        let message = messages
            .get_mut(&id)
            .filter(|m| !m.is_deleted)
            .ok_or(DomainError::MessageNotFound(id))?;
        message.edit(content.to_string());
        Ok(())
    }

    async fn soft_delete(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        if let Some(message) = self.messages.lock().get_mut(&id) {
            if !message.is_deleted {
                message.is_deleted = true;
                message.deleted_at = Some(at);
                message.updated_at = at;
            }
        }
        Ok(())
    }

    async fn upsert_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction: &Reaction,
    ) -> RepoResult<()> {
        let mut messages = self.messages.lock();
        let message = messages
            .get_mut(&message_id)
            .ok_or(DomainError::MessageNotFound(message_id))?;
        message.reactions.insert(user_id, reaction.clone());
        Ok(())
    }

    async fn remove_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        let mut messages = self.messages.lock();
        let Some(message) = messages.get_mut(&message_id) else {
            return Ok(false);
        };
        Ok(message.remove_reaction(user_id))
    }

    async fn mark_read(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut messages = self.messages.lock();
        let Some(message) = messages.get_mut(&message_id) else {
            return Ok(false);
        };
        Ok(message.mark_read(user_id, at))
    }

    async fn delete_by_conversation(&self, conversation_id: Snowflake) -> RepoResult<u64> {
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|_, m| m.conversation_id != conversation_id);
        Ok((before - messages.len()) as u64)
    }
}
