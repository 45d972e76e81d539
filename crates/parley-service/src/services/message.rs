//! Message service
//!
//! Owns message lifecycle: creation, edits, soft deletes, reactions, and
//! read receipts. Cross-document sequences are ordered to fail safe: the
//! message document is the authoritative write, the conversation's
//! last-message summary is derived and refreshed best-effort.

use chrono::Utc;
use parley_core::events::{
    MessageCreatedEvent, MessageDeletedEvent, MessageUpdatedEvent, ReactionAddedEvent,
    ReactionRemovedEvent,
};
use parley_core::{ChatEvent, Conversation, Message, Reaction, Snowflake};
use tracing::{info, instrument, warn};

use crate::bus::EventEnvelope;
use crate::dto::{EditMessageRequest, MessageResponse, Page, ReactionRequest, SendMessageRequest};

use super::authz;
use super::context::ServiceContext;
use super::conversation::parse_id;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message to a conversation.
    ///
    /// The message insert is authoritative; the summary refresh afterwards is
    /// best-effort and a failure there is logged, not surfaced. This call is
    /// NOT idempotent - clients must not blindly retry it without a dedupe
    /// key of their own.
    #[instrument(skip(self, request))]
    pub async fn send_message(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let conversation = self.load_conversation(conversation_id).await?;
        authz::require_participant(&conversation, actor_id)?;

        let content_type = request.content_type.unwrap_or_default();
        let metadata = request.metadata;

        if !content_type.is_text() {
            let metadata = metadata.as_ref().ok_or_else(|| {
                ServiceError::validation(format!(
                    "metadata is required for {} messages",
                    content_type.as_str()
                ))
            })?;
            if let Some(field) = metadata.missing_field(content_type) {
                return Err(ServiceError::validation(format!(
                    "metadata field '{field}' is required for {} messages",
                    content_type.as_str()
                )));
            }
        }

        let reply_to = match request.reply_to.as_deref() {
            Some(raw) => {
                let reference_id = parse_id(raw)?;
                let referenced = self
                    .ctx
                    .message_repo()
                    .find_by_id(reference_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::validation("reply_to must reference an existing message")
                    })?;
                if referenced.conversation_id != conversation_id {
                    return Err(ServiceError::validation(
                        "reply_to must reference a message in the same conversation",
                    ));
                }
                Some(reference_id)
            }
            None => None,
        };

        let mut message = Message::new(
            self.ctx.generate_id(),
            conversation_id,
            actor_id,
            request.content,
            content_type,
        );
        message.metadata = metadata;
        message.reply_to = reply_to;

        // Authoritative write.
        self.ctx.message_repo().create(&message).await?;

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            content_type = content_type.as_str(),
            "Message sent"
        );

        // Derived write; a stale summary is recoverable, a lost message is not.
        let summary = message.summarize();
        if let Err(e) = self
            .ctx
            .conversation_repo()
            .set_last_message(conversation_id, Some(&summary))
            .await
        {
            warn!(
                conversation_id = %conversation_id,
                error = %e,
                "Failed to refresh last-message summary"
            );
        }

        self.ctx.events().publish(EventEnvelope {
            conversation_id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::MessageCreated(MessageCreatedEvent::new(
                message.id,
                conversation_id,
                actor_id,
                content_type,
                message.preview(100).to_string(),
            )),
        });

        Ok(MessageResponse::from(&message))
    }

    /// List messages of a conversation.
    ///
    /// Non-deleted messages are paged newest-first internally and the
    /// returned page is re-ordered oldest-first for display. As a side
    /// effect every returned message the actor has not read yet gets a
    /// first-write-wins read receipt; receipt failures are logged and never
    /// fail the request.
    #[instrument(skip(self))]
    pub async fn get_messages(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
        page: i64,
        limit: i64,
    ) -> ServiceResult<Page<MessageResponse>> {
        let conversation = self.load_conversation(conversation_id).await?;
        authz::require_participant(&conversation, actor_id)?;

        let page = page.max(1);
        let offset = (page - 1) * limit;

        let mut messages = self
            .ctx
            .message_repo()
            .list_page(conversation_id, offset, limit)
            .await?;
        let total = self.ctx.message_repo().count(conversation_id).await?;

        let now = Utc::now();
        for message in &mut messages {
            if message.is_read_by(actor_id) {
                continue;
            }
            match self.ctx.message_repo().mark_read(message.id, actor_id, now).await {
                Ok(true) => {
                    message.mark_read(actor_id, now);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        message_id = %message.id,
                        error = %e,
                        "Failed to record read receipt"
                    );
                }
            }
        }

        // Keep the participant's read cursor in step, also best-effort.
        if let Err(e) = self
            .ctx
            .conversation_repo()
            .update_last_read(conversation_id, actor_id, now)
            .await
        {
            warn!(
                conversation_id = %conversation_id,
                error = %e,
                "Failed to advance read cursor"
            );
        }

        // Oldest-first for display.
        messages.reverse();
        let items = messages.iter().map(MessageResponse::from).collect();

        Ok(Page::new(items, page, limit, total))
    }

    /// Edit a message; sender only. Content type and metadata are unchanged.
    #[instrument(skip(self, request))]
    pub async fn edit_message(
        &self,
        actor_id: Snowflake,
        message_id: Snowflake,
        request: EditMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.load_message(message_id).await?;
        authz::require_author(&message, actor_id)?;

        if message.is_deleted {
            return Err(ServiceError::not_found("Message", message_id.to_string()));
        }

        self.ctx
            .message_repo()
            .update_content(message_id, &request.content)
            .await?;
        message.edit(request.content);

        info!(message_id = %message_id, "Message edited");

        self.ctx.events().publish(EventEnvelope {
            conversation_id: message.conversation_id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::MessageUpdated(MessageUpdatedEvent {
                message_id,
                conversation_id: message.conversation_id,
                content: message.content.clone(),
                timestamp: Utc::now(),
            }),
        });

        Ok(MessageResponse::from(&message))
    }

    /// Soft-delete a message; sender only. Idempotent.
    ///
    /// When the deleted message was the conversation's newest, the summary
    /// is recomputed from the newest surviving message, best-effort.
    #[instrument(skip(self))]
    pub async fn delete_message(
        &self,
        actor_id: Snowflake,
        message_id: Snowflake,
    ) -> ServiceResult<()> {
        let message = self.load_message(message_id).await?;
        authz::require_author(&message, actor_id)?;

        if message.is_deleted {
            return Ok(());
        }

        self.ctx.message_repo().soft_delete(message_id, Utc::now()).await?;

        info!(message_id = %message_id, "Message deleted");

        self.refresh_summary_after_delete(&message).await;

        self.ctx.events().publish(EventEnvelope {
            conversation_id: message.conversation_id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::MessageDeleted(MessageDeletedEvent {
                message_id,
                conversation_id: message.conversation_id,
                timestamp: Utc::now(),
            }),
        });

        Ok(())
    }

    /// Add or replace the actor's reaction; any participant may react.
    /// One reaction per user per message, last write wins.
    #[instrument(skip(self, request))]
    pub async fn add_reaction(
        &self,
        actor_id: Snowflake,
        message_id: Snowflake,
        request: ReactionRequest,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.load_message(message_id).await?;

        let conversation = self.load_conversation(message.conversation_id).await?;
        authz::require_participant(&conversation, actor_id)?;

        let reaction = Reaction::new(request.emoji.clone());
        self.ctx
            .message_repo()
            .upsert_reaction(message_id, actor_id, &reaction)
            .await?;
        message.reactions.insert(actor_id, reaction);

        self.ctx.events().publish(EventEnvelope {
            conversation_id: message.conversation_id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::ReactionAdded(ReactionAddedEvent {
                message_id,
                conversation_id: message.conversation_id,
                user_id: actor_id,
                emoji: request.emoji,
                timestamp: Utc::now(),
            }),
        });

        Ok(MessageResponse::from(&message))
    }

    /// Remove the actor's own reaction; no-op when absent
    #[instrument(skip(self))]
    pub async fn remove_reaction(
        &self,
        actor_id: Snowflake,
        message_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.load_message(message_id).await?;

        let removed = self
            .ctx
            .message_repo()
            .remove_reaction(message_id, actor_id)
            .await?;

        if removed {
            message.remove_reaction(actor_id);

            self.ctx.events().publish(EventEnvelope {
                conversation_id: message.conversation_id,
                exclude_user: Some(actor_id),
                recipients: None,
                event: ChatEvent::ReactionRemoved(ReactionRemovedEvent {
                    message_id,
                    conversation_id: message.conversation_id,
                    user_id: actor_id,
                    timestamp: Utc::now(),
                }),
            });
        }

        Ok(MessageResponse::from(&message))
    }

    /// Recompute the conversation summary when its summarized message is
    /// deleted. Every step is best-effort: staleness here is a display
    /// concern, never data loss.
    async fn refresh_summary_after_delete(&self, deleted: &Message) {
        let conversation = match self
            .ctx
            .conversation_repo()
            .find_by_id(deleted.conversation_id)
            .await
        {
            Ok(Some(conversation)) => conversation,
            Ok(None) => return,
            Err(e) => {
                warn!(
                    conversation_id = %deleted.conversation_id,
                    error = %e,
                    "Failed to load conversation for summary refresh"
                );
                return;
            }
        };

        let summarized = conversation
            .last_message
            .as_ref()
            .is_some_and(|summary| summary.message_id == deleted.id);
        if !summarized {
            return;
        }

        let replacement = match self.ctx.message_repo().latest_visible(deleted.conversation_id).await {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    conversation_id = %deleted.conversation_id,
                    error = %e,
                    "Failed to find replacement summary message"
                );
                return;
            }
        };

        let summary = replacement.as_ref().map(Message::summarize);
        if let Err(e) = self
            .ctx
            .conversation_repo()
            .set_last_message(deleted.conversation_id, summary.as_ref())
            .await
        {
            warn!(
                conversation_id = %deleted.conversation_id,
                error = %e,
                "Failed to refresh last-message summary after delete"
            );
        }
    }

    /// Load a conversation or fail with a not-found error
    async fn load_conversation(&self, conversation_id: Snowflake) -> ServiceResult<Conversation> {
        self.ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))
    }

    /// Load a message or fail with a not-found error
    async fn load_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id.to_string()))
    }
}
