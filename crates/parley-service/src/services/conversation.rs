//! Conversation service
//!
//! Owns conversation lifecycle, participant membership, and the last-message
//! summary. Authorization is checked against the loaded entity through the
//! pure predicates in [`super::authz`].

use chrono::Utc;
use parley_core::events::{
    ConversationCreatedEvent, ConversationDeletedEvent, ConversationUpdatedEvent,
    ParticipantAddedEvent, ParticipantRemovedEvent, TypingStartedEvent,
};
use parley_core::{
    ChatEvent, Conversation, ConversationKind, ConversationSettings, Participant,
    ParticipantRole, Snowflake,
};
use tracing::{info, instrument};

use crate::bus::EventEnvelope;
use crate::dto::{
    AddParticipantRequest, ConversationResponse, CreateConversationRequest, Page,
    UpdateConversationRequest,
};

use super::authz;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of a create call: the conversation plus whether it is new
#[derive(Debug)]
pub struct ConversationCreation {
    pub conversation: ConversationResponse,
    pub created: bool,
}

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a conversation.
    ///
    /// Direct creation is idempotent per user pair: when a direct
    /// conversation with the other participant already exists it is returned
    /// unchanged, in either participant order.
    #[instrument(skip(self, request))]
    pub async fn create_conversation(
        &self,
        actor_id: Snowflake,
        request: CreateConversationRequest,
    ) -> ServiceResult<ConversationCreation> {
        let mut participant_ids = Vec::new();
        for raw in &request.participant_ids {
            let id = parse_id(raw)?;
            if id != actor_id && !participant_ids.contains(&id) {
                participant_ids.push(id);
            }
        }

        let conversation = match request.kind {
            ConversationKind::Direct => {
                let [other_id] = participant_ids.as_slice() else {
                    return Err(ServiceError::validation(
                        "direct conversation requires exactly one other participant",
                    ));
                };
                let other_id = *other_id;

                if let Some(existing) =
                    self.ctx.conversation_repo().find_direct(actor_id, other_id).await?
                {
                    return Ok(ConversationCreation {
                        conversation: ConversationResponse::from(&existing),
                        created: false,
                    });
                }

                let conversation =
                    Conversation::new_direct(self.ctx.generate_id(), actor_id, other_id);

                match self.ctx.conversation_repo().create(&conversation).await {
                    Ok(()) => conversation,
                    Err(e) if e.is_conflict() => {
                        // Lost the create race; the winner is the conversation.
                        let existing = self
                            .ctx
                            .conversation_repo()
                            .find_direct(actor_id, other_id)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::internal("direct conversation vanished after conflict")
                            })?;
                        return Ok(ConversationCreation {
                            conversation: ConversationResponse::from(&existing),
                            created: false,
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            ConversationKind::Group => {
                let name = request
                    .name
                    .clone()
                    .ok_or_else(|| ServiceError::validation("group conversation requires a name"))?;

                let mut conversation = Conversation::new_group(
                    self.ctx.generate_id(),
                    name,
                    actor_id,
                    participant_ids,
                );
                conversation.description = request.description.clone();

                self.ctx.conversation_repo().create(&conversation).await?;
                conversation
            }
        };

        info!(
            conversation_id = %conversation.id,
            kind = ?conversation.kind,
            participants = conversation.participants.len(),
            "Conversation created"
        );

        self.ctx.events().publish(EventEnvelope {
            conversation_id: conversation.id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::ConversationCreated(ConversationCreatedEvent {
                conversation_id: conversation.id,
                kind: conversation.kind,
                created_by: actor_id,
                timestamp: Utc::now(),
            }),
        });

        Ok(ConversationCreation {
            conversation: ConversationResponse::from(&conversation),
            created: true,
        })
    }

    /// List the actor's conversations, most recently active first
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        actor_id: Snowflake,
        page: i64,
        limit: i64,
    ) -> ServiceResult<Page<ConversationResponse>> {
        let page = page.max(1);
        let offset = (page - 1) * limit;

        let conversations = self
            .ctx
            .conversation_repo()
            .list_for_user(actor_id, offset, limit)
            .await?;
        let total = self.ctx.conversation_repo().count_for_user(actor_id).await?;

        let items = conversations.iter().map(ConversationResponse::from).collect();
        Ok(Page::new(items, page, limit, total))
    }

    /// Get a conversation the actor participates in
    #[instrument(skip(self))]
    pub async fn get_conversation(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        let conversation = self.load(conversation_id).await?;
        authz::require_participant(&conversation, actor_id)?;
        Ok(ConversationResponse::from(&conversation))
    }

    /// Update profile fields (name, description, picture, settings); admin only
    #[instrument(skip(self, patch))]
    pub async fn update_conversation(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
        patch: UpdateConversationRequest,
    ) -> ServiceResult<ConversationResponse> {
        let mut conversation = self.load(conversation_id).await?;
        authz::require_admin(&conversation, actor_id)?;

        if let Some(name) = patch.name {
            conversation.name = Some(name);
        }
        if let Some(description) = patch.description {
            conversation.description = Some(description);
        }
        if let Some(picture) = patch.picture {
            conversation.picture = Some(picture);
        }
        if let Some(mut settings) = patch.settings {
            // Turning a conversation public mints a join link when none exists.
            if settings.is_public && settings.join_link.is_none() {
                settings.join_link = Some(ConversationSettings::generate_join_link());
            }
            conversation.settings = settings;
        }
        conversation.updated_at = Utc::now();

        self.ctx.conversation_repo().update_profile(&conversation).await?;

        info!(conversation_id = %conversation_id, "Conversation updated");

        self.ctx.events().publish(EventEnvelope {
            conversation_id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::ConversationUpdated(ConversationUpdatedEvent {
                conversation_id,
                timestamp: Utc::now(),
            }),
        });

        Ok(ConversationResponse::from(&conversation))
    }

    /// Delete a conversation and all of its messages; admin only.
    ///
    /// The cascade is ordered to fail safe: messages go first, the
    /// conversation document last. A crash in between leaves an empty but
    /// consistent conversation rather than orphaned messages.
    #[instrument(skip(self))]
    pub async fn delete_conversation(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<()> {
        let conversation = self.load(conversation_id).await?;
        authz::require_admin(&conversation, actor_id)?;

        let recipients: Vec<Snowflake> =
            conversation.participants.iter().map(|p| p.user_id).collect();

        let deleted = self
            .ctx
            .message_repo()
            .delete_by_conversation(conversation_id)
            .await?;
        self.ctx.conversation_repo().delete(conversation_id).await?;

        info!(
            conversation_id = %conversation_id,
            messages_deleted = deleted,
            "Conversation deleted"
        );

        self.ctx.events().publish(EventEnvelope {
            conversation_id,
            exclude_user: Some(actor_id),
            recipients: Some(recipients),
            event: ChatEvent::ConversationDeleted(ConversationDeletedEvent {
                conversation_id,
                timestamp: Utc::now(),
            }),
        });

        Ok(())
    }

    /// Add a participant; admin only, no-op when already present
    #[instrument(skip(self, request))]
    pub async fn add_participant(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
        request: AddParticipantRequest,
    ) -> ServiceResult<ConversationResponse> {
        let mut conversation = self.load(conversation_id).await?;
        authz::require_admin(&conversation, actor_id)?;

        // A direct conversation is exactly its two participants.
        if conversation.kind == ConversationKind::Direct {
            return Err(ServiceError::validation(
                "cannot change participants of a direct conversation",
            ));
        }

        let new_user_id = parse_id(&request.user_id)?;
        let role = request.role.unwrap_or(ParticipantRole::Member);
        let participant = Participant::new(new_user_id, role);

        let changed = self
            .ctx
            .conversation_repo()
            .add_participant(conversation_id, &participant)
            .await?;

        if changed {
            conversation.participants.push(participant);

            info!(
                conversation_id = %conversation_id,
                user_id = %new_user_id,
                "Participant added"
            );

            self.ctx.events().publish(EventEnvelope {
                conversation_id,
                exclude_user: Some(actor_id),
                recipients: None,
                event: ChatEvent::ParticipantAdded(ParticipantAddedEvent {
                    conversation_id,
                    user_id: new_user_id,
                    role,
                    timestamp: Utc::now(),
                }),
            });
        }

        Ok(ConversationResponse::from(&conversation))
    }

    /// Remove a participant; admin only.
    ///
    /// Refuses to remove the only admin: a conversation with participants
    /// must always keep at least one.
    #[instrument(skip(self))]
    pub async fn remove_participant(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
        target_user_id: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        let mut conversation = self.load(conversation_id).await?;
        authz::require_admin(&conversation, actor_id)?;

        if conversation.kind == ConversationKind::Direct {
            return Err(ServiceError::validation(
                "cannot change participants of a direct conversation",
            ));
        }

        if conversation.is_admin(target_user_id) && conversation.admin_count() == 1 {
            return Err(ServiceError::validation(
                "cannot remove the only admin of a conversation",
            ));
        }

        // Everyone who was in the conversation, including the removed user,
        // hears about the removal.
        let recipients: Vec<Snowflake> =
            conversation.participants.iter().map(|p| p.user_id).collect();

        let changed = self
            .ctx
            .conversation_repo()
            .remove_participant(conversation_id, target_user_id)
            .await?;

        if changed {
            conversation.remove_participant(target_user_id);

            info!(
                conversation_id = %conversation_id,
                user_id = %target_user_id,
                "Participant removed"
            );

            self.ctx.events().publish(EventEnvelope {
                conversation_id,
                exclude_user: Some(actor_id),
                recipients: Some(recipients),
                event: ChatEvent::ParticipantRemoved(ParticipantRemovedEvent {
                    conversation_id,
                    user_id: target_user_id,
                    timestamp: Utc::now(),
                }),
            });
        }

        Ok(ConversationResponse::from(&conversation))
    }

    /// Fan a typing notification out to the other participants
    #[instrument(skip(self))]
    pub async fn notify_typing(
        &self,
        actor_id: Snowflake,
        conversation_id: Snowflake,
    ) -> ServiceResult<()> {
        let conversation = self.load(conversation_id).await?;
        authz::require_participant(&conversation, actor_id)?;

        self.ctx.events().publish(EventEnvelope {
            conversation_id,
            exclude_user: Some(actor_id),
            recipients: None,
            event: ChatEvent::TypingStarted(TypingStartedEvent::new(conversation_id, actor_id)),
        });

        Ok(())
    }

    /// Load a conversation or fail with a not-found error
    async fn load(&self, conversation_id: Snowflake) -> ServiceResult<Conversation> {
        self.ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))
    }
}

/// Parse a snowflake id from its request string form
pub(crate) fn parse_id(raw: &str) -> ServiceResult<Snowflake> {
    raw.parse::<Snowflake>()
        .map_err(|_| ServiceError::validation(format!("invalid id: {raw}")))
}
