//! Manager-level tests against the in-memory store
//!
//! Cover the consistency properties of the conversation and message
//! managers: idempotent direct creation, the last-admin invariant, soft
//! deletes, reaction convergence, read receipts, and summary maintenance.

use integration_tests::test_context;
use parley_core::{ContentType, ConversationKind, MessageMetadata, ParticipantRole, Snowflake};
use parley_service::{
    AddParticipantRequest, ConversationService, CreateConversationRequest, EditMessageRequest,
    MessageService, ReactionRequest, SendMessageRequest, ServiceError,
};

fn direct_request(other: Snowflake) -> CreateConversationRequest {
    CreateConversationRequest {
        kind: ConversationKind::Direct,
        participant_ids: vec![other.to_string()],
        name: None,
        description: None,
    }
}

fn group_request(name: &str, members: &[Snowflake]) -> CreateConversationRequest {
    CreateConversationRequest {
        kind: ConversationKind::Group,
        participant_ids: members.iter().map(ToString::to_string).collect(),
        name: Some(name.to_string()),
        description: None,
    }
}

fn text_message(content: &str) -> SendMessageRequest {
    SendMessageRequest {
        content: content.to_string(),
        content_type: None,
        metadata: None,
        reply_to: None,
    }
}

#[tokio::test]
async fn direct_creation_is_idempotent_in_either_order() {
    let (ctx, _store) = test_context();
    let service = ConversationService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let first = service
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap();
    assert!(first.created);

    // Same pair again, from the other side.
    let second = service
        .create_conversation(bob, direct_request(alice))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(first.conversation.id, second.conversation.id);

    let third = service
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap();
    assert_eq!(first.conversation.id, third.conversation.id);
}

#[tokio::test]
async fn direct_creation_validates_participant_count() {
    let (ctx, _store) = test_context();
    let service = ConversationService::new(&ctx);
    let alice = Snowflake::new(1);

    let request = CreateConversationRequest {
        kind: ConversationKind::Direct,
        participant_ids: vec!["2".to_string(), "3".to_string()],
        name: None,
        description: None,
    };
    assert!(matches!(
        service.create_conversation(alice, request).await,
        Err(ServiceError::Validation(_))
    ));

    // A direct conversation with yourself collapses to zero others.
    assert!(matches!(
        service.create_conversation(alice, direct_request(alice)).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn group_creation_requires_name() {
    let (ctx, _store) = test_context();
    let service = ConversationService::new(&ctx);

    let request = CreateConversationRequest {
        kind: ConversationKind::Group,
        participant_ids: vec!["2".to_string()],
        name: None,
        description: None,
    };
    assert!(matches!(
        service.create_conversation(Snowflake::new(1), request).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn removing_the_only_admin_fails_and_changes_nothing() {
    let (ctx, store) = test_context();
    let service = ConversationService::new(&ctx);
    let (admin, member) = (Snowflake::new(1), Snowflake::new(2));

    let creation = service
        .create_conversation(admin, group_request("Team", &[member]))
        .await
        .unwrap();
    let conversation_id: Snowflake = creation.conversation.id;

    let err = service
        .remove_participant(admin, conversation_id, admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let stored = store.conversation(conversation_id).unwrap();
    assert_eq!(stored.admin_count(), 1);
    assert_eq!(stored.participants.len(), 2);

    // Removing the member is fine.
    service
        .remove_participant(admin, conversation_id, member)
        .await
        .unwrap();
    assert_eq!(store.conversation(conversation_id).unwrap().participants.len(), 1);
}

#[tokio::test]
async fn participant_add_is_idempotent_and_admin_gated() {
    let (ctx, store) = test_context();
    let service = ConversationService::new(&ctx);
    let (admin, member, newcomer) = (Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));

    let conversation_id = service
        .create_conversation(admin, group_request("Team", &[member]))
        .await
        .unwrap()
        .conversation
        .id;

    let request = AddParticipantRequest {
        user_id: newcomer.to_string(),
        role: Some(ParticipantRole::Member),
    };
    service
        .add_participant(admin, conversation_id, request.clone())
        .await
        .unwrap();
    service
        .add_participant(admin, conversation_id, request.clone())
        .await
        .unwrap();
    assert_eq!(store.conversation(conversation_id).unwrap().participants.len(), 3);

    // Members cannot add.
    let err = service
        .add_participant(member, conversation_id, request.clone())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    // Direct conversations never change shape.
    let direct_id = service
        .create_conversation(admin, direct_request(member))
        .await
        .unwrap()
        .conversation
        .id;
    let err = service
        .add_participant(admin, direct_id, request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn send_then_list_round_trip_updates_summary() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;

    messages
        .send_message(alice, conversation_id, text_message("first"))
        .await
        .unwrap();
    let sent = messages
        .send_message(alice, conversation_id, text_message("second"))
        .await
        .unwrap();

    // Newest message is the chronologically last entry of the page.
    let page = messages.get_messages(bob, conversation_id, 1, 50).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items.last().unwrap().content, "second");
    assert_eq!(page.pagination.total, 2);

    // And the summary reflects it.
    let summary = store.conversation(conversation_id).unwrap().last_message.unwrap();
    assert_eq!(summary.message_id, sent.id);
    assert_eq!(summary.preview, "second");
}

#[tokio::test]
async fn non_participant_cannot_send_or_read() {
    let (ctx, _store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob, eve) = (Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;

    let err = messages
        .send_message(eve, conversation_id, text_message("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = messages.get_messages(eve, conversation_id, 1, 50).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn listing_records_first_write_wins_receipts() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let sent = messages
        .send_message(alice, conversation_id, text_message("hello"))
        .await
        .unwrap();

    let page = messages.get_messages(bob, conversation_id, 1, 50).await.unwrap();
    assert!(page.items[0].read_by.iter().any(|r| r.user_id == bob));

    let first_receipt = *store.message(sent.id).unwrap().read_by.get(&bob).unwrap();

    // A repeat read keeps the original receipt timestamp.
    messages.get_messages(bob, conversation_id, 1, 50).await.unwrap();
    let stored = store.message(sent.id).unwrap();
    assert_eq!(stored.read_by.len(), 1);
    assert_eq!(*stored.read_by.get(&bob).unwrap(), first_receipt);
}

#[tokio::test]
async fn soft_deleted_messages_vanish_from_listings_but_not_lookups() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let sent = messages
        .send_message(alice, conversation_id, text_message("ephemeral"))
        .await
        .unwrap();

    messages.delete_message(alice, sent.id).await.unwrap();
    // Idempotent.
    messages.delete_message(alice, sent.id).await.unwrap();

    let page = messages.get_messages(bob, conversation_id, 1, 50).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 0);

    let stored = store.message(sent.id).unwrap();
    assert!(stored.is_deleted);
    assert!(stored.deleted_at.is_some());
    assert_eq!(stored.content, "ephemeral");
}

#[tokio::test]
async fn deleting_the_newest_message_recomputes_the_summary() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let first = messages
        .send_message(alice, conversation_id, text_message("first"))
        .await
        .unwrap();
    let second = messages
        .send_message(alice, conversation_id, text_message("second"))
        .await
        .unwrap();

    messages.delete_message(alice, second.id).await.unwrap();
    let summary = store.conversation(conversation_id).unwrap().last_message.unwrap();
    assert_eq!(summary.message_id, first.id);

    messages.delete_message(alice, first.id).await.unwrap();
    assert!(store.conversation(conversation_id).unwrap().last_message.is_none());
}

#[tokio::test]
async fn reactions_converge_to_last_write() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let sent = messages
        .send_message(alice, conversation_id, text_message("react to me"))
        .await
        .unwrap();

    for emoji in ["👍", "👍", "❤️"] {
        messages
            .add_reaction(bob, sent.id, ReactionRequest { emoji: emoji.to_string() })
            .await
            .unwrap();
    }

    let stored = store.message(sent.id).unwrap();
    assert_eq!(stored.reactions.len(), 1);
    assert_eq!(stored.reactions.get(&bob).unwrap().emoji, "❤️");

    // Removal is idempotent.
    messages.remove_reaction(bob, sent.id).await.unwrap();
    messages.remove_reaction(bob, sent.id).await.unwrap();
    assert!(store.message(sent.id).unwrap().reactions.is_empty());
}

#[tokio::test]
async fn only_the_sender_may_edit_or_delete() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let sent = messages
        .send_message(alice, conversation_id, text_message("original"))
        .await
        .unwrap();

    let err = messages
        .edit_message(bob, sent.id, EditMessageRequest { content: "hacked".to_string() })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert_eq!(store.message(sent.id).unwrap().content, "original");
    assert!(!store.message(sent.id).unwrap().is_edited);

    let err = messages.delete_message(bob, sent.id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let edited = messages
        .edit_message(alice, sent.id, EditMessageRequest { content: "fixed".to_string() })
        .await
        .unwrap();
    assert!(edited.is_edited);
    assert_eq!(store.message(sent.id).unwrap().content, "fixed");
}

#[tokio::test]
async fn non_text_content_requires_matching_metadata() {
    let (ctx, _store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;

    // Missing metadata entirely.
    let request = SendMessageRequest {
        content: "photo".to_string(),
        content_type: Some(ContentType::Image),
        metadata: None,
        reply_to: None,
    };
    assert!(matches!(
        messages.send_message(alice, conversation_id, request).await,
        Err(ServiceError::Validation(_))
    ));

    // Metadata present but missing the required field.
    let request = SendMessageRequest {
        content: "clip".to_string(),
        content_type: Some(ContentType::Audio),
        metadata: Some(MessageMetadata {
            url: Some("https://cdn.example/clip.ogg".to_string()),
            ..Default::default()
        }),
        reply_to: None,
    };
    assert!(matches!(
        messages.send_message(alice, conversation_id, request).await,
        Err(ServiceError::Validation(_))
    ));

    // Complete metadata goes through.
    let request = SendMessageRequest {
        content: "clip".to_string(),
        content_type: Some(ContentType::Audio),
        metadata: Some(MessageMetadata {
            url: Some("https://cdn.example/clip.ogg".to_string()),
            duration_seconds: Some(12.5),
            ..Default::default()
        }),
        reply_to: None,
    };
    assert!(messages.send_message(alice, conversation_id, request).await.is_ok());
}

#[tokio::test]
async fn replies_must_stay_within_the_conversation() {
    let (ctx, _store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob, carol) = (Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));

    let first_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let other_id = conversations
        .create_conversation(alice, direct_request(carol))
        .await
        .unwrap()
        .conversation
        .id;

    let elsewhere = messages
        .send_message(alice, other_id, text_message("elsewhere"))
        .await
        .unwrap();

    let request = SendMessageRequest {
        content: "reply".to_string(),
        content_type: None,
        metadata: None,
        reply_to: Some(elsewhere.id.to_string()),
    };
    assert!(matches!(
        messages.send_message(alice, first_id, request).await,
        Err(ServiceError::Validation(_))
    ));

    // Replying within the conversation works.
    let original = messages
        .send_message(alice, first_id, text_message("here"))
        .await
        .unwrap();
    let request = SendMessageRequest {
        content: "reply".to_string(),
        content_type: None,
        metadata: None,
        reply_to: Some(original.id.to_string()),
    };
    let reply = messages.send_message(bob, first_id, request).await.unwrap();
    assert_eq!(reply.reply_to, Some(original.id));
}

#[tokio::test]
async fn conversation_delete_cascades_messages() {
    let (ctx, store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    let conversation_id = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let sent = messages
        .send_message(alice, conversation_id, text_message("doomed"))
        .await
        .unwrap();

    // Members cannot delete the conversation.
    let err = conversations
        .delete_conversation(bob, conversation_id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    conversations.delete_conversation(alice, conversation_id).await.unwrap();
    assert!(store.conversation(conversation_id).is_none());
    assert!(store.message(sent.id).is_none());
}

#[tokio::test]
async fn group_scenario_removal_revokes_access() {
    let (ctx, _store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob) = (Snowflake::new(1), Snowflake::new(2));

    // Alice creates "Team" with Bob and greets.
    let conversation_id = conversations
        .create_conversation(alice, group_request("Team", &[bob]))
        .await
        .unwrap()
        .conversation
        .id;
    messages
        .send_message(alice, conversation_id, text_message("hello"))
        .await
        .unwrap();

    // Bob reads it, recording his receipt.
    let page = messages.get_messages(bob, conversation_id, 1, 50).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content, "hello");
    assert_eq!(page.items[0].sender_id, alice);
    assert!(page.items[0].read_by.iter().any(|r| r.user_id == bob));

    // Alice removes Bob; his next read fails.
    conversations
        .remove_participant(alice, conversation_id, bob)
        .await
        .unwrap();
    let err = messages.get_messages(bob, conversation_id, 1, 50).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn conversations_list_orders_by_activity() {
    let (ctx, _store) = test_context();
    let conversations = ConversationService::new(&ctx);
    let messages = MessageService::new(&ctx);
    let (alice, bob, carol) = (Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));

    let with_bob = conversations
        .create_conversation(alice, direct_request(bob))
        .await
        .unwrap()
        .conversation
        .id;
    let with_carol = conversations
        .create_conversation(alice, direct_request(carol))
        .await
        .unwrap()
        .conversation
        .id;
    let empty = conversations
        .create_conversation(alice, group_request("Quiet", &[bob, carol]))
        .await
        .unwrap()
        .conversation
        .id;

    messages.send_message(alice, with_bob, text_message("one")).await.unwrap();
    messages.send_message(alice, with_carol, text_message("two")).await.unwrap();

    let page = conversations.list_conversations(alice, 1, 50).await.unwrap();
    let ids: Vec<Snowflake> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids.first(), Some(&with_carol));
    assert_eq!(ids.get(1), Some(&with_bob));
    // The conversation without messages sorts last.
    assert_eq!(ids.last(), Some(&empty));
    assert_eq!(page.pagination.total, 3);
}
