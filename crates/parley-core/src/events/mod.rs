//! Domain events

mod domain_event;

pub use domain_event::{
    ChatEvent, ConversationCreatedEvent, ConversationDeletedEvent, ConversationUpdatedEvent,
    MessageCreatedEvent, MessageDeletedEvent, MessageUpdatedEvent, ParticipantAddedEvent,
    ParticipantRemovedEvent, ReactionAddedEvent, ReactionRemovedEvent, TypingStartedEvent,
};
