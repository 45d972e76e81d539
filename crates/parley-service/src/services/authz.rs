//! Authorization gate
//!
//! Pure predicates over already-loaded entities. No store access, no side
//! effects; the managers load the entity and consult these synchronously,
//! which keeps their authorization logic independently testable.

use parley_core::{Conversation, DomainError, Message, Snowflake};

/// Check whether the user is a participant of the conversation
#[inline]
pub fn is_participant(conversation: &Conversation, user_id: Snowflake) -> bool {
    conversation.is_participant(user_id)
}

/// Check whether the user is an admin of the conversation
#[inline]
pub fn is_admin(conversation: &Conversation, user_id: Snowflake) -> bool {
    conversation.is_admin(user_id)
}

/// Check whether the user authored the message
#[inline]
pub fn is_author(message: &Message, user_id: Snowflake) -> bool {
    message.sender_id == user_id
}

/// Require participation, erroring otherwise
pub fn require_participant(
    conversation: &Conversation,
    user_id: Snowflake,
) -> Result<(), DomainError> {
    if is_participant(conversation, user_id) {
        Ok(())
    } else {
        Err(DomainError::NotParticipant)
    }
}

/// Require the admin role, erroring otherwise
pub fn require_admin(conversation: &Conversation, user_id: Snowflake) -> Result<(), DomainError> {
    if is_admin(conversation, user_id) {
        Ok(())
    } else {
        Err(DomainError::NotAdmin)
    }
}

/// Require authorship of the message, erroring otherwise
pub fn require_author(message: &Message, user_id: Snowflake) -> Result<(), DomainError> {
    if is_author(message, user_id) {
        Ok(())
    } else {
        Err(DomainError::NotMessageSender)
    }
}
