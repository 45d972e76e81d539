//! Entity → DTO mappers

use parley_core::{Conversation, Message};

use super::responses::{
    ConversationResponse, LastMessageResponse, MessageResponse, ParticipantResponse,
    ReactionResponse, ReadReceiptResponse,
};

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            kind: conversation.kind,
            name: conversation.name.clone(),
            description: conversation.description.clone(),
            picture: conversation.picture.clone(),
            participants: conversation
                .participants
                .iter()
                .map(|p| ParticipantResponse {
                    user_id: p.user_id,
                    role: p.role,
                    joined_at: p.joined_at,
                    last_read_at: p.last_read_at,
                })
                .collect(),
            last_message: conversation.last_message.as_ref().map(|summary| {
                LastMessageResponse {
                    message_id: summary.message_id,
                    preview: summary.preview.clone(),
                    sender_id: summary.sender_id,
                    timestamp: summary.timestamp,
                    content_type: summary.content_type,
                }
            }),
            is_encrypted: conversation.is_encrypted,
            settings: conversation.settings.clone(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            content_type: message.content_type,
            metadata: message.metadata.clone(),
            reply_to: message.reply_to,
            reactions: message
                .reactions
                .iter()
                .map(|(user_id, reaction)| ReactionResponse {
                    user_id: *user_id,
                    emoji: reaction.emoji.clone(),
                    timestamp: reaction.reacted_at,
                })
                .collect(),
            read_by: message
                .read_by
                .iter()
                .map(|(user_id, timestamp)| ReadReceiptResponse {
                    user_id: *user_id,
                    timestamp: *timestamp,
                })
                .collect(),
            is_edited: message.is_edited,
            is_deleted: message.is_deleted,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}
