//! Repository traits (ports)

mod repositories;

pub use repositories::{
    ConversationRepository, MessageRepository, RepoResult, UserRepository,
};
