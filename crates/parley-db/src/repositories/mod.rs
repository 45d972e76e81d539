//! PostgreSQL repository implementations

mod conversation;
mod error;
mod message;
mod user;

pub use conversation::PgConversationRepository;
pub use error::{map_db_error, map_unique_violation};
pub use message::PgMessageRepository;
pub use user::PgUserRepository;
