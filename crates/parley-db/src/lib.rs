//! # parley-db
//!
//! Database layer implementing the repository traits with PostgreSQL via SQLx.
//!
//! Entities are stored document-style: one row per conversation or message,
//! with sub-entity collections (participants, reactions, read receipts) in
//! JSONB columns. Every sub-entity mutation is a single UPDATE statement, so
//! it is atomic per row; there are no cross-row transactions, matching the
//! store model the domain layer is written against.

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{PgConversationRepository, PgMessageRepository, PgUserRepository};
