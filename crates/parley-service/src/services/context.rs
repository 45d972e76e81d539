//! Service context - dependency container for services
//!
//! Holds the repositories, credential verifier, id generator, and event bus
//! that services operate against.

use std::sync::Arc;

use parley_common::JwtService;
use parley_core::{
    ConversationRepository, MessageRepository, Snowflake, SnowflakeGenerator, UserRepository,
};

use crate::bus::EventBus;

/// Service context containing all dependencies
///
/// This is the dependency container passed to every service. Repositories are
/// trait objects so the same services run against PostgreSQL in production
/// and the in-memory store in tests.
#[derive(Clone)]
pub struct ServiceContext {
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    user_repo: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    events: EventBus,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        message_repo: Arc<dyn MessageRepository>,
        user_repo: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
            user_repo,
            jwt_service,
            snowflake_generator,
            events: EventBus::new(),
        }
    }

    /// Get the conversation repository
    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("events", &self.events)
            .finish()
    }
}
