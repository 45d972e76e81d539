//! Request handlers

pub mod conversations;
pub mod health;
pub mod messages;
pub mod reactions;
