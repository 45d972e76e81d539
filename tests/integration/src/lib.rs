//! Integration test support
//!
//! Provides an in-memory implementation of the repository ports, a test
//! server harness, and response fixtures. The whole suite runs without
//! external services.

pub mod helpers;
pub mod memory;

pub use helpers::{test_context, TestServer};
pub use memory::InMemoryStore;
