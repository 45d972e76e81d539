//! In-process event bus
//!
//! Carries domain events from the managers to the delivery registry in the
//! same process. Publishing is fire-and-forget: nothing the managers do ever
//! blocks on delivery, and a bus without subscribers is not an error.
//!
//! A deployment spanning multiple serving instances would replace this with
//! an external pub/sub collaborator; that wiring is out of scope here.

use parley_core::{ChatEvent, Snowflake};
use tokio::sync::broadcast;

/// Default buffer size for the broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

/// A domain event addressed to the participants of a conversation
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub conversation_id: Snowflake,
    /// Connection fan-out skips this user (usually the actor)
    pub exclude_user: Option<Snowflake>,
    /// Resolved recipients, for events whose conversation no longer exists
    /// (deletes); when None the dispatcher resolves participants itself
    pub recipients: Option<Vec<Snowflake>>,
    pub event: ChatEvent,
}

/// Broadcast-backed event bus shared by managers and the delivery registry
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus with the default buffer size
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with a specific buffer size
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event; never fails, never blocks
    pub fn publish(&self, envelope: EventEnvelope) {
        let event_type = envelope.event.event_type();
        match self.sender.send(envelope) {
            Ok(receivers) => {
                tracing::trace!(event_type, receivers, "Event published");
            }
            Err(_) => {
                // No live subscribers; delivery is an optimization, not truth.
                tracing::trace!(event_type, "Event published with no subscribers");
            }
        }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
