//! Event dispatcher
//!
//! Consumes the in-process event bus and fans each event out to the live
//! connections of the affected conversation's participants. Fan-out is
//! fire-and-forget: a failed push to one connection never affects the others
//! or the operation that raised the event.

use crate::connection::ConnectionRegistry;
use parley_service::{EventEnvelope, ServiceContext};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Routes domain events to WebSocket connections
pub struct EventDispatcher {
    registry: Arc<ConnectionRegistry>,
    ctx: ServiceContext,
    running: Arc<AtomicBool>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    pub fn new(registry: Arc<ConnectionRegistry>, ctx: ServiceContext) -> Arc<Self> {
        Arc::new(Self {
            registry,
            ctx,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the dispatcher loop as a background task
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    /// Stop the dispatcher loop
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the dispatcher is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self) {
        let mut receiver = self.ctx.events().subscribe();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(envelope) => {
                    self.notify(envelope).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Delivery is an optimization; dropped events are still
                    // visible through the message listing.
                    tracing::warn!(skipped, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Event bus closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }

    /// Fan one event out to the participants' live connections.
    ///
    /// Recipients come from the envelope when pre-resolved (delete paths) and
    /// from the conversation document otherwise.
    pub async fn notify(&self, envelope: EventEnvelope) {
        let event_type = envelope.event.event_type();

        let recipients = match envelope.recipients {
            Some(recipients) => recipients,
            None => {
                match self
                    .ctx
                    .conversation_repo()
                    .find_by_id(envelope.conversation_id)
                    .await
                {
                    Ok(Some(conversation)) => {
                        conversation.participants.iter().map(|p| p.user_id).collect()
                    }
                    Ok(None) => {
                        tracing::debug!(
                            conversation_id = %envelope.conversation_id,
                            event_type,
                            "Conversation gone before fan-out, dropping event"
                        );
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(
                            conversation_id = %envelope.conversation_id,
                            event_type,
                            error = %e,
                            "Failed to resolve recipients, dropping event"
                        );
                        return;
                    }
                }
            }
        };

        let frame = match serde_json::to_string(&envelope.event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(event_type, error = %e, "Failed to serialize event");
                return;
            }
        };

        let mut sent = 0;
        for user_id in recipients {
            if envelope.exclude_user == Some(user_id) {
                continue;
            }
            sent += self.registry.send_to_user(user_id, &frame).await;
        }

        tracing::trace!(
            conversation_id = %envelope.conversation_id,
            event_type,
            sent,
            "Event dispatched"
        );
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("registry", &self.registry)
            .field("running", &self.is_running())
            .finish()
    }
}
