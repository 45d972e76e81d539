//! Individual WebSocket connection
//!
//! Represents a single live connection and the identity bound to it.

use parley_core::Snowflake;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

/// A single WebSocket connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Authenticated user ID (None until the credential is verified)
    user_id: RwLock<Option<Snowflake>>,

    /// Channel carrying serialized frames to the socket's send task
    sender: mpsc::Sender<String>,

    /// Connection establishment time
    connected_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(session_id: String, sender: mpsc::Sender<String>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id: RwLock::new(None),
            sender,
            connected_at: Instant::now(),
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the bound user ID (if authenticated)
    pub async fn user_id(&self) -> Option<Snowflake> {
        *self.user_id.read().await
    }

    /// Bind the connection to a verified user identity
    pub async fn set_user_id(&self, user_id: Snowflake) {
        *self.user_id.write().await = Some(user_id);
    }

    /// Check if the connection is authenticated
    pub async fn is_authenticated(&self) -> bool {
        self.user_id.read().await.is_some()
    }

    /// Queue a serialized frame for delivery.
    ///
    /// Fails when the send task has gone away or its buffer is full; callers
    /// treat that as a per-connection delivery failure, never an error.
    pub async fn send(&self, frame: String) -> Result<(), mpsc::error::SendError<String>> {
        self.sender.send(frame).await
    }

    /// Check if the socket side of this connection is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// How long this connection has been open
    pub fn age(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .finish()
    }
}
