//! Connection registry
//!
//! Thread-safe mapping from sessions and user ids to live connections, using
//! `DashMap` for concurrent access. Registration, binding, and
//! deregistration are the only mutators; everything else reads.

use super::Connection;
use dashmap::DashMap;
use parley_core::Snowflake;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Registry of all active WebSocket connections on this instance
pub struct ConnectionRegistry {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionRegistry {
    /// Create a new connection registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn register(&self, session_id: String, sender: mpsc::Sender<String>) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection registered");

        connection
    }

    /// Bind a connection to a verified user identity
    pub async fn bind(&self, session_id: &str, user_id: Snowflake) -> bool {
        if let Some(connection) = self.connections.get(session_id) {
            connection.set_user_id(user_id).await;

            self.user_connections
                .entry(user_id)
                .or_default()
                .insert(session_id.to_string());

            tracing::debug!(
                session_id = %session_id,
                user_id = %user_id,
                "Connection bound to user"
            );

            true
        } else {
            false
        }
    }

    /// Remove a connection.
    ///
    /// Uses `alter`/`retain` so the user-index cleanup is atomic and never
    /// races a concurrent bind of another session.
    pub async fn unregister(&self, session_id: &str) {
        if let Some((_, connection)) = self.connections.remove(session_id) {
            if let Some(user_id) = connection.user_id().await {
                self.user_connections.alter(&user_id, |_, mut sessions| {
                    sessions.remove(session_id);
                    sessions
                });
                self.user_connections.retain(|_, sessions| !sessions.is_empty());
            }

            tracing::debug!(session_id = %session_id, "Connection unregistered");
        }
    }

    /// Get a connection by session ID
    pub fn get(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Get all live connections of a user
    pub fn connections_for_user(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_connections
            .get(&user_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push a serialized frame to every live connection of a user.
    ///
    /// Best-effort: a failed push to one connection does not affect the
    /// others. Returns how many connections accepted the frame.
    pub async fn send_to_user(&self, user_id: Snowflake, frame: &str) -> usize {
        let connections = self.connections_for_user(user_id);
        let mut sent = 0;

        for connection in connections {
            if connection.send(frame.to_string()).await.is_ok() {
                sent += 1;
            } else {
                tracing::trace!(
                    session_id = %connection.session_id(),
                    "Dropped frame for dead connection"
                );
            }
        }

        sent
    }

    /// Whether the user has at least one live connection
    pub fn is_user_connected(&self, user_id: Snowflake) -> bool {
        self.user_connections
            .get(&user_id)
            .is_some_and(|sessions| !sessions.is_empty())
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of unique authenticated users
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Check if a session exists
    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .finish()
    }
}
