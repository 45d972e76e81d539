//! WebSocket handler
//!
//! The client presents its credential as a connection-time query parameter.
//! Verification happens before any event exchange: a missing or invalid
//! credential closes the socket with an authentication-failure code
//! immediately after the upgrade, and no frames are accepted.

use crate::protocol::{ClientEvent, CloseCode};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use parley_core::{PresenceStatus, Snowflake};
use parley_service::{ConversationService, MessageService, SendMessageRequest};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel buffer size for outgoing frames
const FRAME_BUFFER_SIZE: usize = 100;

/// Connection-time query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Bearer credential; the "Bearer " prefix is optional
    pub token: Option<String>,
}

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(query): Query<ConnectQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket, query.token))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, mut socket: WebSocket, token: Option<String>) {
    // Gate on the credential before anything else.
    let user_id = match verify_credential(&state, token.as_deref()) {
        Ok(user_id) => user_id,
        Err(reason) => {
            tracing::debug!(reason, "Refusing unauthenticated connection");
            refuse(&mut socket, reason).await;
            return;
        }
    };

    let session_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<String>(FRAME_BUFFER_SIZE);

    state.registry().register(session_id.clone(), tx);
    state.registry().bind(&session_id, user_id).await;

    tracing::info!(session_id = %session_id, user_id = %user_id, "Connection established");

    // Presence goes online best-effort; live delivery never depends on it.
    state
        .service_context()
        .user_repo()
        .set_presence(user_id, PresenceStatus::Online)
        .await
        .ok();

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Pump queued frames out to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Process inbound frames until the client goes away.
    let recv_state = state.clone();
    let recv_session = session_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(frame) = ws_stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    handle_client_event(&recv_state, user_id, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        session_id = %recv_session,
                        "Ignoring binary frame"
                    );
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %recv_session, "Client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::debug!(session_id = %recv_session, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    cleanup_connection(&state, &session_id, user_id).await;
}

/// Verify the connection credential, returning the bound user id
fn verify_credential(state: &GatewayState, token: Option<&str>) -> Result<Snowflake, &'static str> {
    let token = token.ok_or("missing credential")?;
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    state
        .service_context()
        .jwt_service()
        .verify_user(token)
        .map_err(|_| "invalid credential")
}

/// Close the socket with the authentication-failure code
async fn refuse(socket: &mut WebSocket, reason: &'static str) {
    let frame = CloseFrame {
        code: CloseCode::AuthenticationFailed.as_u16(),
        reason: reason.into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

/// Handle one inbound client frame.
///
/// Unrecognized payload shapes are logged and ignored; they never close the
/// connection or affect other connections. Recognized events run through the
/// same manager paths (and authorization) as their REST counterparts.
async fn handle_client_event(state: &GatewayState, user_id: Snowflake, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(user_id = %user_id, error = %e, "Ignoring unrecognized event payload");
            return;
        }
    };

    match event {
        ClientEvent::Chat(payload) => {
            let request = SendMessageRequest {
                content: payload.content,
                content_type: payload.content_type,
                metadata: payload.metadata,
                reply_to: payload.reply_to,
            };
            let service = MessageService::new(state.service_context());
            if let Err(e) = service
                .send_message(user_id, payload.conversation_id, request)
                .await
            {
                tracing::debug!(
                    user_id = %user_id,
                    conversation_id = %payload.conversation_id,
                    error = %e,
                    "Rejected chat frame"
                );
            }
        }
        ClientEvent::Typing(payload) => {
            let service = ConversationService::new(state.service_context());
            if let Err(e) = service.notify_typing(user_id, payload.conversation_id).await {
                tracing::debug!(
                    user_id = %user_id,
                    conversation_id = %payload.conversation_id,
                    error = %e,
                    "Rejected typing frame"
                );
            }
        }
    }
}

/// Clean up after a disconnect
async fn cleanup_connection(state: &GatewayState, session_id: &str, user_id: Snowflake) {
    state.registry().unregister(session_id).await;

    // Presence goes offline only when the last connection is gone.
    if !state.registry().is_user_connected(user_id) {
        state
            .service_context()
            .user_repo()
            .set_presence(user_id, PresenceStatus::Offline)
            .await
            .ok();
    }

    tracing::info!(session_id = %session_id, user_id = %user_id, "Connection closed");
}
