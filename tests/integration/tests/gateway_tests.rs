//! Gateway WebSocket end-to-end tests
//!
//! Connection gating (close 4004 before any event exchange), live fan-out of
//! domain events to other participants, and tolerance of unknown payloads.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use integration_tests::fixtures::{ConversationDto, Envelope};
use integration_tests::TestServer;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const EVENT_WAIT: Duration = Duration::from_secs(5);

/// Read frames until a JSON text frame arrives (skipping pings), or time out
async fn next_event(ws: &mut WsStream) -> Value {
    timeout(EVENT_WAIT, async {
        while let Some(frame) = ws.next().await {
            match frame.expect("websocket error") {
                Message::Text(text) => return serde_json::from_str(&text).expect("invalid JSON"),
                Message::Ping(_) | Message::Pong(_) => {}
                other => panic!("unexpected frame: {other:?}"),
            }
        }
        panic!("connection closed while waiting for event");
    })
    .await
    .expect("timed out waiting for event")
}

async fn create_direct(server: &TestServer, token: &str, other: &str) -> String {
    let body = json!({ "kind": "direct", "participant_ids": [other] });
    let response = server.post("/api/v1/conversations", token, &body).await.unwrap();
    let envelope: Envelope<ConversationDto> = response.json().await.unwrap();
    envelope.data.unwrap().id
}

#[tokio::test]
async fn connection_without_credential_is_refused_with_4004() {
    let server = TestServer::start().await.unwrap();

    let (mut ws, _) = connect_async(server.gateway_url(None)).await.unwrap();

    let frame = timeout(EVENT_WAIT, ws.next()).await.unwrap().unwrap().unwrap();
    match frame {
        Message::Close(Some(close)) => {
            assert_eq!(u16::from(close.code), 4004);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_with_invalid_credential_is_refused_with_4004() {
    let server = TestServer::start().await.unwrap();

    let (mut ws, _) = connect_async(server.gateway_url(Some("garbage-token"))).await.unwrap();

    let frame = timeout(EVENT_WAIT, ws.next()).await.unwrap().unwrap().unwrap();
    match frame {
        Message::Close(Some(close)) => {
            assert_eq!(u16::from(close.code), 4004);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn rest_send_fans_out_to_other_participants() {
    let server = TestServer::start().await.unwrap();
    let (_alice, alice_token) = server.seed_user(1, "alice").await;
    let (bob, bob_token) = server.seed_user(2, "bob").await;

    let conversation_id = create_direct(&server, &alice_token, &bob.to_string()).await;

    let (mut bob_ws, _) = connect_async(server.gateway_url(Some(&bob_token))).await.unwrap();
    // Give the server a moment to bind the connection.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let response = server
        .post(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &alice_token,
            &json!({ "content": "live hello" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let event = next_event(&mut bob_ws).await;
    assert_eq!(event["type"], "MESSAGE_CREATED");
    assert_eq!(event["conversation_id"], conversation_id);
    assert_eq!(event["preview"], "live hello");
}

#[tokio::test]
async fn chat_frames_send_messages_and_unknown_frames_are_ignored() {
    let server = TestServer::start().await.unwrap();
    let (_alice, alice_token) = server.seed_user(1, "alice").await;
    let (bob, bob_token) = server.seed_user(2, "bob").await;

    let conversation_id = create_direct(&server, &alice_token, &bob.to_string()).await;

    let (mut alice_ws, _) = connect_async(server.gateway_url(Some(&alice_token))).await.unwrap();
    let (mut bob_ws, _) = connect_async(server.gateway_url(Some(&bob_token))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Unknown and malformed frames must not close Bob's connection.
    bob_ws
        .send(Message::Text(r#"{"type":"presence","status":"online"}"#.to_string()))
        .await
        .unwrap();
    bob_ws.send(Message::Text("not json at all".to_string())).await.unwrap();

    // The same connection can still send a chat frame afterwards.
    let chat_frame = json!({
        "type": "chat",
        "conversation_id": conversation_id,
        "content": "sent over the socket"
    });
    bob_ws.send(Message::Text(chat_frame.to_string())).await.unwrap();

    let event = next_event(&mut alice_ws).await;
    assert_eq!(event["type"], "MESSAGE_CREATED");
    assert_eq!(event["preview"], "sent over the socket");

    // And the message is durable, visible through the REST listing.
    let response = server
        .get(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &alice_token,
        )
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"][0]["content"], "sent over the socket");
}

#[tokio::test]
async fn typing_frames_reach_other_participants_only() {
    let server = TestServer::start().await.unwrap();
    let (_alice, alice_token) = server.seed_user(1, "alice").await;
    let (bob, bob_token) = server.seed_user(2, "bob").await;

    let conversation_id = create_direct(&server, &alice_token, &bob.to_string()).await;

    let (mut alice_ws, _) = connect_async(server.gateway_url(Some(&alice_token))).await.unwrap();
    let (mut bob_ws, _) = connect_async(server.gateway_url(Some(&bob_token))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let typing_frame = json!({ "type": "typing", "conversation_id": conversation_id });
    bob_ws.send(Message::Text(typing_frame.to_string())).await.unwrap();

    let event = next_event(&mut alice_ws).await;
    assert_eq!(event["type"], "TYPING_STARTED");
    assert_eq!(event["user_id"], bob.to_string());

    // Bob, as the originator, must not see his own typing event; the next
    // thing he receives is the reaction-free message event below.
    let response = server
        .post(
            &format!("/api/v1/conversations/{conversation_id}/messages"),
            &alice_token,
            &json!({ "content": "after typing" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let event = next_event(&mut bob_ws).await;
    assert_eq!(event["type"], "MESSAGE_CREATED");
}
