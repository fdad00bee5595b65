use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::Response,
};
use futures::{SinkExt, StreamExt};
use parley_services::hub::Topic;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

/// Hub subscriber endpoint. The capability token's claims enumerate the
/// topics this connection may receive; we verify the signature, parse
/// the topics, and wire the socket into the hub.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let claims = match state.verifier.verify(&params.token) {
        Ok(c) => c,
        Err(_) => {
            return Response::builder()
                .status(401)
                .body("Unauthorized".into())
                .unwrap();
        }
    };

    let mut topics = Vec::with_capacity(claims.topics.len());
    for raw in &claims.topics {
        match raw.parse::<Topic>() {
            Ok(topic) => topics.push(topic),
            Err(_) => {
                return Response::builder()
                    .status(400)
                    .body("Invalid topic in token".into())
                    .unwrap();
            }
        }
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state, claims.sub, topics))
}

async fn handle_socket(socket: WebSocket, state: AppState, user: String, topics: Vec<Topic>) {
    let connection_id = Uuid::new_v4().to_string();
    info!(%user, %connection_id, topics = topics.len(), "Hub subscriber connected");

    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    // One outbound lane per connection, shared across its topics. A full
    // lane drops events; the client catches up by refetching.
    let (tx, mut rx) = mpsc::channel::<String>(state.hub.subscriber_capacity());
    for topic in &topics {
        state.hub.subscribe(topic, &connection_id, tx.clone());
    }

    {
        let msg = serde_json::json!({
            "type": "connected",
            "data": { "connection_id": &connection_id },
        });
        let mut guard = sender.lock().await;
        let _ = guard
            .send(Message::text(msg.to_string()))
            .await;
    }

    // Forward hub events to the socket
    let forward_sender = sender.clone();
    let forward_conn = connection_id.clone();
    let forward = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            let mut guard = forward_sender.lock().await;
            if let Err(e) = guard.send(Message::text(text)).await {
                warn!(connection_id = %forward_conn, %e, "Failed to forward hub event");
                break;
            }
        }
    });

    // Inbound loop: the hub is one-way, so only control traffic matters
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Ping(data)) => {
                let mut guard = sender.lock().await;
                let _ = guard.send(Message::Pong(data)).await;
            }
            Ok(Message::Text(text)) => {
                debug!(%connection_id, %text, "Ignoring inbound hub message");
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(%connection_id, %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.hub.unsubscribe_all(&connection_id);
    forward.abort();
    info!(%user, %connection_id, "Hub subscriber disconnected");
}
