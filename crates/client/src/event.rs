use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::timeline::ConfirmedMessage;

/// The subset of hub traffic a room view reacts to, decoded from the
/// `{"type": ..., "data": ...}` envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Message(ConfirmedMessage),
    UnreadChanged { room_id: String, unread_count: i64 },
    RoomListChanged { room_id: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct MessageData {
    id: String,
    room_id: String,
    author_id: String,
    content: String,
    created_at: String,
}

/// Decodes one frame from the hub. Unknown event types and malformed
/// payloads yield `None` — the hub may grow new event kinds without
/// breaking older clients.
pub fn decode(text: &str) -> Option<(String, ClientEvent)> {
    let envelope: Envelope = serde_json::from_str(text).ok()?;
    match envelope.kind.as_str() {
        "message:create" => {
            let data: MessageData = serde_json::from_value(envelope.data).ok()?;
            let created_at: DateTime<Utc> = data
                .created_at
                .parse::<DateTime<chrono::FixedOffset>>()
                .ok()?
                .with_timezone(&Utc);
            Some((
                data.room_id.clone(),
                ClientEvent::Message(ConfirmedMessage {
                    id: data.id,
                    author_id: data.author_id,
                    content: data.content,
                    created_at,
                }),
            ))
        }
        "unread:change" => {
            let room_id = envelope.data.get("room_id")?.as_str()?.to_string();
            let unread_count = envelope.data.get("unread_count")?.as_i64()?;
            Some((
                room_id.clone(),
                ClientEvent::UnreadChanged {
                    room_id,
                    unread_count,
                },
            ))
        }
        "room:joined" | "room:restored" => {
            let room_id = envelope.data.get("room_id")?.as_str()?.to_string();
            Some((room_id.clone(), ClientEvent::RoomListChanged { room_id }))
        }
        other => {
            debug!(kind = other, "Ignoring unknown hub event");
            None
        }
    }
}
