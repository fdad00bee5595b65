use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hub addressing scheme. The string forms are the wire contract
/// subscribers put in their capability-token claims:
///
/// - `room/{roomId}` — every message persisted in the room
/// - `user/{userId}/rooms` — membership changes (new room, restored)
/// - `user/{userId}/unread` — unread counter deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Room(ObjectId),
    UserRooms(ObjectId),
    UserUnread(ObjectId),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Room(id) => write!(f, "room/{}", id.to_hex()),
            Topic::UserRooms(id) => write!(f, "user/{}/rooms", id.to_hex()),
            Topic::UserUnread(id) => write!(f, "user/{}/unread", id.to_hex()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid topic: {0}")]
pub struct TopicParseError(pub String);

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let topic = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("room"), Some(id), None, None) => {
                Topic::Room(parse_oid(id, s)?)
            }
            (Some("user"), Some(id), Some("rooms"), None) => {
                Topic::UserRooms(parse_oid(id, s)?)
            }
            (Some("user"), Some(id), Some("unread"), None) => {
                Topic::UserUnread(parse_oid(id, s)?)
            }
            _ => return Err(TopicParseError(s.to_string())),
        };
        Ok(topic)
    }
}

fn parse_oid(id: &str, topic: &str) -> Result<ObjectId, TopicParseError> {
    ObjectId::parse_str(id).map_err(|_| TopicParseError(topic.to_string()))
}

impl Serialize for Topic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
