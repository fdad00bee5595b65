use std::sync::Arc;

use bson::oid::ObjectId;
use parley_db::models::Message;
use thiserror::Error;
use tracing::{debug, info};

use crate::access::AccessFilter;
use crate::dao::base::DaoError;
use crate::dao::message::MessageDao;
use crate::dao::room::RoomDao;
use crate::hub::{EventHub, EventKind, HubEvent, MessageEvent, RoomEvent, Topic, UnreadDelta};
use crate::unread::UnreadEngine;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Validation: {0}")]
    Validation(String),
    #[error("Access denied")]
    AccessDenied,
    #[error(transparent)]
    Dao(#[from] DaoError),
}

/// Message ingestion pipeline. `send` is the write path of the whole
/// engine: validate, authorize, persist, restore departed participants,
/// bump counters, fan out. The caller gets the persisted message back as
/// soon as it is durable; hub delivery is asynchronous and best-effort.
pub struct ChatService {
    rooms: Arc<RoomDao>,
    messages: Arc<MessageDao>,
    access: Arc<AccessFilter>,
    unread: Arc<UnreadEngine>,
    hub: Arc<EventHub>,
    max_content_len: usize,
}

impl ChatService {
    pub fn new(
        rooms: Arc<RoomDao>,
        messages: Arc<MessageDao>,
        access: Arc<AccessFilter>,
        unread: Arc<UnreadEngine>,
        hub: Arc<EventHub>,
        max_content_len: usize,
    ) -> Self {
        Self {
            rooms,
            messages,
            access,
            unread,
            hub,
            max_content_len,
        }
    }

    pub async fn send(
        &self,
        author_id: ObjectId,
        room_id: ObjectId,
        content: String,
    ) -> Result<Message, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::Validation("content must not be empty".into()));
        }
        if content.chars().count() > self.max_content_len {
            return Err(ChatError::Validation(format!(
                "content exceeds {} characters",
                self.max_content_len
            )));
        }

        // Authorization: open rooms auto-join the author; closed rooms
        // require an active membership (a departed member is denied —
        // writing does not restore, only receiving does).
        let room = self.rooms.find_by_id(room_id).await?;
        if !self.access.can_write_room(&room, author_id).await? {
            return Err(ChatError::AccessDenied);
        }

        // Persistence failure aborts the whole send; nothing has fanned
        // out yet at this point.
        let message = self.messages.create(room_id, author_id, content).await?;

        // Anyone who left this room reappears as of this message.
        let restored = self.rooms.restore_all_deleted(room_id).await?;
        if !restored.is_empty() {
            info!(?room_id, count = restored.len(), "Restored participants on send");
        }

        // Counters for everyone but the author, then fan-out. All of
        // this is post-persistence: failures degrade delivery, never the
        // request.
        self.hub.publish(HubEvent {
            topic: Topic::Room(room_id),
            kind: EventKind::MessageCreated(MessageEvent::from(&message)),
        });

        for user_id in &restored {
            self.hub.publish(HubEvent {
                topic: Topic::UserRooms(*user_id),
                kind: EventKind::RoomRestored(RoomEvent::with_room(&room, *user_id)),
            });
        }

        let recipients = self.rooms.active_user_ids(room_id).await?;
        for user_id in recipients.into_iter().filter(|id| *id != author_id) {
            match self.unread.increment(room_id, user_id).await {
                Ok(Some(count)) => {
                    self.hub.publish(HubEvent {
                        topic: Topic::UserUnread(user_id),
                        kind: EventKind::UnreadChanged(UnreadDelta {
                            room_id: room_id.to_hex(),
                            user_id: user_id.to_hex(),
                            unread_count: count,
                            timestamp: message
                                .created_at
                                .try_to_rfc3339_string()
                                .unwrap_or_default(),
                        }),
                    });
                }
                Ok(None) => {
                    debug!(?user_id, ?room_id, "Unread increment debounced");
                }
                Err(e) => {
                    // Counter trouble for one recipient must not undo a
                    // durable message or starve the other recipients.
                    tracing::warn!(?user_id, ?room_id, %e, "Unread increment failed");
                }
            }
        }

        Ok(message)
    }
}
