use std::collections::HashSet;
use std::sync::Arc;

use bson::oid::ObjectId;
use parley_db::models::{Participant, ParticipantRole, Room, RoomKind};
use tracing::debug;

use crate::dao::base::{DaoError, DaoResult};
use crate::dao::room::RoomDao;
use crate::hub::Topic;

/// Computes what a user may see and write. Open rooms are readable and
/// writable by every authenticated user; the first touch materializes a
/// participant row so unread and notification state has something to
/// attach to. Everything else requires an active explicit membership.
pub struct AccessFilter {
    rooms: Arc<RoomDao>,
}

/// Read access per room kind and membership state. Pure so the rule is
/// testable without a database.
pub fn read_allowed(kind: RoomKind, membership: Option<&Participant>) -> bool {
    kind == RoomKind::Open || membership.is_some_and(|p| p.is_active())
}

/// Write access. Identical union rule, spelled separately because the
/// soft-delete nuance differs: a departed member of a closed room may
/// not write their way back in — only receiving a message restores.
pub fn write_allowed(kind: RoomKind, membership: Option<&Participant>) -> bool {
    kind == RoomKind::Open || membership.is_some_and(|p| p.is_active())
}

impl AccessFilter {
    pub fn new(rooms: Arc<RoomDao>) -> Self {
        Self { rooms }
    }

    /// Union of explicitly-joined rooms and all open rooms. Open rooms
    /// the user has never touched get a participant row materialized as
    /// a side effect.
    pub async fn rooms_visible_to(&self, user_id: ObjectId) -> DaoResult<Vec<Room>> {
        let mut visible = self.rooms.find_member_rooms(user_id).await?;
        let joined: HashSet<ObjectId> = visible.iter().filter_map(|r| r.id).collect();

        for room in self.rooms.find_open_rooms().await? {
            let Some(room_id) = room.id else { continue };
            if joined.contains(&room_id) {
                continue;
            }
            self.materialize_membership(room_id, user_id).await?;
            visible.push(room);
        }

        Ok(visible)
    }

    pub async fn can_read(&self, user_id: ObjectId, room_id: ObjectId) -> DaoResult<bool> {
        let room = self.rooms.find_by_id(room_id).await?;
        let membership = self.rooms.find_membership(room_id, user_id).await?;

        if room.kind == RoomKind::Open && membership.is_none() {
            self.materialize_membership(room_id, user_id).await?;
        }

        Ok(read_allowed(room.kind, membership.as_ref()))
    }

    pub async fn can_write(&self, user_id: ObjectId, room_id: ObjectId) -> DaoResult<bool> {
        let room = self.rooms.find_by_id(room_id).await?;
        self.can_write_room(&room, user_id).await
    }

    /// Same as [`AccessFilter::can_write`] for callers that already hold
    /// the room.
    pub async fn can_write_room(&self, room: &Room, user_id: ObjectId) -> DaoResult<bool> {
        let Some(room_id) = room.id else {
            return Ok(false);
        };
        let membership = self.rooms.find_membership(room_id, user_id).await?;

        if room.kind == RoomKind::Open && membership.is_none() {
            self.materialize_membership(room_id, user_id).await?;
        }

        Ok(write_allowed(room.kind, membership.as_ref()))
    }

    /// Every topic the user is entitled to subscribe to: one per visible
    /// room plus the two personal topics. This list is what the identity
    /// service signs into capability-token claims.
    pub async fn entitled_topics(&self, user_id: ObjectId) -> DaoResult<Vec<Topic>> {
        let mut topics = vec![Topic::UserRooms(user_id), Topic::UserUnread(user_id)];
        for room in self.rooms_visible_to(user_id).await? {
            if let Some(room_id) = room.id {
                topics.push(Topic::Room(room_id));
            }
        }
        Ok(topics)
    }

    /// Idempotent: a concurrent materialization of the same (room, user)
    /// loses the unique-index race and that is fine. A soft-deleted row
    /// is left alone — the user chose to depart, and only a new message
    /// in the room may bring them back.
    async fn materialize_membership(
        &self,
        room_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<()> {
        if self.rooms.find_membership(room_id, user_id).await?.is_some() {
            return Ok(());
        }
        match self
            .rooms
            .add_participant(room_id, user_id, ParticipantRole::Member)
            .await
        {
            Ok(_) => {
                debug!(?room_id, ?user_id, "Materialized open-room membership");
                Ok(())
            }
            Err(DaoError::DuplicateKey(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
