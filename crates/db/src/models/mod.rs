pub mod message;
pub mod participant;
pub mod room;
pub mod unread_counter;

pub use message::Message;
pub use participant::{Participant, ParticipantRole};
pub use room::{Room, RoomKind};
pub use unread_counter::UnreadCounter;
