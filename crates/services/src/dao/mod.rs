pub mod base;
pub mod message;
pub mod room;

pub use base::BaseDao;
pub use message::MessageDao;
pub use room::RoomDao;
