pub mod hub;
pub mod message;
pub mod read;
pub mod room;
