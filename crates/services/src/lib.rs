pub mod access;
pub mod auth;
pub mod chat;
pub mod dao;
pub mod hub;
pub mod unread;

pub use access::AccessFilter;
pub use auth::TokenVerifier;
pub use chat::{ChatError, ChatService};
pub use hub::EventHub;
pub use unread::UnreadEngine;
