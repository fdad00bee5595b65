use mongodb::Database;
use parley_config::Settings;
use parley_services::{
    AccessFilter, ChatService, EventHub, TokenVerifier, UnreadEngine,
    dao::{message::MessageDao, room::RoomDao},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub verifier: Arc<TokenVerifier>,
    pub rooms: Arc<RoomDao>,
    pub messages: Arc<MessageDao>,
    pub access: Arc<AccessFilter>,
    pub unread: Arc<UnreadEngine>,
    pub hub: Arc<EventHub>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    /// Wires the component graph. Must run inside a tokio runtime — the
    /// hub spawns its worker task here.
    pub fn new(db: Database, settings: Settings) -> Self {
        let verifier = Arc::new(TokenVerifier::new(settings.jwt.clone()));
        let rooms = Arc::new(RoomDao::new(&db));
        let messages = Arc::new(MessageDao::new(&db));
        let access = Arc::new(AccessFilter::new(rooms.clone()));
        let unread = Arc::new(UnreadEngine::new(&db, settings.unread.clone()));
        let hub = EventHub::spawn(&settings.hub);
        let chat = Arc::new(ChatService::new(
            rooms.clone(),
            messages.clone(),
            access.clone(),
            unread.clone(),
            hub.clone(),
            settings.message.max_content_len,
        ));

        Self {
            db,
            settings,
            verifier,
            rooms,
            messages,
            access,
            unread,
            hub,
            chat,
        }
    }
}
