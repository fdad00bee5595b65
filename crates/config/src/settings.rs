use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub message: MessageSettings,
    pub unread: UnreadSettings,
    pub hub: HubSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

/// Verification-side JWT settings. Tokens are issued by the external
/// identity service with the same secret/issuer pair.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessageSettings {
    pub max_content_len: usize,
    pub default_page_size: u64,
}

/// Unread-counter tuning. The grace window should stay at roughly twice
/// the heartbeat interval so a single missed heartbeat does not inflate
/// counters for a user who has the room open.
#[derive(Debug, Deserialize, Clone)]
pub struct UnreadSettings {
    pub grace_window_secs: u64,
    pub heartbeat_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HubSettings {
    /// Capacity of the publish queue drained by the hub worker.
    pub queue_capacity: usize,
    /// Per-subscriber channel capacity; slow consumers drop events.
    pub subscriber_capacity: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("PARLEY"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "parley")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.issuer", "parley")?
            .set_default("message.max_content_len", 4000)?
            .set_default("message.default_page_size", 25)?
            .set_default("unread.grace_window_secs", 6)?
            .set_default("unread.heartbeat_interval_secs", 3)?
            .set_default("hub.queue_capacity", 1024)?
            .set_default("hub.subscriber_capacity", 64)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
