use bson::oid::ObjectId;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use parley_config::Settings;
use parley_services::auth::Claims;

/// A test user: an identity plus the tokens the external identity
/// service would have issued for it.
pub struct TestUser {
    pub user_id: ObjectId,
    pub access_token: String,
}

/// Signs an access token the way the identity service does — same
/// secret, same issuer, no topic claims.
pub fn issue_access_token(settings: &Settings, user_id: ObjectId) -> String {
    issue_token(settings, user_id, Vec::new())
}

/// Signs a capability token whose claims enumerate hub topics.
pub fn issue_capability_token(
    settings: &Settings,
    user_id: ObjectId,
    topics: Vec<String>,
) -> String {
    issue_token(settings, user_id, topics)
}

fn issue_token(settings: &Settings, user_id: ObjectId, topics: Vec<String>) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_hex(),
        iat: now,
        exp: now + 3600,
        iss: settings.jwt.issuer.clone(),
        topics,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt.secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn test_user(settings: &Settings) -> TestUser {
    let user_id = ObjectId::new();
    TestUser {
        user_id,
        access_token: issue_access_token(settings, user_id),
    }
}
