use jsonwebtoken::{decode, DecodingKey, Validation};
use parley_config::JwtSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims of the tokens the external identity service signs for us.
/// Plain access tokens carry just the identity; capability tokens for
/// hub subscription additionally enumerate the permitted topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Verification half of the auth boundary. Token issuance (login,
/// refresh, rotation) lives in the identity service; this engine only
/// checks signatures and reads claims.
pub struct TokenVerifier {
    jwt_settings: JwtSettings,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(jwt_settings: JwtSettings) -> Self {
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        Self {
            jwt_settings,
            decoding_key,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.jwt_settings.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}
