use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Tokens stay valid for a fixed window after issuance.
pub const TOKEN_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued for.
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens carrying a user id.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn generate_token(&self, user_id: Uuid) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Returns the user id encoded in the token. Expired, malformed, or
    /// wrongly-signed tokens all fail verification.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, JwtError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_user_id() {
        let service = JwtService::new(b"test-secret");
        let user_id = Uuid::new_v4();
        let token = service.generate_token(user_id).unwrap();
        assert_eq!(service.verify_token(&token).unwrap(), user_id);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = JwtService::new(b"one");
        let verifier = JwtService::new(b"two");
        let token = issuer.generate_token(Uuid::new_v4()).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let service = JwtService::new(b"test-secret");
        assert!(service.verify_token("not-a-token").is_err());
    }
}
