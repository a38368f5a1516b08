//! Access token issuing and verification

use crate::{clock::Clock, config::AuthConfig, error::AppError, models::User, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REFRESH_TOKEN_BYTES: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Issues signed, time-bounded access tokens and opaque refresh-token
/// strings. Refresh tokens carry no claims; their state lives on the user
/// row.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_token_ttl: Duration::seconds(config.access_token_ttl_seconds as i64),
            clock,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = self.clock.now();
        let claims = AccessClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_token_ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate access token: {}", e)))
    }

    /// Cryptographically random opaque string; unguessable, no embedded
    /// claims.
    pub fn generate_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Verifies signature, issuer, audience and expiry. The boolean never
    /// distinguishes an expired token from a tampered one.
    pub fn validate_token(&self, token: &str) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        match decode::<AccessClaims>(token, &self.decoding_key, &validation) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Token validation failed: {}", e);
                false
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(auth_header: &str) -> Result<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::authentication("Invalid authorization header format"))?;

    if token.is_empty() {
        return Err(AppError::authentication("Empty token"));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use chrono::Utc;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "catalog-api".to_string(),
            jwt_audience: "catalog-clients".to_string(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_days: 7,
        }
    }

    fn test_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "irrelevant".to_string(),
            role: "User".to_string(),
            refresh_token: None,
            refresh_token_expiry: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn issued_access_token_validates() {
        let issuer = TokenIssuer::new(&test_config(), Arc::new(SystemClock));
        let token = issuer.generate_access_token(&test_user()).unwrap();
        assert!(issuer.validate_token(&token));
    }

    #[test]
    fn tampered_and_garbage_tokens_fail_closed() {
        let issuer = TokenIssuer::new(&test_config(), Arc::new(SystemClock));
        let token = issuer.generate_access_token(&test_user()).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(!issuer.validate_token(&tampered));
        assert!(!issuer.validate_token("not-a-jwt"));
        assert!(!issuer.validate_token(""));
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let issuer = TokenIssuer::new(&test_config(), Arc::new(SystemClock));
        let mut other_config = test_config();
        other_config.jwt_secret = "different-secret".to_string();
        let other = TokenIssuer::new(&other_config, Arc::new(SystemClock));

        let token = other.generate_access_token(&test_user()).unwrap();
        assert!(!issuer.validate_token(&token));
    }

    #[test]
    fn refresh_tokens_are_unique_and_opaque() {
        let issuer = TokenIssuer::new(&test_config(), Arc::new(SystemClock));
        let a = issuer.generate_refresh_token();
        let b = issuer.generate_refresh_token();
        assert_ne!(a, b);
        assert!(a.len() >= REFRESH_TOKEN_BYTES);
    }

    #[test]
    fn bearer_header_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc").unwrap(), "abc");
        assert!(extract_bearer_token("Token abc").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }
}
