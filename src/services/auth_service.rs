//! Session management: registration, login, refresh-token rotation
//!
//! Refresh tokens are single-use: every successful login or refresh replaces
//! the stored token, so an already-exchanged token can never be exchanged
//! again. Credential failures stay opaque; the caller never learns which
//! check failed.

use chrono::Duration;
use shared::{
    clock::Clock,
    config::AuthConfig,
    error::AppError,
    models::{LoginRequest, NewUser, RefreshTokenRequest, RegisterRequest, TokenResponse, User},
    password::PasswordHasher,
    store::UserStore,
    token::TokenIssuer,
    Result,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
const DEFAULT_ROLE: &str = "User";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    issuer: Arc<TokenIssuer>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
    refresh_token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        issuer: Arc<TokenIssuer>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            issuer,
            hasher,
            clock,
            refresh_token_ttl: Duration::days(config.refresh_token_ttl_days),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse> {
        request.validate()?;

        // Username first, then email; the first violation wins.
        if self.users.username_exists(&request.username).await? {
            return Err(AppError::conflict("Username already exists"));
        }
        if self.users.email_exists(&request.email).await? {
            return Err(AppError::conflict("Email already exists"));
        }

        let user = self
            .users
            .create(NewUser {
                username: request.username.clone(),
                email: request.email.clone(),
                password_hash: self.hasher.hash(&request.password)?,
                role: DEFAULT_ROLE.to_string(),
                refresh_token: Some(self.issuer.generate_refresh_token()),
                refresh_token_expiry: Some(self.clock.now() + self.refresh_token_ttl),
            })
            .await?;

        info!(user_id = user.id, "User registered");
        self.token_response(&user)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse> {
        request.validate()?;

        // Unknown username and wrong password produce the identical failure.
        let user = self
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(&request.password, &user.password_hash)? {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        // Rotate even on plain login; the previous token is discarded.
        let user = self.rotate_refresh_token(user).await?;

        info!(user_id = user.id, "User logged in");
        self.token_response(&user)
    }

    pub async fn refresh_token(&self, request: &RefreshTokenRequest) -> Result<TokenResponse> {
        request.validate()?;

        // Missing owner and expired token collapse to one failure kind.
        let user = self
            .users
            .get_by_refresh_token(&request.refresh_token)
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_REFRESH_TOKEN))?;

        let expired = user
            .refresh_token_expiry
            .map_or(true, |expiry| expiry < self.clock.now());
        if expired {
            return Err(AppError::authentication(INVALID_REFRESH_TOKEN));
        }

        // Unconditional replacement: a used refresh token is never valid
        // again.
        let user = self.rotate_refresh_token(user).await?;

        info!(user_id = user.id, "Refresh token exchanged");
        self.token_response(&user)
    }

    pub fn validate_token(&self, token: &str) -> bool {
        self.issuer.validate_token(token)
    }

    async fn rotate_refresh_token(&self, mut user: User) -> Result<User> {
        user.refresh_token = Some(self.issuer.generate_refresh_token());
        user.refresh_token_expiry = Some(self.clock.now() + self.refresh_token_ttl);
        self.users.update(&user).await
    }

    fn token_response(&self, user: &User) -> Result<TokenResponse> {
        let refresh_token = user
            .refresh_token
            .clone()
            .ok_or_else(|| AppError::internal("User has no refresh token after issuance"))?;

        Ok(TokenResponse {
            access_token: self.issuer.generate_access_token(user)?,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_at: self.clock.now() + self.issuer.access_token_ttl(),
        })
    }
}
