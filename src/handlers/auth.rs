//! Auth transport adapters

use crate::state::AppState;
use axum::{extract::State, Json};
use shared::{
    models::{
        LoginRequest, RefreshTokenRequest, RegisterRequest, TokenResponse, ValidateTokenRequest,
        ValidateTokenResponse,
    },
    Result,
};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth.register(&request).await?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth.login(&request).await?))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth.refresh_token(&request).await?))
}

pub async fn validate_token(
    State(state): State<AppState>,
    Json(request): Json<ValidateTokenRequest>,
) -> Json<ValidateTokenResponse> {
    Json(ValidateTokenResponse {
        is_valid: state.auth.validate_token(&request.token),
    })
}
