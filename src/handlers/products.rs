//! Product transport adapters

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{
    error::AppError,
    models::{ProductRequest, ProductResponse},
    Result,
};

pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    Ok(Json(state.products.get_all().await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>> {
    match state.products.get_by_id(id).await? {
        Some(product) => Ok(Json(product)),
        None => Err(AppError::not_found("Product")),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let created = state.products.create(&request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ProductResponse>> {
    Ok(Json(state.products.update(id, &request).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    if state.products.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Product"))
    }
}
