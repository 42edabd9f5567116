//! Promotion and metadata endpoints of the mock backend.

use std::sync::atomic::Ordering;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::errors::AppError;
use super::MockState;
use crate::models::{BackendPromotionPayload, Promotion, PromotionPatch, PromotionSummary};

/// GET /promotions - List all promotions.
pub async fn list_promotions(State(state): State<MockState>) -> Json<Vec<PromotionSummary>> {
    let promotions = state.store.list().await;
    Json(promotions.iter().map(Promotion::summary).collect())
}

/// GET /promotions/{id} - Get a single promotion.
pub async fn get_promotion(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<Json<Promotion>, AppError> {
    match state.store.get(&id).await {
        Some(promotion) => Ok(Json(promotion)),
        None => Err(AppError::NotFound(format!("Promotion {} not found", id))),
    }
}

/// POST /promotions - Create a new promotion.
pub async fn create_promotion(
    State(state): State<MockState>,
    body: Result<Json<BackendPromotionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Promotion>), AppError> {
    let Json(request) = body?;
    let promotion = state.store.create(request).await?;
    tracing::info!("Created promotion {} ({})", promotion.id, promotion.name);
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// PUT /promotions/{id} - Update a promotion.
pub async fn update_promotion(
    State(state): State<MockState>,
    Path(id): Path<String>,
    body: Result<Json<PromotionPatch>, JsonRejection>,
) -> Result<Json<Promotion>, AppError> {
    let Json(request) = body?;
    let promotion = state.store.update(&id, request).await?;
    tracing::info!("Updated promotion {}", id);
    Ok(Json(promotion))
}

/// DELETE /promotions/{id} - Delete a promotion.
pub async fn delete_promotion(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&id).await?;
    tracing::info!("Deleted promotion {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /promotions/metadata/conditions - Condition kinds on offer.
pub async fn condition_kinds(State(state): State<MockState>) -> Json<Vec<String>> {
    state.metadata_requests.fetch_add(1, Ordering::Relaxed);
    Json(state.kinds.conditions.clone())
}

/// GET /promotions/metadata/actions - Action kinds on offer.
pub async fn action_kinds(State(state): State<MockState>) -> Json<Vec<String>> {
    state.metadata_requests.fetch_add(1, Ordering::Relaxed);
    Json(state.kinds.actions.clone())
}
