//! Archive routes
//!
//! - GET /api/admin/archive/features - All archived toggles
//! - GET /api/admin/archive/features/:project_id - Archived toggles of one project
//! - DELETE /api/admin/archive/:name - Permanently delete an archived toggle
//! - POST /api/admin/archive/revive/:name - Bring an archived toggle back

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{AppState, FeaturesResponse};
use crate::error::ApiError;

pub async fn list_archived(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    let features = state.features.get_archived_features().await?;
    Ok(Json(FeaturesResponse::new(features)))
}

pub async fn list_archived_for_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    let features = state
        .features
        .get_archived_features_for_project(&project_id)
        .await?;
    Ok(Json(FeaturesResponse::new(features)))
}

pub async fn delete_feature(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = state.features.delete_feature(&name).await;
    state
        .metrics
        .record_archive_operation("delete", result.is_ok());
    result?;
    Ok(StatusCode::OK)
}

/// Revive ignores the request body; clients may send `{}`
pub async fn revive_feature(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = state.features.revive_feature(&name).await;
    state
        .metrics
        .record_archive_operation("revive", result.is_ok());
    result?;
    Ok(StatusCode::OK)
}
