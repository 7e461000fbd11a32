//! Toggle lifecycle routes
//!
//! - POST /api/admin/projects/:project_id/features - Create a toggle (201)
//! - DELETE /api/admin/projects/:project_id/features/:name - Archive a toggle (202)
//! - POST /api/admin/features/validate - Check that a name is free (200 / 409)
//! - POST /api/admin/features/:name/stale/on|off - Mark or unmark stale

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use flagkeeper_core::{FeatureToggle, NewFeature};
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Deserialize)]
pub struct ValidateNameRequest {
    #[serde(default)]
    pub name: String,
}

pub async fn create_feature(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    ApiJson(request): ApiJson<NewFeature>,
) -> Result<(StatusCode, Json<FeatureToggle>), ApiError> {
    let toggle = state.features.create_feature(&project_id, request).await?;
    Ok((StatusCode::CREATED, Json(toggle)))
}

pub async fn archive_feature(
    State(state): State<Arc<AppState>>,
    Path((project_id, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let result = state
        .features
        .archive_project_feature(&project_id, &name)
        .await;
    state
        .metrics
        .record_archive_operation("archive", result.is_ok());
    result?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn validate_name(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ValidateNameRequest>,
) -> Result<StatusCode, ApiError> {
    state.features.validate_name(&request.name).await?;
    Ok(StatusCode::OK)
}

pub async fn mark_stale(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<FeatureToggle>, ApiError> {
    Ok(Json(state.features.set_stale(&name, true).await?))
}

pub async fn unmark_stale(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<FeatureToggle>, ApiError> {
    Ok(Json(state.features.set_stale(&name, false).await?))
}
