//! Service routes
//!
//! - GET /health - Service health
//! - GET /metrics - Prometheus metrics
//! - GET /api/admin/feature-types - Configured feature types
//! - PUT /api/admin/feature-types/:id/lifetime - Change a type's expected lifetime

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use flagkeeper_core::{FeatureType, FeatureTypeStore, Store, ToggleError, PAYLOAD_VERSION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureTypesResponse {
    pub version: u32,
    pub types: Vec<FeatureType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLifetimeRequest {
    /// `null` makes the type permanent
    pub lifetime_days: Option<u32>,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::InternalError(format!("Failed to render metrics: {}", e)))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

pub async fn list_feature_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeatureTypesResponse>, ApiError> {
    let types = state
        .stores
        .feature_types
        .get_all()
        .await
        .map_err(ToggleError::from)?;
    Ok(Json(FeatureTypesResponse {
        version: PAYLOAD_VERSION,
        types,
    }))
}

/// Update the lifetime and drop the cached lifetime snapshot so the next
/// health report sees the new value
pub async fn update_lifetime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateLifetimeRequest>,
) -> Result<Json<FeatureType>, ApiError> {
    let store = &state.stores.feature_types;
    let mut feature_type = store.get(&id).await.map_err(ToggleError::from)?;
    feature_type.lifetime_days = request.lifetime_days;
    store
        .upsert(feature_type.clone())
        .await
        .map_err(ToggleError::from)?;

    state.lifetimes.invalidate().await;
    tracing::info!(
        feature_type = %id,
        lifetime_days = ?request.lifetime_days,
        "Updated feature type lifetime"
    );
    Ok(Json(feature_type))
}
