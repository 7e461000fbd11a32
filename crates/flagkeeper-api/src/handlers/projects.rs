//! Project routes
//!
//! - GET /api/admin/projects/:project_id/features - Live toggles of a project
//! - GET /api/admin/projects/:project_id/health-report - Health report

use axum::{
    extract::{Path, State},
    Json,
};
use flagkeeper_core::HealthReport;
use std::sync::Arc;

use super::{AppState, FeaturesResponse};
use crate::error::ApiError;

pub async fn list_features(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    let features = state.features.get_features_for_project(&project_id).await?;
    Ok(Json(FeaturesResponse::new(features)))
}

pub async fn health_report(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<HealthReport>, ApiError> {
    let report = match state.health.project_health_report(&project_id).await {
        Ok(report) => report,
        Err(e) => {
            state.metrics.record_health_report(false);
            return Err(e.into());
        }
    };

    state.metrics.record_health_report(true);
    state
        .metrics
        .observe_project_health(&project_id, &report.counts());
    Ok(Json(report))
}
