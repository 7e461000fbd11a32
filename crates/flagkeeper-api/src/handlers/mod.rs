//! HTTP handlers for the Flagkeeper admin API
//!
//! ## Routes
//!
//! - `archive`: list, permanently delete and revive archived toggles
//! - `features`: create, validate, archive and mark toggles stale
//! - `projects`: project toggle listing and health reports
//! - `system`: service health, metrics and feature types
//!
//! Successful responses use the admin wire format (camelCase, `version` +
//! collection at the top level). Failures use the [`ApiResponse`] envelope.

pub mod archive;
pub mod features;
pub mod projects;
pub mod system;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use flagkeeper_core::{
    FeatureToggle, FeatureToggleService, FeatureTypeLifetimes, ProjectHealthService, Stores,
    PAYLOAD_VERSION,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::metrics::FlagkeeperMetrics;

/// Application state shared across all routes
pub struct AppState {
    pub stores: Stores,
    pub features: FeatureToggleService,
    pub health: Arc<ProjectHealthService>,
    pub lifetimes: Arc<FeatureTypeLifetimes>,
    pub metrics: FlagkeeperMetrics,
    pub start_time: Instant,
}

impl AppState {
    /// Wire services on top of `stores`
    pub fn new(
        stores: Stores,
        lifetimes: Arc<FeatureTypeLifetimes>,
        metrics: FlagkeeperMetrics,
    ) -> Self {
        let features = FeatureToggleService::new(
            stores.projects.clone(),
            stores.toggles.clone(),
            stores.feature_types.clone(),
        );
        let health = Arc::new(ProjectHealthService::new(
            stores.projects.clone(),
            stores.toggles.clone(),
            Arc::clone(&lifetimes),
        ));

        Self {
            stores,
            features,
            health,
            lifetimes,
            metrics,
            start_time: Instant::now(),
        }
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Service endpoints
        .route("/health", get(system::health_check))
        .route("/metrics", get(system::metrics))
        .route("/api/admin/feature-types", get(system::list_feature_types))
        .route(
            "/api/admin/feature-types/:id/lifetime",
            put(system::update_lifetime),
        )
        // Toggle lifecycle
        .route(
            "/api/admin/projects/:project_id/features",
            get(projects::list_features).post(features::create_feature),
        )
        .route(
            "/api/admin/projects/:project_id/features/:name",
            delete(features::archive_feature),
        )
        .route("/api/admin/features/validate", post(features::validate_name))
        .route("/api/admin/features/:name/stale/on", post(features::mark_stale))
        .route("/api/admin/features/:name/stale/off", post(features::unmark_stale))
        // Health
        .route(
            "/api/admin/projects/:project_id/health-report",
            get(projects::health_report),
        )
        // Archive
        .route("/api/admin/archive/features", get(archive::list_archived))
        .route(
            "/api/admin/archive/features/:project_id",
            get(archive::list_archived_for_project),
        )
        .route("/api/admin/archive/:name", delete(archive::delete_feature))
        .route("/api/admin/archive/revive/:name", post(archive::revive_feature))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Versioned toggle list payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesResponse {
    pub version: u32,
    pub features: Vec<FeatureToggle>,
}

impl FeaturesResponse {
    pub fn new(features: Vec<FeatureToggle>) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            features,
        }
    }
}

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub metadata: ResponseMetadata,
}

impl<T> ApiResponse<T> {
    pub fn error(error: ErrorInfo, request_id: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
            metadata: ResponseMetadata::new(request_id),
        }
    }
}

/// Error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Response metadata for tracing and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub request_id: String,
    /// ISO 8601
    pub timestamp: String,
    pub version: String,
}

impl ResponseMetadata {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
