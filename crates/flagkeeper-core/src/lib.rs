//! Flagkeeper core
//!
//! Domain logic for the Flagkeeper feature toggle service.
//!
//! ## Modules
//!
//! - [`model`] - Toggles, feature types, projects and health reports
//! - [`health`] - Pure health rating calculator
//! - [`lifetimes`] - Read-through cache of feature type lifetimes
//! - [`store`] - Storage contracts and in-memory implementations
//! - [`services`] - Toggle lifecycle and project health services
//! - [`seed`] - Default data and seed file loading
//!
//! ## Example
//!
//! ```rust,no_run
//! use flagkeeper_core::{
//!     seed, FeatureTypeLifetimes, ProjectHealthService, Stores,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let stores = Stores::in_memory();
//!     seed::bootstrap(&stores, None).await.unwrap();
//!
//!     let lifetimes = Arc::new(FeatureTypeLifetimes::new(
//!         stores.feature_types.clone(),
//!         Duration::from_secs(300),
//!     ));
//!     let health = ProjectHealthService::new(
//!         stores.projects.clone(),
//!         stores.toggles.clone(),
//!         lifetimes,
//!     );
//!
//!     let report = health.project_health_report("default").await.unwrap();
//!     println!("health: {}", report.health);
//! }
//! ```

pub mod error;
pub mod health;
pub mod lifetimes;
pub mod model;
pub mod seed;
pub mod services;
pub mod store;

pub use error::{Result, StoreError, StoreResult, ToggleError};
pub use health::{
    active_count, health_rating, potentially_stale_count, stale_count, summarize, LifetimeMap,
    MILLISECONDS_PER_DAY,
};
pub use lifetimes::{FeatureTypeLifetimes, DEFAULT_REFRESH_INTERVAL};
pub use model::{
    FeatureQuery, FeatureToggle, FeatureType, HealthCounts, HealthReport, NewFeature, Project,
    ToggleSummary, DEFAULT_FEATURE_TYPE, DEFAULT_PROJECT, PAYLOAD_VERSION,
};
pub use seed::{SeedData, SeedError};
pub use services::{FeatureToggleService, ProjectHealthService};
pub use store::{FeatureToggleStore, FeatureTypeStore, ProjectStore, Store, Stores};
