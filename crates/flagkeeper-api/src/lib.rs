//! Flagkeeper API server
//!
//! REST admin API over [`flagkeeper_core`]: toggle creation and archive
//! lifecycle, name validation, stale marking and project health reports.
//!
//! ## Architecture
//!
//! 1. **Config** (`config`): Server settings from file, flags and environment.
//! 2. **Handlers** (`handlers`): Axum routes and response envelopes.
//! 3. **Metrics** (`metrics`): Prometheus gauges and counters.
//! 4. **Scheduler** (`scheduler`): Periodic project health recalculation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use flagkeeper_api::{build_state, create_router, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let state = build_state(&config).await?;
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod scheduler;

pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiJson};
pub use handlers::{create_router, ApiResponse, AppState, ErrorInfo, FeaturesResponse};
pub use metrics::FlagkeeperMetrics;
pub use scheduler::spawn_health_refresh;

use flagkeeper_core::{seed, FeatureTypeLifetimes, SeedData, Stores};
use std::sync::Arc;

/// Server version (from Cargo.toml)
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bootstrap in-memory stores from `config` and wire the application state
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let stores = Stores::in_memory();
    let seed_data = match &config.seed_file {
        Some(path) => Some(SeedData::from_file(path)?),
        None => None,
    };
    seed::bootstrap(&stores, seed_data).await?;

    let lifetimes = Arc::new(FeatureTypeLifetimes::new(
        stores.feature_types.clone(),
        config.lifetime_refresh_interval(),
    ));
    let metrics = FlagkeeperMetrics::new()?;

    Ok(Arc::new(AppState::new(stores, lifetimes, metrics)))
}
