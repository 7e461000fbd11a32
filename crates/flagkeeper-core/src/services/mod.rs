//! Domain services composed from injected stores

pub mod features;
pub mod health;

pub use features::{validate_name_format, FeatureToggleService, MAX_NAME_LENGTH};
pub use health::ProjectHealthService;
