//! Bootstrap data
//!
//! Every instance starts with the default project and the built-in feature
//! types. Extra projects, types and toggles can be loaded from a YAML or JSON
//! seed file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::error::{StoreError, ToggleError};
use crate::model::{FeatureToggle, FeatureType, Project, DEFAULT_PROJECT};
use crate::services::validate_name_format;
use crate::store::{FeatureToggleStore, FeatureTypeStore, ProjectStore, Store, Stores};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(String),

    #[error("Failed to apply seed data: {0}")]
    Apply(#[from] ToggleError),
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::Parse(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for SeedError {
    fn from(err: serde_yaml::Error) -> Self {
        SeedError::Parse(format!("YAML error: {}", err))
    }
}

impl From<StoreError> for SeedError {
    fn from(err: StoreError) -> Self {
        SeedError::Apply(err.into())
    }
}

/// Built-in feature types and their expected lifetimes
pub fn default_feature_types() -> Vec<FeatureType> {
    vec![
        FeatureType::new(
            "release",
            "Release",
            "Enable trunk-based development and continuous delivery",
            Some(40),
        ),
        FeatureType::new(
            "experiment",
            "Experiment",
            "Used to perform multivariate or A/B testing",
            Some(40),
        ),
        FeatureType::new(
            "operational",
            "Operational",
            "Used to control operational aspects of the system behavior",
            Some(7),
        ),
        FeatureType::new(
            "kill-switch",
            "Kill switch",
            "Used to gracefully degrade system functionality",
            None,
        ),
        FeatureType::new(
            "permission",
            "Permission",
            "Used to change the features or product experience that certain users receive",
            None,
        ),
    ]
}

/// Contents of a seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub feature_types: Vec<FeatureType>,
    #[serde(default)]
    pub features: Vec<FeatureToggle>,
}

impl SeedData {
    /// Load from a `.yaml`/`.yml` or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Insert the seed into `stores`. Existing projects are kept; feature
    /// types are replaced; toggles must be new.
    ///
    /// Toggle names must be well formed and their project must exist. A type
    /// given by display name is stored as its id. An unknown type is kept as
    /// written and surfaces later as a configuration error in health reports.
    pub async fn apply(self, stores: &Stores) -> Result<(), SeedError> {
        for project in self.projects {
            if !stores.projects.exists(&project.id).await? {
                stores.projects.create(project).await?;
            }
        }
        for feature_type in self.feature_types {
            stores.feature_types.upsert(feature_type).await?;
        }
        for mut toggle in self.features {
            validate_name_format(&toggle.name)?;
            if !stores.projects.exists(&toggle.project).await? {
                return Err(ToggleError::not_found("project", &toggle.project).into());
            }
            match stores.feature_types.get_by_name(&toggle.feature_type).await {
                Ok(feature_type) => toggle.feature_type = feature_type.id,
                Err(StoreError::NotFound { .. }) => {
                    tracing::warn!(
                        feature = %toggle.name,
                        feature_type = %toggle.feature_type,
                        "Seeded toggle references an unknown feature type"
                    );
                }
                Err(e) => return Err(e.into()),
            }
            stores.toggles.create(toggle).await?;
        }
        Ok(())
    }
}

/// Ensure the default project and built-in types exist, then apply `seed`
pub async fn bootstrap(stores: &Stores, seed: Option<SeedData>) -> Result<(), SeedError> {
    let key = DEFAULT_PROJECT.to_string();
    if !stores.projects.exists(&key).await? {
        stores
            .projects
            .create(Project::new(DEFAULT_PROJECT, "Default").with_description("Default project"))
            .await?;
    }

    for feature_type in default_feature_types() {
        if !stores.feature_types.exists(&feature_type.id).await? {
            stores.feature_types.upsert(feature_type).await?;
        }
    }

    if let Some(seed) = seed {
        let counts = (seed.projects.len(), seed.feature_types.len(), seed.features.len());
        seed.apply(stores).await?;
        tracing::info!(
            projects = counts.0,
            feature_types = counts.1,
            features = counts.2,
            "Applied seed data"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureQuery;
    use std::io::Write;

    const SEED_YAML: &str = r#"
projects:
  - id: web
    name: Web
featureTypes:
  - id: rollout
    name: Rollout
    lifetimeDays: 14
features:
  - name: checkout.v2
    project: web
    type: rollout
    createdAt: "2024-01-01T00:00:00Z"
  - name: legacy.banner
    archived: true
"#;

    #[tokio::test]
    async fn test_bootstrap_defaults() {
        let stores = Stores::in_memory();
        bootstrap(&stores, None).await.unwrap();
        // Idempotent
        bootstrap(&stores, None).await.unwrap();

        assert!(stores.projects.exists(&DEFAULT_PROJECT.to_string()).await.unwrap());
        assert_eq!(stores.feature_types.get_all().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_load_and_apply_yaml_seed() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(SEED_YAML.as_bytes()).unwrap();

        let seed = SeedData::from_file(file.path()).unwrap();
        assert_eq!(seed.features.len(), 2);
        assert_eq!(seed.features[1].project, DEFAULT_PROJECT);

        let stores = Stores::in_memory();
        bootstrap(&stores, Some(seed)).await.unwrap();

        let rollout = stores.feature_types.get(&"rollout".to_string()).await.unwrap();
        assert_eq!(rollout.lifetime_days, Some(14));

        let web = stores
            .toggles
            .get_features_by(&FeatureQuery::project("web"))
            .await
            .unwrap();
        assert_eq!(web.len(), 1);
        assert_eq!(web[0].feature_type, "rollout");

        let archived = stores
            .toggles
            .get_features_by(&FeatureQuery::default().archived(true))
            .await
            .unwrap();
        assert_eq!(archived[0].name, "legacy.banner");
    }

    #[tokio::test]
    async fn test_seed_resolves_type_display_names() {
        let stores = Stores::in_memory();
        let seed = SeedData {
            features: vec![FeatureToggle::new("panic.button", DEFAULT_PROJECT).with_type("Kill switch")],
            ..SeedData::default()
        };
        bootstrap(&stores, Some(seed)).await.unwrap();

        let toggle = stores.toggles.get(&"panic.button".to_string()).await.unwrap();
        assert_eq!(toggle.feature_type, "kill-switch");
    }

    #[tokio::test]
    async fn test_seed_rejects_invalid_toggles() {
        let stores = Stores::in_memory();
        bootstrap(&stores, None).await.unwrap();

        let missing_project = SeedData {
            features: vec![FeatureToggle::new("orphan", "nowhere")],
            ..SeedData::default()
        };
        assert!(matches!(
            missing_project.apply(&stores).await.unwrap_err(),
            SeedError::Apply(ToggleError::NotFound { entity: "project", .. })
        ));

        let bad_name = SeedData {
            features: vec![FeatureToggle::new("has space", DEFAULT_PROJECT)],
            ..SeedData::default()
        };
        assert!(matches!(
            bad_name.apply(&stores).await.unwrap_err(),
            SeedError::Apply(ToggleError::InvalidName { .. })
        ));

        assert!(!stores.toggles.exists(&"orphan".to_string()).await.unwrap());
        assert!(!stores.toggles.exists(&"has space".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_keeps_unknown_feature_type() {
        let stores = Stores::in_memory();
        let seed = SeedData {
            features: vec![FeatureToggle::new("mystery.toggle", DEFAULT_PROJECT).with_type("mystery")],
            ..SeedData::default()
        };
        bootstrap(&stores, Some(seed)).await.unwrap();

        let toggle = stores.toggles.get(&"mystery.toggle".to_string()).await.unwrap();
        assert_eq!(toggle.feature_type, "mystery");
    }

    #[test]
    fn test_json_seed_and_parse_errors() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"features": [{"name": "a"}]}"#).unwrap();
        let seed = SeedData::from_file(file.path()).unwrap();
        assert_eq!(seed.features[0].feature_type, "release");

        let mut bad = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        bad.write_all(b"not json").unwrap();
        assert!(matches!(
            SeedData::from_file(bad.path()).unwrap_err(),
            SeedError::Parse(_)
        ));

        assert!(matches!(
            SeedData::from_file("/nonexistent/seed.yaml").unwrap_err(),
            SeedError::Io(_)
        ));
    }
}
