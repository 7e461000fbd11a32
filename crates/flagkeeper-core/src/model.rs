//! Domain model for feature toggles, feature types, projects and health reports
//!
//! All types serialize with camelCase field names, matching the admin API wire
//! format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project every toggle lands in when none is given
pub const DEFAULT_PROJECT: &str = "default";

/// Feature type assigned when a toggle is created without one
pub const DEFAULT_FEATURE_TYPE: &str = "release";

/// Version tag carried by list and report payloads
pub const PAYLOAD_VERSION: u32 = 1;

/// A named boolean switch controlling feature exposure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureToggle {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default = "default_feature_type")]
    pub feature_type: String,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl FeatureToggle {
    pub fn new(name: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            feature_type: DEFAULT_FEATURE_TYPE.to_string(),
            project: project.into(),
            enabled: false,
            stale: false,
            archived: false,
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    pub fn with_type(mut self, feature_type: impl Into<String>) -> Self {
        self.feature_type = feature_type.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_stale(mut self, stale: bool) -> Self {
        self.stale = stale;
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self.archived_at = Some(Utc::now());
        self
    }

    /// The subset of fields the health calculator needs
    pub fn summary(&self) -> ToggleSummary {
        ToggleSummary {
            created_at: self.created_at,
            stale: self.stale,
            feature_type: self.feature_type.clone(),
        }
    }
}

fn default_feature_type() -> String {
    DEFAULT_FEATURE_TYPE.to_string()
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

/// Read-only view of a toggle used when computing health
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSummary {
    pub created_at: DateTime<Utc>,
    pub stale: bool,
    #[serde(rename = "type")]
    pub feature_type: String,
}

/// Toggle category with an expected lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Days after which a toggle of this type is potentially stale.
    /// `None` marks a permanent type.
    #[serde(default)]
    pub lifetime_days: Option<u32>,
}

impl FeatureType {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        lifetime_days: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            lifetime_days,
        }
    }
}

/// A group of toggles owned by one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Last persisted health rating
    #[serde(default = "full_health")]
    pub health: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            health: full_health(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn full_health() -> i32 {
    100
}

/// Input for creating a toggle inside a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeature {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub feature_type: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub archived: bool,
}

impl NewFeature {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Filter used by `FeatureToggleStore::get_features_by`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureQuery {
    pub project: Option<String>,
    pub archived: Option<bool>,
    pub stale: Option<bool>,
}

impl FeatureQuery {
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Default::default()
        }
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn stale(mut self, stale: bool) -> Self {
        self.stale = Some(stale);
        self
    }

    pub fn matches(&self, toggle: &FeatureToggle) -> bool {
        self.project.as_deref().map_or(true, |p| p == toggle.project)
            && self.archived.map_or(true, |a| a == toggle.archived)
            && self.stale.map_or(true, |s| s == toggle.stale)
    }
}

/// Counts and rating produced for one feature set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCounts {
    pub total_count: usize,
    pub active_count: usize,
    pub stale_count: usize,
    pub potentially_stale_count: usize,
    pub health: i32,
}

/// Per-project health report, recomputed on every request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub name: String,
    pub description: String,
    pub features: Vec<FeatureToggle>,
    pub members: usize,
    pub version: u32,
    pub health: i32,
    pub total_count: usize,
    pub active_count: usize,
    pub stale_count: usize,
    pub potentially_stale_count: usize,
}

impl HealthReport {
    pub fn new(project: &Project, features: Vec<FeatureToggle>, counts: HealthCounts) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            features,
            members: 1,
            version: PAYLOAD_VERSION,
            health: counts.health,
            total_count: counts.total_count,
            active_count: counts.active_count,
            stale_count: counts.stale_count,
            potentially_stale_count: counts.potentially_stale_count,
        }
    }

    pub fn counts(&self) -> HealthCounts {
        HealthCounts {
            total_count: self.total_count,
            active_count: self.active_count,
            stale_count: self.stale_count,
            potentially_stale_count: self.potentially_stale_count,
            health: self.health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_wire_format() {
        let toggle = FeatureToggle::new("checkout.v2", DEFAULT_PROJECT).with_type("experiment");
        let json = serde_json::to_value(&toggle).unwrap();

        assert_eq!(json["name"], "checkout.v2");
        assert_eq!(json["type"], "experiment");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("archivedAt").is_none());
    }

    #[test]
    fn test_new_feature_defaults() {
        let feature: NewFeature = serde_json::from_str(r#"{"name": "ts.really.delete", "archived": true}"#).unwrap();
        assert_eq!(feature.name, "ts.really.delete");
        assert!(feature.archived);
        assert!(feature.feature_type.is_none());
        assert!(!feature.stale);
    }

    #[test]
    fn test_feature_query_matches() {
        let toggle = FeatureToggle::new("a", "web").archived();

        assert!(FeatureQuery::default().matches(&toggle));
        assert!(FeatureQuery::project("web").archived(true).matches(&toggle));
        assert!(!FeatureQuery::project("web").archived(false).matches(&toggle));
        assert!(!FeatureQuery::project("mobile").matches(&toggle));
        assert!(!FeatureQuery::default().stale(true).matches(&toggle));
    }

    #[test]
    fn test_summary_carries_type() {
        let toggle = FeatureToggle::new("a", "web").with_type("operational").with_stale(true);
        let summary = toggle.summary();
        assert_eq!(summary.feature_type, "operational");
        assert!(summary.stale);
        assert_eq!(summary.created_at, toggle.created_at);
    }
}
