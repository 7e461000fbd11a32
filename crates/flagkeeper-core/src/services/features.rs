//! Feature toggle lifecycle: create, validate, archive, revive, delete
//!
//! Archived toggles keep their name reserved until they are permanently
//! deleted from the archive.

use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::error::{Result, ToggleError};
use crate::model::{FeatureQuery, FeatureToggle, NewFeature, DEFAULT_FEATURE_TYPE};
use crate::store::{FeatureToggleStore, FeatureTypeStore, ProjectStore, Store};

/// Longest accepted toggle name
pub const MAX_NAME_LENGTH: usize = 100;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\-._~]+$").expect("valid name pattern"))
}

/// Check that a name is URL-friendly, without looking at the store
pub fn validate_name_format(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ToggleError::invalid_name(name, "name is required"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ToggleError::invalid_name(
            name,
            format!("name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }
    if name == "." || name == ".." {
        return Err(ToggleError::invalid_name(name, "name must not be a path segment"));
    }
    if !name_pattern().is_match(name) {
        return Err(ToggleError::invalid_name(name, "name must be URL-friendly"));
    }
    Ok(())
}

pub struct FeatureToggleService {
    projects: Arc<dyn ProjectStore>,
    toggles: Arc<dyn FeatureToggleStore>,
    types: Arc<dyn FeatureTypeStore>,
}

impl FeatureToggleService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        toggles: Arc<dyn FeatureToggleStore>,
        types: Arc<dyn FeatureTypeStore>,
    ) -> Self {
        Self {
            projects,
            toggles,
            types,
        }
    }

    /// Check that `name` is well formed and not taken by any toggle, archived or not
    pub async fn validate_name(&self, name: &str) -> Result<()> {
        validate_name_format(name)?;
        if self.toggles.exists(&name.to_string()).await? {
            return Err(ToggleError::NameConflict(name.to_string()));
        }
        Ok(())
    }

    pub async fn create_feature(&self, project_id: &str, new: NewFeature) -> Result<FeatureToggle> {
        self.validate_name(&new.name).await?;
        if !self.projects.exists(&project_id.to_string()).await? {
            return Err(ToggleError::not_found("project", project_id));
        }

        let type_name = new
            .feature_type
            .unwrap_or_else(|| DEFAULT_FEATURE_TYPE.to_string());
        let feature_type = self.types.get_by_name(&type_name).await?;

        let mut toggle = FeatureToggle::new(new.name, project_id).with_type(feature_type.id);
        toggle.description = new.description;
        toggle.enabled = new.enabled;
        toggle.stale = new.stale;
        if new.archived {
            toggle = toggle.archived();
        }

        let toggle = self.toggles.create(toggle).await?;
        tracing::info!(
            feature = %toggle.name,
            project = %toggle.project,
            archived = toggle.archived,
            "Created feature toggle"
        );
        Ok(toggle)
    }

    /// Live toggles of a project
    pub async fn get_features_for_project(&self, project_id: &str) -> Result<Vec<FeatureToggle>> {
        if !self.projects.exists(&project_id.to_string()).await? {
            return Err(ToggleError::not_found("project", project_id));
        }
        Ok(self
            .toggles
            .get_features_by(&FeatureQuery::project(project_id).archived(false))
            .await?)
    }

    pub async fn get_archived_features(&self) -> Result<Vec<FeatureToggle>> {
        Ok(self
            .toggles
            .get_features_by(&FeatureQuery::default().archived(true))
            .await?)
    }

    pub async fn get_archived_features_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<FeatureToggle>> {
        Ok(self
            .toggles
            .get_features_by(&FeatureQuery::project(project_id).archived(true))
            .await?)
    }

    pub async fn archive_feature(&self, name: &str) -> Result<FeatureToggle> {
        let toggle = self.toggles.archive(name).await?;
        tracing::info!(feature = %name, project = %toggle.project, "Archived feature toggle");
        Ok(toggle)
    }

    /// Archive `name` only if it is a live toggle of `project_id`
    pub async fn archive_project_feature(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<FeatureToggle> {
        let toggle = self.toggles.get(&name.to_string()).await?;
        if toggle.project != project_id {
            return Err(ToggleError::not_found("feature toggle", name));
        }
        self.archive_feature(name).await
    }

    pub async fn revive_feature(&self, name: &str) -> Result<FeatureToggle> {
        let toggle = self.toggles.revive(name).await?;
        tracing::info!(feature = %name, project = %toggle.project, "Revived feature toggle");
        Ok(toggle)
    }

    /// Permanently remove an archived toggle, freeing its name
    pub async fn delete_feature(&self, name: &str) -> Result<()> {
        let toggle = self.toggles.delete_archived(name).await?;
        tracing::info!(feature = %name, project = %toggle.project, "Deleted archived feature toggle");
        Ok(())
    }

    pub async fn set_stale(&self, name: &str, stale: bool) -> Result<FeatureToggle> {
        let toggle = self.toggles.set_stale(name, stale).await?;
        tracing::info!(feature = %name, stale, "Updated stale flag");
        Ok(toggle)
    }
}
