//! Project health service
//!
//! Reads a project's live toggles, resolves type lifetimes through the
//! injected cache and applies the calculator in [`crate::health`].

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{Result, ToggleError};
use crate::health;
use crate::lifetimes::FeatureTypeLifetimes;
use crate::model::{FeatureQuery, FeatureToggle, HealthCounts, HealthReport, Project, ToggleSummary};
use crate::store::{FeatureToggleStore, ProjectStore, Store};

pub struct ProjectHealthService {
    projects: Arc<dyn ProjectStore>,
    toggles: Arc<dyn FeatureToggleStore>,
    lifetimes: Arc<FeatureTypeLifetimes>,
}

impl ProjectHealthService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        toggles: Arc<dyn FeatureToggleStore>,
        lifetimes: Arc<FeatureTypeLifetimes>,
    ) -> Self {
        Self {
            projects,
            toggles,
            lifetimes,
        }
    }

    pub async fn project_health_report(&self, project_id: &str) -> Result<HealthReport> {
        self.project_health_report_at(project_id, Utc::now()).await
    }

    /// Health report for a project as of `now`
    pub async fn project_health_report_at(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HealthReport> {
        let project = self.projects.get(&project_id.to_string()).await?;
        let features = self.live_features(&project.id).await?;
        let counts = self.counts(&features, now).await?;

        tracing::debug!(
            project = %project.id,
            health = counts.health,
            potentially_stale = counts.potentially_stale_count,
            "Computed project health report"
        );
        Ok(HealthReport::new(&project, features, counts))
    }

    /// Rating for one project, without building the full report
    pub async fn calculate_health_rating(&self, project: &Project) -> Result<i32> {
        let features = self.live_features(&project.id).await?;
        Ok(self.counts(&features, Utc::now()).await?.health)
    }

    /// Recompute and persist the rating of every project.
    ///
    /// Returns the counts of each project that was updated. A project whose
    /// toggles reference an unknown type is skipped and logged.
    pub async fn refresh_all_project_health(&self) -> Result<Vec<(String, HealthCounts)>> {
        let now = Utc::now();
        let mut updated = Vec::new();

        for project in self.projects.get_all().await? {
            let features = self.live_features(&project.id).await?;
            let counts = match self.counts(&features, now).await {
                Ok(counts) => counts,
                Err(e @ ToggleError::UnknownFeatureType(_)) => {
                    tracing::warn!(project = %project.id, error = %e, "Skipping project health update");
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.projects.set_health(&project.id, counts.health).await?;
            updated.push((project.id, counts));
        }

        tracing::info!(projects = updated.len(), "Refreshed project health ratings");
        Ok(updated)
    }

    async fn live_features(&self, project_id: &str) -> Result<Vec<FeatureToggle>> {
        Ok(self
            .toggles
            .get_features_by(&FeatureQuery::project(project_id).archived(false))
            .await?)
    }

    async fn counts(&self, features: &[FeatureToggle], now: DateTime<Utc>) -> Result<HealthCounts> {
        let lifetimes = self.lifetimes.get().await?;
        let summaries: Vec<ToggleSummary> = features.iter().map(FeatureToggle::summary).collect();
        health::summarize(&summaries, &lifetimes, now)
    }
}
