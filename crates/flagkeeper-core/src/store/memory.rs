//! In-memory store implementations
//!
//! Each store keeps a `HashMap` behind a `tokio::sync::RwLock`. Contents are
//! lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{FeatureToggleStore, FeatureTypeStore, ProjectStore, Store};
use crate::error::{StoreError, StoreResult};
use crate::model::{FeatureQuery, FeatureToggle, FeatureType, Project};

const TOGGLE: &str = "feature toggle";
const ARCHIVED_TOGGLE: &str = "archived feature toggle";
const FEATURE_TYPE: &str = "feature type";
const PROJECT: &str = "project";

/// Feature toggles keyed by name
#[derive(Debug, Default)]
pub struct InMemoryFeatureToggleStore {
    toggles: RwLock<HashMap<String, FeatureToggle>>,
}

impl InMemoryFeatureToggleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store<FeatureToggle, String> for InMemoryFeatureToggleStore {
    async fn get(&self, key: &String) -> StoreResult<FeatureToggle> {
        self.toggles
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(TOGGLE, key.as_str()))
    }

    async fn get_all(&self) -> StoreResult<Vec<FeatureToggle>> {
        let mut all: Vec<_> = self.toggles.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn exists(&self, key: &String) -> StoreResult<bool> {
        Ok(self.toggles.read().await.contains_key(key))
    }

    async fn delete(&self, key: &String) -> StoreResult<()> {
        self.toggles
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(TOGGLE, key.as_str()))
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.toggles.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl FeatureToggleStore for InMemoryFeatureToggleStore {
    async fn create(&self, toggle: FeatureToggle) -> StoreResult<FeatureToggle> {
        let mut toggles = self.toggles.write().await;
        if toggles.contains_key(&toggle.name) {
            return Err(StoreError::already_exists(TOGGLE, toggle.name));
        }
        toggles.insert(toggle.name.clone(), toggle.clone());
        Ok(toggle)
    }

    async fn get_features_by(&self, query: &FeatureQuery) -> StoreResult<Vec<FeatureToggle>> {
        let mut features: Vec<_> = self
            .toggles
            .read()
            .await
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        features.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(features)
    }

    async fn archive(&self, name: &str) -> StoreResult<FeatureToggle> {
        let mut toggles = self.toggles.write().await;
        match toggles.get_mut(name) {
            Some(toggle) if !toggle.archived => {
                toggle.archived = true;
                toggle.archived_at = Some(Utc::now());
                Ok(toggle.clone())
            }
            _ => Err(StoreError::not_found(TOGGLE, name)),
        }
    }

    async fn revive(&self, name: &str) -> StoreResult<FeatureToggle> {
        let mut toggles = self.toggles.write().await;
        match toggles.get_mut(name) {
            Some(toggle) if toggle.archived => {
                toggle.archived = false;
                toggle.archived_at = None;
                Ok(toggle.clone())
            }
            _ => Err(StoreError::not_found(TOGGLE, name)),
        }
    }

    async fn delete_archived(&self, name: &str) -> StoreResult<FeatureToggle> {
        let mut toggles = self.toggles.write().await;
        match toggles.get(name) {
            Some(toggle) if toggle.archived => toggles
                .remove(name)
                .ok_or_else(|| StoreError::not_found(ARCHIVED_TOGGLE, name)),
            _ => Err(StoreError::not_found(ARCHIVED_TOGGLE, name)),
        }
    }

    async fn set_stale(&self, name: &str, stale: bool) -> StoreResult<FeatureToggle> {
        let mut toggles = self.toggles.write().await;
        let toggle = toggles
            .get_mut(name)
            .ok_or_else(|| StoreError::not_found(TOGGLE, name))?;
        toggle.stale = stale;
        Ok(toggle.clone())
    }
}

/// Feature types keyed by id
#[derive(Debug, Default)]
pub struct InMemoryFeatureTypeStore {
    types: RwLock<HashMap<String, FeatureType>>,
}

impl InMemoryFeatureTypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: impl IntoIterator<Item = FeatureType>) -> Self {
        let types = types.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            types: RwLock::new(types),
        }
    }
}

#[async_trait]
impl Store<FeatureType, String> for InMemoryFeatureTypeStore {
    async fn get(&self, key: &String) -> StoreResult<FeatureType> {
        self.types
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(FEATURE_TYPE, key.as_str()))
    }

    async fn get_all(&self) -> StoreResult<Vec<FeatureType>> {
        let mut all: Vec<_> = self.types.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn delete(&self, key: &String) -> StoreResult<()> {
        self.types
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(FEATURE_TYPE, key.as_str()))
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.types.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl FeatureTypeStore for InMemoryFeatureTypeStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<FeatureType> {
        let types = self.types.read().await;
        // An id match wins over a display name; name ties go to the lowest id
        types
            .values()
            .find(|t| t.id.eq_ignore_ascii_case(name))
            .or_else(|| {
                types
                    .values()
                    .filter(|t| t.name.eq_ignore_ascii_case(name))
                    .min_by(|a, b| a.id.cmp(&b.id))
            })
            .cloned()
            .ok_or_else(|| StoreError::not_found(FEATURE_TYPE, name))
    }

    async fn upsert(&self, feature_type: FeatureType) -> StoreResult<()> {
        self.types
            .write()
            .await
            .insert(feature_type.id.clone(), feature_type);
        Ok(())
    }
}

/// Projects keyed by id
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<HashMap<String, Project>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store<Project, String> for InMemoryProjectStore {
    async fn get(&self, key: &String) -> StoreResult<Project> {
        self.projects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(PROJECT, key.as_str()))
    }

    async fn get_all(&self) -> StoreResult<Vec<Project>> {
        let mut all: Vec<_> = self.projects.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn delete(&self, key: &String) -> StoreResult<()> {
        self.projects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(PROJECT, key.as_str()))
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.projects.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create(&self, project: Project) -> StoreResult<Project> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id) {
            return Err(StoreError::already_exists(PROJECT, project.id));
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn set_health(&self, id: &str, health: i32) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(PROJECT, id))?;
        project.health = health;
        Ok(())
    }
}
