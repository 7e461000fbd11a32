//! Storage contracts
//!
//! Every store implements the generic [`Store`] contract keyed by a string id,
//! plus the operations specific to its entity. Implementations must be
//! thread-safe; services hold them as `Arc<dyn ...>`.
//!
//! # Error Handling
//!
//! Missing keys are reported as [`StoreError::NotFound`] and duplicate
//! inserts as [`StoreError::AlreadyExists`]. Anything else is a backend
//! failure and propagates to the caller unchanged.
//!
//! [`StoreError::NotFound`]: crate::error::StoreError::NotFound
//! [`StoreError::AlreadyExists`]: crate::error::StoreError::AlreadyExists

pub mod memory;

pub use memory::{InMemoryFeatureToggleStore, InMemoryFeatureTypeStore, InMemoryProjectStore};

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::model::{FeatureQuery, FeatureToggle, FeatureType, Project};

/// Generic keyed store
#[async_trait]
pub trait Store<T, K>: Send + Sync
where
    T: Send + Sync,
    K: Send + Sync,
{
    /// Fetch one entry, or `NotFound`
    async fn get(&self, key: &K) -> StoreResult<T>;

    /// Fetch every entry
    async fn get_all(&self) -> StoreResult<Vec<T>>;

    /// Check whether the key is present without fetching it
    ///
    /// Default implementation fetches and maps `NotFound` to `false`.
    async fn exists(&self, key: &K) -> StoreResult<bool> {
        match self.get(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove one entry, or `NotFound`
    async fn delete(&self, key: &K) -> StoreResult<()>;

    /// Remove every entry
    async fn delete_all(&self) -> StoreResult<()>;

    /// Release any resources held by the store
    fn destroy(&self) {}
}

/// Storage for feature toggles, keyed by toggle name
#[async_trait]
pub trait FeatureToggleStore: Store<FeatureToggle, String> {
    /// Insert a new toggle; names are unique across archived and live toggles
    async fn create(&self, toggle: FeatureToggle) -> StoreResult<FeatureToggle>;

    async fn get_features_by(&self, query: &FeatureQuery) -> StoreResult<Vec<FeatureToggle>>;

    /// Mark a live toggle archived
    async fn archive(&self, name: &str) -> StoreResult<FeatureToggle>;

    /// Bring an archived toggle back
    async fn revive(&self, name: &str) -> StoreResult<FeatureToggle>;

    /// Permanently remove a toggle only if it is archived
    async fn delete_archived(&self, name: &str) -> StoreResult<FeatureToggle>;

    async fn set_stale(&self, name: &str, stale: bool) -> StoreResult<FeatureToggle>;
}

/// Storage for feature types, keyed by type id
#[async_trait]
pub trait FeatureTypeStore: Store<FeatureType, String> {
    /// Look a type up by display name, ignoring case
    async fn get_by_name(&self, name: &str) -> StoreResult<FeatureType>;

    /// Insert or replace a type
    async fn upsert(&self, feature_type: FeatureType) -> StoreResult<()>;
}

/// Storage for projects, keyed by project id
#[async_trait]
pub trait ProjectStore: Store<Project, String> {
    async fn create(&self, project: Project) -> StoreResult<Project>;

    /// Persist the latest computed health rating
    async fn set_health(&self, id: &str, health: i32) -> StoreResult<()>;
}

/// The set of stores a Flagkeeper instance runs on
#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn ProjectStore>,
    pub toggles: Arc<dyn FeatureToggleStore>,
    pub feature_types: Arc<dyn FeatureTypeStore>,
}

impl Stores {
    /// Empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            projects: Arc::new(InMemoryProjectStore::new()),
            toggles: Arc::new(InMemoryFeatureToggleStore::new()),
            feature_types: Arc::new(InMemoryFeatureTypeStore::new()),
        }
    }

    pub fn destroy(&self) {
        self.projects.destroy();
        self.toggles.destroy();
        self.feature_types.destroy();
    }
}
