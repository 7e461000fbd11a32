//! Read-through cache of feature type lifetimes
//!
//! The map is keyed by lowercase type id. It is loaded from the [`FeatureTypeStore`] on first use and
//! reloaded once the snapshot is older than the refresh interval. Loads hold
//! the write lock, so concurrent callers wait for a single store read.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::health::LifetimeMap;
use crate::store::{FeatureTypeStore, Store};

/// Default refresh interval for the lifetime snapshot
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

struct Snapshot {
    lifetimes: Arc<LifetimeMap>,
    loaded_at: Instant,
}

/// Cached lowercase type id to lifetime mapping
pub struct FeatureTypeLifetimes {
    store: Arc<dyn FeatureTypeStore>,
    refresh_interval: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl FeatureTypeLifetimes {
    pub fn new(store: Arc<dyn FeatureTypeStore>, refresh_interval: Duration) -> Self {
        Self {
            store,
            refresh_interval,
            snapshot: RwLock::new(None),
        }
    }

    /// Current lifetime map, loading it when missing or expired
    pub async fn get(&self) -> Result<Arc<LifetimeMap>> {
        if let Some(lifetimes) = self.fresh(&*self.snapshot.read().await) {
            return Ok(lifetimes);
        }

        let mut guard = self.snapshot.write().await;
        // Another caller may have loaded while we waited for the lock
        if let Some(lifetimes) = self.fresh(&guard) {
            return Ok(lifetimes);
        }

        let lifetimes = Arc::new(self.load().await?);
        *guard = Some(Snapshot {
            lifetimes: Arc::clone(&lifetimes),
            loaded_at: Instant::now(),
        });
        Ok(lifetimes)
    }

    /// Drop the snapshot; the next `get` reloads from the store
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
        tracing::debug!("Feature type lifetime cache invalidated");
    }

    fn fresh(&self, snapshot: &Option<Snapshot>) -> Option<Arc<LifetimeMap>> {
        snapshot
            .as_ref()
            .filter(|s| s.loaded_at.elapsed() < self.refresh_interval)
            .map(|s| Arc::clone(&s.lifetimes))
    }

    async fn load(&self) -> Result<LifetimeMap> {
        let types = self.store.get_all().await?;
        // Toggles store the type id; display names are resolved when toggles are created
        let lifetimes: LifetimeMap = types
            .into_iter()
            .map(|t| (t.id.to_lowercase(), t.lifetime_days))
            .collect();

        tracing::info!(types = lifetimes.len(), "Loaded feature type lifetimes");
        Ok(lifetimes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::model::FeatureType;
    use crate::store::{InMemoryFeatureTypeStore, Store};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts `get_all` calls and can be switched to fail
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryFeatureTypeStore,
        loads: AtomicUsize,
        failing: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl Store<FeatureType, String> for CountingStore {
        async fn get(&self, key: &String) -> StoreResult<FeatureType> {
            self.inner.get(key).await
        }

        async fn get_all(&self) -> StoreResult<Vec<FeatureType>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.inner.get_all().await
        }

        async fn delete(&self, key: &String) -> StoreResult<()> {
            self.inner.delete(key).await
        }

        async fn delete_all(&self) -> StoreResult<()> {
            self.inner.delete_all().await
        }
    }

    #[async_trait]
    impl FeatureTypeStore for CountingStore {
        async fn get_by_name(&self, name: &str) -> StoreResult<FeatureType> {
            self.inner.get_by_name(name).await
        }

        async fn upsert(&self, feature_type: FeatureType) -> StoreResult<()> {
            self.inner.upsert(feature_type).await
        }
    }

    async fn counting_store() -> Arc<CountingStore> {
        let store = Arc::new(CountingStore::default());
        store
            .upsert(FeatureType::new("release", "Release", "", Some(40)))
            .await
            .unwrap();
        store
            .upsert(FeatureType::new("kill-switch", "Kill switch", "", None))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_loads_once_within_interval() {
        let store = counting_store().await;
        let cache = FeatureTypeLifetimes::new(store.clone(), Duration::from_secs(60));

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
        assert_eq!(first.get("release"), Some(&Some(40)));
        assert_eq!(second.get("kill-switch"), Some(&None));
        assert_eq!(second.get("kill switch"), None);
    }

    #[tokio::test]
    async fn test_display_name_does_not_shadow_type_id() {
        let store = counting_store().await;
        store
            .upsert(FeatureType::new("rollout", "Release", "", Some(5)))
            .await
            .unwrap();
        let cache = FeatureTypeLifetimes::new(store, Duration::from_secs(60));

        let lifetimes = cache.get().await.unwrap();
        assert_eq!(lifetimes.get("release"), Some(&Some(40)));
        assert_eq!(lifetimes.get("rollout"), Some(&Some(5)));
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_load() {
        let store = counting_store().await;
        let cache = Arc::new(FeatureTypeLifetimes::new(store.clone(), Duration::from_secs(60)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await.map(|m| m.len()) })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 2);
        }

        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reloads_after_expiry_and_invalidate() {
        let store = counting_store().await;
        let cache = FeatureTypeLifetimes::new(store.clone(), Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);

        let cache = FeatureTypeLifetimes::new(store.clone(), Duration::from_secs(60));
        cache.get().await.unwrap();
        store
            .upsert(FeatureType::new("experiment", "Experiment", "", Some(40)))
            .await
            .unwrap();
        assert!(cache.get().await.unwrap().get("experiment").is_none());

        cache.invalidate().await;
        assert_eq!(cache.get().await.unwrap().get("experiment"), Some(&Some(40)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = counting_store().await;
        store.failing.store(true, Ordering::SeqCst);
        let cache = FeatureTypeLifetimes::new(store.clone(), Duration::from_secs(60));

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, crate::error::ToggleError::Store(StoreError::Backend(_))));

        store.failing.store(false, Ordering::SeqCst);
        tokio_test::assert_ok!(cache.get().await);
    }

    #[tokio::test]
    async fn test_failed_reload_recovers_with_current_values() {
        let store = counting_store().await;
        let cache = FeatureTypeLifetimes::new(store.clone(), Duration::from_millis(20));

        let first = cache.get().await.unwrap();
        assert_eq!(first.get("release"), Some(&Some(40)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        store.failing.store(true, Ordering::SeqCst);
        tokio_test::assert_err!(cache.get().await);
        // Handed-out snapshots are unaffected by the failed reload
        assert_eq!(first.get("release"), Some(&Some(40)));

        store.failing.store(false, Ordering::SeqCst);
        store
            .upsert(FeatureType::new("release", "Release", "", Some(10)))
            .await
            .unwrap();
        let reloaded = cache.get().await.unwrap();
        assert_eq!(reloaded.get("release"), Some(&Some(10)));
        assert_eq!(reloaded.get("kill-switch"), Some(&None));
        assert_eq!(store.loads.load(Ordering::SeqCst), 3);
    }
}
