///! Element-set manager - cache-first freshness decision per request
use chrono::{DateTime, Duration, Utc};
use orbitrack_common::{Catalog, ElementSetRecord};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::acquisition::AcquisitionService;
use super::api_client::FetchError;
use super::cache::CacheStore;

pub struct TleManager {
    catalog: Catalog,
    store: CacheStore,
    acquisition: AcquisitionService,
    catalog_slice_size: usize,
    cache_ttl: Duration,
    /// Serializes freshness checks so only one sweep (one writer) runs at a time
    refresh_lock: Mutex<()>,
}

impl TleManager {
    pub fn new(
        catalog: Catalog,
        store: CacheStore,
        acquisition: AcquisitionService,
        catalog_slice_size: usize,
        cache_ttl: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            store,
            acquisition,
            catalog_slice_size,
            cache_ttl,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn element_sets(self: &Arc<Self>) -> Result<Vec<ElementSetRecord>, FetchError> {
        self.element_sets_at(Utc::now()).await
    }

    /// Serve the cached batch if it is valid at `now`, otherwise run a full
    /// sweep before returning.
    ///
    /// The decision and any sweep run on their own task, so a caller that goes
    /// away mid-sweep does not cancel it: the batch is still completed and
    /// written for the next request.
    pub async fn element_sets_at(
        self: &Arc<Self>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ElementSetRecord>, FetchError> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.resolve(now).await })
            .await
            .map_err(|e| FetchError::Task(e.to_string()))?
    }

    /// A caller queued behind a sweep is served from the batch that sweep wrote.
    async fn resolve(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ElementSetRecord>, FetchError> {
        let _guard = self.refresh_lock.lock().await;

        let snapshot = self.store.read().await;
        if CacheStore::is_valid(&snapshot, now, self.cache_ttl) {
            tracing::info!(
                "Using cached element sets ({} records, fetched at {})",
                snapshot.records.len(),
                snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            return Ok(snapshot.records);
        }

        if snapshot.is_empty() {
            tracing::info!("No cached element sets, starting acquisition");
        } else {
            tracing::info!(
                "Cached element sets from {} are stale, refreshing",
                snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        let slice = self.catalog.slice(self.catalog_slice_size);
        let snapshot = self.acquisition.acquire(slice, &self.store).await?;
        Ok(snapshot.records)
    }
}
