///! Acquisition service - sequential, rate-limited element-set sweeps
use chrono::Utc;
use orbitrack_common::{CatalogEntry, ElementSetRecord, SatInfo};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::api_client::{ElementSetSource, FetchError};
use super::cache::CacheStore;
use super::types::{AcquisitionReport, CacheSnapshot};

pub struct AcquisitionService {
    source: Arc<dyn ElementSetSource>,
    request_delay: Duration,
}

impl AcquisitionService {
    pub fn new(source: Arc<dyn ElementSetSource>, request_delay: Duration) -> Self {
        Self {
            source,
            request_delay,
        }
    }

    /// Fetch one record per catalog entry, in order, never more than one
    /// request in flight. A failed identifier becomes an error record.
    pub async fn sweep(&self, slice: &[CatalogEntry]) -> (Vec<ElementSetRecord>, AcquisitionReport) {
        let start_time = Instant::now();
        let mut records = Vec::with_capacity(slice.len());
        let mut report = AcquisitionReport {
            total_requested: slice.len(),
            ..Default::default()
        };

        for (index, entry) in slice.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.source.fetch_element_set(entry.id).await {
                Ok(fetched) => {
                    let info = fetched.info.unwrap_or_else(|| SatInfo::from(entry));
                    records.push(ElementSetRecord::success(entry.id, fetched.tle, Some(info)));
                    report.successful += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch element set for {} ({}): {}", entry.id, entry.name, e);
                    records.push(ElementSetRecord::failure(entry.id, e.to_string()));
                    report.failed += 1;
                }
            }
        }

        report.duration_seconds = start_time.elapsed().as_secs_f64();
        (records, report)
    }

    /// Run a full sweep, stamp it with the completion time and persist it.
    ///
    /// Only a source that cannot run at all fails the call; nothing is
    /// written in that case. A failed write is logged and the fresh batch is
    /// still returned.
    pub async fn acquire(
        &self,
        slice: &[CatalogEntry],
        store: &CacheStore,
    ) -> Result<CacheSnapshot, FetchError> {
        self.source.ensure_ready()?;

        tracing::info!("Fetching fresh element sets for {} satellites...", slice.len());
        let (records, report) = self.sweep(slice).await;

        tracing::info!(
            "Acquisition complete: {} successful, {} failed in {:.2}s",
            report.successful,
            report.failed,
            report.duration_seconds
        );

        let snapshot = CacheSnapshot::new(Utc::now(), records);
        match store.write(&snapshot).await {
            Ok(()) => tracing::info!("Cached {} element-set records", snapshot.records.len()),
            Err(e) => tracing::error!("Failed to persist element-set cache: {}", e),
        }

        Ok(snapshot)
    }
}
