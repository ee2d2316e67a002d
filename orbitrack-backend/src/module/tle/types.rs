use chrono::{DateTime, Duration, Utc};
use orbitrack_common::ElementSetRecord;
use serde::{Deserialize, Serialize};

/// The persisted artifact: one complete acquisition batch plus its fetch time.
///
/// On disk this is `{ "timestamp": <epoch ms>, "data": [records...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,

    #[serde(rename = "data")]
    pub records: Vec<ElementSetRecord>,
}

impl CacheSnapshot {
    /// Build a snapshot. `fetched_at` is truncated to milliseconds, the
    /// resolution it is persisted with.
    pub fn new(fetched_at: DateTime<Utc>, records: Vec<ElementSetRecord>) -> Self {
        let fetched_at =
            DateTime::from_timestamp_millis(fetched_at.timestamp_millis()).unwrap_or(fetched_at);
        Self {
            fetched_at,
            records,
        }
    }

    /// Cache miss
    pub fn empty() -> Self {
        Self {
            fetched_at: DateTime::<Utc>::UNIX_EPOCH,
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Non-empty and younger than `ttl` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.records.is_empty() && now.signed_duration_since(self.fetched_at) < ttl
    }
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Summary of one acquisition sweep
#[derive(Debug, Clone, Default)]
pub struct AcquisitionReport {
    pub total_requested: usize,
    pub successful: usize,
    pub failed: usize,
    pub duration_seconds: f64,
}
