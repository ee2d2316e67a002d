///! Element-set cache store - one JSON snapshot on disk
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::types::CacheSnapshot;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize cache snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Single-writer store for the latest [`CacheSnapshot`]
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cache".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the persisted snapshot. A missing or unreadable file is a cache miss.
    pub async fn read(&self) -> CacheSnapshot {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cache file does not exist: {}", self.path.display());
                return CacheSnapshot::empty();
            }
            Err(e) => {
                tracing::warn!("Cache unreadable, starting fresh ({}): {}", self.path.display(), e);
                return CacheSnapshot::empty();
            }
        };

        match serde_json::from_str::<CacheSnapshot>(&content) {
            Ok(snapshot) => {
                tracing::debug!(
                    "Loaded {} cached records fetched at {}",
                    snapshot.records.len(),
                    snapshot.fetched_at
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!("Cache corrupted, starting fresh ({}): {}", self.path.display(), e);
                CacheSnapshot::empty()
            }
        }
    }

    /// Replace the persisted snapshot. The new content is fully written and
    /// synced to a staging file before being renamed over the old one.
    pub async fn write(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::io(parent, e))?;
        }

        let content = serde_json::to_vec_pretty(snapshot)?;
        let staging = self.staging_path();

        let mut file = fs::File::create(&staging)
            .await
            .map_err(|e| CacheError::io(&staging, e))?;
        file.write_all(&content)
            .await
            .map_err(|e| CacheError::io(&staging, e))?;
        file.sync_all()
            .await
            .map_err(|e| CacheError::io(&staging, e))?;
        drop(file);

        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| CacheError::io(&self.path, e))?;

        tracing::debug!(
            "Saved {} records to cache {}",
            snapshot.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// True iff the snapshot has records and is younger than `ttl`
    pub fn is_valid(snapshot: &CacheSnapshot, now: DateTime<Utc>, ttl: Duration) -> bool {
        snapshot.is_fresh(now, ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitrack_common::{ElementSetRecord, SatInfo};
    use tempfile::TempDir;

    fn sample_snapshot() -> CacheSnapshot {
        CacheSnapshot::new(
            Utc::now(),
            vec![
                ElementSetRecord::success(
                    25544,
                    "1 25544U 98067A\r\n2 25544  51.6461",
                    Some(SatInfo {
                        satid: 25544,
                        satname: "SPACE STATION".to_string(),
                        transactionscount: Some(1),
                    }),
                ),
                ElementSetRecord::failure(20580, "HTTP error 503"),
            ],
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("satellitesCache.json"));

        let snapshot = store.read().await;
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("cache").join("satellitesCache.json"));
        let snapshot = sample_snapshot();

        store.write(&snapshot).await.unwrap();
        let loaded = store.read().await;

        assert_eq!(loaded, snapshot);
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("satellitesCache.json"));

        store.write(&sample_snapshot()).await.unwrap();
        let replacement = CacheSnapshot::new(Utc::now(), vec![ElementSetRecord::failure(1, "x")]);
        store.write(&replacement).await.unwrap();

        assert_eq!(store.read().await, replacement);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_cache_miss() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("satellitesCache.json");
        tokio::fs::write(&path, "{ this is not json").await.unwrap();

        let store = CacheStore::new(&path);
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_array_layout_is_cache_miss() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("satellitesCache.json");
        tokio::fs::write(&path, "[]").await.unwrap();

        let store = CacheStore::new(&path);
        assert!(store.read().await.is_empty());
    }

    #[test]
    fn test_is_valid_requires_records_and_age() {
        let now = Utc::now();
        let ttl = Duration::hours(24);

        assert!(!CacheStore::is_valid(&CacheSnapshot::empty(), now, ttl));

        let fresh = sample_snapshot();
        assert!(CacheStore::is_valid(&fresh, fresh.fetched_at + Duration::hours(1), ttl));

        let stale = CacheSnapshot::new(now - Duration::hours(25), fresh.records.clone());
        assert!(!CacheStore::is_valid(&stale, now, ttl));
    }
}
