///! Element-set acquisition and caching
///!
///! ## Main Components
///! - `CacheStore`: persists the latest `CacheSnapshot` as one JSON document
///! - `AcquisitionService`: sequential, rate-limited sweep over a catalog slice
///! - `TleManager`: cache-first freshness decision per incoming request
///! - `N2yoClient`: upstream element-set source

mod types;
pub use types::{AcquisitionReport, CacheSnapshot};

mod api_client;
pub use api_client::{ElementSetSource, FetchError, FetchedElementSet, N2yoClient, UpstreamElementSet};

mod cache;
pub use cache::{CacheError, CacheStore};

mod acquisition;
pub use acquisition::AcquisitionService;

mod manager;
pub use manager::TleManager;
