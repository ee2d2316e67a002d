//! Types and helpers shared by the orbitrack backend and frontend.

pub mod catalog;
pub mod logging;
pub mod types;

pub use catalog::Catalog;
pub use types::{CatalogEntry, ElementSetRecord, RecordOutcome, SatInfo};

/// HTTP path serving the cached element-set batch
pub const ELEMENT_SETS_PATH: &str = "/tle-first-1000";
