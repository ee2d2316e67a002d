use serde::{Deserialize, Serialize};

/// Static catalog entry (NORAD id + display name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Catalog metadata carried next to an element set, as reported by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatInfo {
    pub satid: u64,
    pub satname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactionscount: Option<u32>,
}

impl From<&CatalogEntry> for SatInfo {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            satid: entry.id,
            satname: entry.name.clone(),
            transactionscount: None,
        }
    }
}

/// Result of fetching one identifier. Exactly one of `tle` / `error` exists on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordOutcome {
    Tle { tle: String },
    Error { error: String },
}

/// One element-set record, serialized as `{id, tle?, error?, info?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSetRecord {
    pub id: u64,

    #[serde(flatten)]
    pub outcome: RecordOutcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<SatInfo>,
}

impl ElementSetRecord {
    pub fn success(id: u64, tle: impl Into<String>, info: Option<SatInfo>) -> Self {
        Self {
            id,
            outcome: RecordOutcome::Tle { tle: tle.into() },
            info,
        }
    }

    pub fn failure(id: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            outcome: RecordOutcome::Error {
                error: error.into(),
            },
            info: None,
        }
    }

    /// Raw two-line element text, if the fetch succeeded
    pub fn raw_element_set(&self) -> Option<&str> {
        match &self.outcome {
            RecordOutcome::Tle { tle } => Some(tle),
            RecordOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RecordOutcome::Tle { .. } => None,
            RecordOutcome::Error { error } => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Tle { .. })
    }
}
