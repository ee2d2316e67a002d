use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::types::CatalogEntry;

/// Satellite catalog, loaded once at startup and immutable afterwards
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<u64, usize>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            // first occurrence wins on duplicate ids
            index.entry(entry.id).or_insert(pos);
        }
        Self { entries, index }
    }

    /// Load a catalog from a JSON array of `{id, name}` objects
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;

        tracing::info!("Loaded {} catalog entries from {}", entries.len(), path.display());
        Ok(Self::from_entries(entries))
    }

    /// First `size` entries in catalog order
    pub fn slice(&self, size: usize) -> &[CatalogEntry] {
        &self.entries[..size.min(self.entries.len())]
    }

    pub fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
