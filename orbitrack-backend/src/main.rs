use orbitrack_backend::config;
use orbitrack_backend::module::tle::{AcquisitionService, CacheStore, N2yoClient, TleManager};
use orbitrack_backend::service;
use orbitrack_common::{Catalog, logging};

use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = logging::init_logging(&config.log_dir, "orbitrack-backend", &config.log_level)?;

    tracing::info!("Orbitrack Backend starting...");

    let catalog = Catalog::load(&config.catalog_path)
        .await
        .context("Failed to load satellite catalog")?;

    if config.api_key.is_none() {
        tracing::warn!(
            "No upstream API key configured (set {}); only a valid cache can be served",
            config::API_KEY_ENV
        );
    }

    let source = N2yoClient::new(
        config.upstream_base_url.clone(),
        config.api_key.clone(),
        config.request_timeout(),
    )?;
    let acquisition = AcquisitionService::new(Arc::new(source), config.request_delay());
    let store = CacheStore::new(&config.cache_path);

    let manager = TleManager::new(
        catalog,
        store,
        acquisition,
        config.catalog_slice_size,
        config.cache_ttl(),
    );
    tracing::info!(
        "Serving the first {} of {} catalog entries (cache TTL {}h)",
        config.catalog_slice_size.min(manager.catalog().len()),
        manager.catalog().len(),
        config.cache_ttl_hours
    );

    service::serve(config, manager).await?;

    Ok(())
}
