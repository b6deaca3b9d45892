//! Construction of the configured data provider.

use crate::config::{ProviderKind, ScreenerConfig};
use crate::error::Result;
use graham_data::alpha_vantage::DEMO_KEY;
use graham_data::{
    AlphaVantageProvider, CachedProvider, DataProvider, EdgarProvider, KeyRotation,
    RotationStrategy, SampleProvider, StatementCache,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Alpha Vantage keys from `api_key` (comma-separated) or the environment.
///
/// Falls back to the shared demo key when neither supplies one.
pub fn alpha_vantage_keys(api_key: Option<&str>, strategy: RotationStrategy) -> KeyRotation {
    let keys = api_key.map_or_else(
        || KeyRotation::from_env(strategy),
        |list| KeyRotation::from_csv(list, strategy),
    );

    if keys.is_empty() {
        warn!("No Alpha Vantage API key configured, using the rate-limited demo key");
        KeyRotation::single(DEMO_KEY)
    } else {
        info!(keys = keys.len(), "Loaded Alpha Vantage API keys");
        keys
    }
}

/// Open the cache, creating its directory if needed.
fn open_cache(path: &Path) -> graham_data::Result<StatementCache> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    StatementCache::new(path)
}

/// The provider a run should use, wrapped in the statement cache when enabled.
///
/// Sample data is never cached. A cache that cannot be opened is logged and
/// skipped.
pub fn build_provider(config: &ScreenerConfig, api_key: Option<&str>) -> Result<Arc<dyn DataProvider>> {
    let provider: Arc<dyn DataProvider> = match config.effective_provider() {
        ProviderKind::Sample => return Ok(Arc::new(SampleProvider::new())),
        ProviderKind::AlphaVantage => Arc::new(AlphaVantageProvider::new(alpha_vantage_keys(
            api_key,
            RotationStrategy::RoundRobin,
        ))?),
        ProviderKind::Edgar => Arc::new(EdgarProvider::new()?),
    };

    if !config.cache.enabled {
        return Ok(provider);
    }

    let path = config.cache.resolved_path();
    match open_cache(&path) {
        Ok(cache) => {
            info!(path = %path.display(), "Using statement cache");
            Ok(Arc::new(
                CachedProvider::new(provider, cache)
                    .with_max_age_days(config.cache.max_age_days)
                    .with_refresh(config.cache.refresh),
            ))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Statement cache unavailable, continuing without it");
            Ok(provider)
        }
    }
}
