use super::sqlite::{DEFAULT_MAX_AGE_DAYS, StatementCache};
use crate::{
    error::{DataError, Result},
    provider::DataProvider,
};
use async_trait::async_trait;
use graham_valuation::{CompanyProfile, StatementKind, StatementRecord};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Wraps a provider with a [`StatementCache`] for profiles and statements.
///
/// Cache failures are logged and fall through to the wrapped provider. With
/// `refresh` set, reads skip the cache but fresh results are still written.
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<StatementCache>,
    max_age_days: i64,
    refresh: bool,
}

impl<P: DataProvider> CachedProvider<P> {
    /// Wrap `inner` with `cache`.
    pub const fn new(inner: P, cache: StatementCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            refresh: false,
        }
    }

    /// Ignore cached entries older than `days`.
    pub const fn with_max_age_days(mut self, days: i64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Bypass cached reads.
    pub const fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// The wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    fn with_cache<T>(&self, f: impl FnOnce(&StatementCache) -> Result<T>) -> Result<T> {
        let cache = self
            .cache
            .lock()
            .map_err(|_| DataError::Cache("cache lock poisoned".to_string()))?;
        f(&cache)
    }
}

/// True when every statement kind is present at least once.
///
/// Providers drop a kind whose fetch failed, so anything less is incomplete.
fn covers_every_kind(statements: &[StatementRecord]) -> bool {
    StatementKind::ALL
        .iter()
        .all(|kind| statements.iter().any(|s| s.kind == *kind))
}

#[async_trait]
impl<P: DataProvider> DataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        if !self.refresh {
            match self.with_cache(|c| c.get_profile(ticker, self.max_age_days)) {
                Ok(Some(profile)) => {
                    debug!(ticker, "Profile cache hit");
                    return Ok(Some(profile));
                }
                Ok(None) => {}
                Err(e) => warn!(ticker, error = %e, "Profile cache read failed"),
            }
        }

        let profile = self.inner.company_profile(ticker).await?;
        if let Some(profile) = &profile
            && let Err(e) = self.with_cache(|c| c.put_profile(profile))
        {
            warn!(ticker, error = %e, "Profile cache write failed");
        }
        Ok(profile)
    }

    async fn financial_statements(
        &self,
        ticker: &str,
        years: usize,
    ) -> Result<Vec<StatementRecord>> {
        if !self.refresh {
            let cached = self.with_cache(|c| {
                if c.has_recent_statements(ticker, years, self.max_age_days)? {
                    c.get_statements(ticker, years).map(Some)
                } else {
                    Ok(None)
                }
            });
            match cached {
                Ok(Some(statements)) => {
                    debug!(ticker, count = statements.len(), "Statement cache hit");
                    return Ok(statements);
                }
                Ok(None) => {}
                Err(e) => warn!(ticker, error = %e, "Statement cache read failed"),
            }
        }

        let statements = self.inner.financial_statements(ticker, years).await?;
        if !covers_every_kind(&statements) {
            debug!(ticker, count = statements.len(), "Partial statements, not caching");
        } else if let Err(e) = self.with_cache(|c| c.put_statements(ticker, years, &statements)) {
            warn!(ticker, error = %e, "Statement cache write failed");
        }
        Ok(statements)
    }

    async fn stock_price(&self, ticker: &str) -> Result<Option<f64>> {
        self.inner.stock_price(ticker).await
    }

    async fn listed_tickers(&self) -> Result<Vec<String>> {
        self.inner.listed_tickers().await
    }
}
