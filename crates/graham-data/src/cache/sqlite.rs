//! SQLite cache of company profiles and financial statements.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use graham_valuation::{CompanyProfile, StatementRecord};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Days after which cached entries are ignored.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// SQLite cache for provider responses.
///
/// Records are stored as JSON so the cache does not track the line-item
/// vocabulary. Prices are never cached.
#[derive(Debug)]
pub struct StatementCache {
    conn: Connection,
}

impl StatementCache {
    /// Open (or create) a cache database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                ticker TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS statements (
                ticker TEXT NOT NULL,
                fiscal_year INTEGER NOT NULL,
                kind TEXT NOT NULL,
                data TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (ticker, fiscal_year, kind)
            )",
            [],
        )?;

        // One row per ticker: the widest year window fetched and when
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS statement_fetches (
                ticker TEXT PRIMARY KEY,
                years INTEGER NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn cutoff(max_age_days: i64) -> String {
        (Utc::now() - Duration::days(max_age_days)).to_rfc3339()
    }

    /// Cached profile no older than `max_age_days`.
    pub fn get_profile(&self, ticker: &str, max_age_days: i64) -> Result<Option<CompanyProfile>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM profiles WHERE ticker = ?1 AND cached_at >= ?2",
                params![ticker, Self::cutoff(max_age_days)],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|json| serde_json::from_str::<CompanyProfile>(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// Store a profile.
    pub fn put_profile(&self, profile: &CompanyProfile) -> Result<()> {
        self.put_profile_at(profile, Utc::now())
    }

    fn put_profile_at(&self, profile: &CompanyProfile, cached_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO profiles (ticker, data, cached_at) VALUES (?1, ?2, ?3)",
            params![
                profile.ticker,
                serde_json::to_string(profile)?,
                cached_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// True if a fetch covering at least `years` years was cached within
    /// `max_age_days`.
    pub fn has_recent_statements(&self, ticker: &str, years: usize, max_age_days: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM statement_fetches
             WHERE ticker = ?1 AND years >= ?2 AND cached_at >= ?3",
            params![ticker, years as i64, Self::cutoff(max_age_days)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Cached statements for the `years` most recent fiscal years, newest first.
    pub fn get_statements(&self, ticker: &str, years: usize) -> Result<Vec<StatementRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM statements
             WHERE ticker = ?1
               AND fiscal_year IN (
                   SELECT DISTINCT fiscal_year FROM statements
                   WHERE ticker = ?1 ORDER BY fiscal_year DESC LIMIT ?2
               )
             ORDER BY fiscal_year DESC, kind",
        )?;

        let rows = stmt.query_map(params![ticker, years as i64], |row| row.get::<_, String>(0))?;

        let mut statements = Vec::new();
        for row in rows {
            statements.push(serde_json::from_str(&row?)?);
        }
        Ok(statements)
    }

    /// Replace every cached statement for `ticker` with `statements`, recording
    /// a fetch of `years` years.
    pub fn put_statements(
        &self,
        ticker: &str,
        years: usize,
        statements: &[StatementRecord],
    ) -> Result<()> {
        self.put_statements_at(ticker, years, statements, Utc::now())
    }

    fn put_statements_at(
        &self,
        ticker: &str,
        years: usize,
        statements: &[StatementRecord],
        cached_at: DateTime<Utc>,
    ) -> Result<()> {
        let cached_at = cached_at.to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM statements WHERE ticker = ?1", params![ticker])?;
        for record in statements {
            tx.execute(
                "INSERT OR REPLACE INTO statements (ticker, fiscal_year, kind, data, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    ticker,
                    record.fiscal_year,
                    record.kind.to_string(),
                    serde_json::to_string(record)?,
                    cached_at
                ],
            )?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO statement_fetches (ticker, years, cached_at) VALUES (?1, ?2, ?3)",
            params![ticker, years as i64, cached_at],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Remove everything cached for a ticker.
    pub fn clear_ticker(&self, ticker: &str) -> Result<()> {
        for table in ["profiles", "statements", "statement_fetches"] {
            self.conn.execute(
                &format!("DELETE FROM {table} WHERE ticker = ?1"),
                params![ticker],
            )?;
        }
        Ok(())
    }

    /// Remove all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM profiles", [])?;
        self.conn.execute("DELETE FROM statements", [])?;
        self.conn.execute("DELETE FROM statement_fetches", [])?;
        Ok(())
    }

    /// Row counts.
    pub fn stats(&self) -> Result<CacheStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(CacheStats {
            profiles: count("profiles")?,
            statements: count("statements")?,
            tickers: count("statement_fetches")?,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached company profiles
    pub profiles: usize,
    /// Cached statement records
    pub statements: usize,
    /// Tickers with a recorded statement fetch
    pub tickers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use graham_valuation::{StatementKind, line_items};

    fn statements(ticker: &str, years: &[i32]) -> Vec<StatementRecord> {
        years
            .iter()
            .flat_map(|&year| {
                [
                    StatementRecord::new(ticker, year, StatementKind::Income)
                        .with_field(line_items::NET_INCOME, "1000"),
                    StatementRecord::new(ticker, year, StatementKind::Balance)
                        .with_field(line_items::SHARES_OUTSTANDING, 10.0),
                ]
            })
            .collect()
    }

    #[test]
    fn test_cache_initialization() {
        let cache = StatementCache::in_memory();
        assert!(cache.is_ok());
    }

    #[test]
    fn test_profile_roundtrip_and_expiry() {
        let cache = StatementCache::in_memory().unwrap();
        let profile = CompanyProfile::new("ACME", "Acme Corp", "Industrials", "Machinery")
            .with_market_cap(5.0e9);

        cache.put_profile(&profile).unwrap();
        assert_eq!(cache.get_profile("ACME", 7).unwrap(), Some(profile.clone()));
        assert_eq!(cache.get_profile("OTHER", 7).unwrap(), None);

        cache
            .put_profile_at(&profile, Utc::now() - Duration::days(10))
            .unwrap();
        assert_eq!(cache.get_profile("ACME", 7).unwrap(), None);
    }

    #[test]
    fn test_statements_replace_and_limit() {
        let cache = StatementCache::in_memory().unwrap();
        cache
            .put_statements("ACME", 3, &statements("ACME", &[2023, 2022, 2021]))
            .unwrap();

        let cached = cache.get_statements("ACME", 2).unwrap();
        assert_eq!(cached.len(), 4);
        assert_eq!(cached[0].fiscal_year, 2023);
        assert_eq!(cached[3].fiscal_year, 2022);
        let income = cached
            .iter()
            .find(|s| s.kind == StatementKind::Income)
            .unwrap();
        assert_eq!(income.value(line_items::NET_INCOME), Some(1000.0));

        cache
            .put_statements("ACME", 3, &statements("ACME", &[2024]))
            .unwrap();
        assert_eq!(cache.get_statements("ACME", 7).unwrap().len(), 2);
    }

    #[test]
    fn test_has_recent_statements() {
        let cache = StatementCache::in_memory().unwrap();
        assert!(!cache.has_recent_statements("ACME", 5, 7).unwrap());

        cache
            .put_statements("ACME", 5, &statements("ACME", &[2023]))
            .unwrap();
        assert!(cache.has_recent_statements("ACME", 5, 7).unwrap());
        assert!(cache.has_recent_statements("ACME", 3, 7).unwrap());
        assert!(!cache.has_recent_statements("ACME", 7, 7).unwrap());

        cache
            .put_statements_at(
                "ACME",
                5,
                &statements("ACME", &[2023]),
                Utc::now() - Duration::days(8),
            )
            .unwrap();
        assert!(!cache.has_recent_statements("ACME", 5, 7).unwrap());
    }

    #[test]
    fn test_clear_and_stats() {
        let cache = StatementCache::in_memory().unwrap();
        cache
            .put_profile(&CompanyProfile::new("ACME", "Acme", "", ""))
            .unwrap();
        cache
            .put_statements("ACME", 1, &statements("ACME", &[2023]))
            .unwrap();
        cache
            .put_statements("BETA", 1, &statements("BETA", &[2023]))
            .unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.profiles, 1);
        assert_eq!(stats.statements, 4);
        assert_eq!(stats.tickers, 2);

        cache.clear_ticker("ACME").unwrap();
        assert_eq!(cache.stats().unwrap().statements, 2);

        cache.clear_all().unwrap();
        assert_eq!(
            cache.stats().unwrap(),
            CacheStats {
                profiles: 0,
                statements: 0,
                tickers: 0
            }
        );
    }

    #[test]
    fn test_file_backed_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statements.db");
        {
            let cache = StatementCache::new(&path).unwrap();
            cache
                .put_statements("ACME", 1, &statements("ACME", &[2023]))
                .unwrap();
        }
        let reopened = StatementCache::new(&path).unwrap();
        assert_eq!(reopened.get_statements("ACME", 1).unwrap().len(), 2);
    }
}
