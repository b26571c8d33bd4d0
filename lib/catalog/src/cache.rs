//! Memoized `select` results.
//!
//! Entries are keyed by `(table name, predicate)` and stamped with the
//! [`TableVersion`] they were computed at. A lookup only hits when the stamp
//! matches the table's current version, so an entry computed before a mutation
//! can never be served afterwards even if [`SelectCache::invalidate`] was not
//! called. Invalidation still runs on every mutation to release memory.
//!
//! A table holds at most one entry per distinct predicate. Every miss also
//! evicts that table's entries stamped with any other version, so entries
//! for predicates that are never repeated do not outlive the next change.

use crate::{Predicate, Row, TableVersion};
use dashmap::DashMap;
use getset::CopyGetters;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::debug;

type CacheKey = (String, Option<Predicate>);

#[derive(Debug, Clone)]
struct CacheEntry {
    version: TableVersion,
    rows: Arc<Vec<Row>>,
}

/// Point-in-time counters of a [`SelectCache`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    entries: usize,
}

#[derive(Debug)]
pub struct SelectCache {
    entries: DashMap<CacheKey, CacheEntry>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for SelectCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SelectCache {
    /// A disabled cache computes on every call and stores nothing.
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached rows for `(table, predicate)` if they were computed at
    /// `version`, otherwise runs `compute` and caches its result.
    pub fn get_or_compute<F, E>(
        &self,
        table: &str,
        predicate: Option<&Predicate>,
        version: TableVersion,
        compute: F,
    ) -> Result<Arc<Vec<Row>>, E>
    where
        F: FnOnce() -> Result<Vec<Row>, E>,
    {
        if !self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute().map(Arc::new);
        }

        let key = (table.to_string(), predicate.cloned());
        let cached = self
            .entries
            .get(&key)
            .filter(|entry| entry.version == version)
            .map(|entry| Arc::clone(&entry.rows));

        if let Some(rows) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(table, %version, "select served from cache");
            return Ok(rows);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(table, %version, "select computed");
        let rows = Arc::new(compute()?);
        self.entries
            .retain(|(name, _), entry| name != table || entry.version == version);
        self.entries.insert(
            key,
            CacheEntry {
                version,
                rows: Arc::clone(&rows),
            },
        );

        Ok(rows)
    }

    /// Drops every entry belonging to `table`.
    pub fn invalidate(&self, table: &str) {
        let before = self.entries.len();
        self.entries.retain(|(name, _), _| name != table);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(table, dropped, "cache entries invalidated");
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RowId, Schema};
    use pretty_assertions_sorted::assert_eq;
    use std::convert::Infallible;
    use ty::DataType;

    fn rows(n: usize) -> Vec<Row> {
        let schema = Schema::define([("n", "int")]).unwrap();
        (0..n as i64)
            .map(|i| {
                schema
                    .validate_new(RowId::new(i + 1), vec![DataType::Integer(i)])
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_second_lookup_hits() {
        let cache = SelectCache::default();
        let version = TableVersion::new(1);

        let first = cache
            .get_or_compute::<_, Infallible>("t", None, version, || Ok(rows(2)))
            .unwrap();
        let second = cache
            .get_or_compute::<_, Infallible>("t", None, version, || panic!("should hit"))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_newer_version_recomputes() {
        let cache = SelectCache::default();
        cache
            .get_or_compute::<_, Infallible>("t", None, TableVersion::new(1), || Ok(rows(1)))
            .unwrap();
        let fresh = cache
            .get_or_compute::<_, Infallible>("t", None, TableVersion::new(2), || Ok(rows(3)))
            .unwrap();

        assert_eq!(fresh.len(), 3);
        assert_eq!(cache.stats().misses(), 2);
    }

    #[test]
    fn test_predicates_are_distinct_keys() {
        let cache = SelectCache::default();
        let version = TableVersion::default();
        let by_one = Predicate::eq("n", 1);

        cache
            .get_or_compute::<_, Infallible>("t", None, version, || Ok(rows(2)))
            .unwrap();
        let filtered = cache
            .get_or_compute::<_, Infallible>("t", Some(&by_one), version, || Ok(rows(1)))
            .unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(cache.stats().entries(), 2);
    }

    #[test]
    fn test_miss_evicts_older_versions_of_table() {
        let cache = SelectCache::default();
        let old = TableVersion::new(1);
        for n in 0..3 {
            let predicate = Predicate::eq("n", n);
            cache
                .get_or_compute::<_, Infallible>("t", Some(&predicate), old, || Ok(rows(1)))
                .unwrap();
        }
        cache
            .get_or_compute::<_, Infallible>("other", None, old, || Ok(rows(1)))
            .unwrap();
        assert_eq!(cache.stats().entries(), 4);

        cache
            .get_or_compute::<_, Infallible>("t", None, TableVersion::new(2), || Ok(rows(2)))
            .unwrap();

        assert_eq!(cache.stats().entries(), 2);
        cache
            .get_or_compute::<_, Infallible>("other", None, old, || panic!("should hit"))
            .unwrap();
    }

    #[test]
    fn test_invalidate_only_touches_table() {
        let cache = SelectCache::default();
        let version = TableVersion::default();
        for table in ["a", "b"] {
            cache
                .get_or_compute::<_, Infallible>(table, None, version, || Ok(rows(1)))
                .unwrap();
        }

        cache.invalidate("a");

        assert_eq!(cache.stats().entries(), 1);
        cache
            .get_or_compute::<_, Infallible>("b", None, version, || panic!("should hit"))
            .unwrap();
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SelectCache::default();
        let version = TableVersion::default();

        let failed = cache.get_or_compute("t", None, version, || Err("boom"));
        assert_eq!(failed.err(), Some("boom"));
        assert_eq!(cache.stats().entries(), 0);
    }

    #[test]
    fn test_disabled_cache_always_computes() {
        let cache = SelectCache::new(false);
        let version = TableVersion::default();
        for _ in 0..2 {
            cache
                .get_or_compute::<_, Infallible>("t", None, version, || Ok(rows(1)))
                .unwrap();
        }

        assert_eq!(cache.stats().hits(), 0);
        assert_eq!(cache.stats().misses(), 2);
        assert_eq!(cache.stats().entries(), 0);
    }
}
