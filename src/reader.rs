// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing::{debug, info};

use crate::aggregate::{LedgerSummary, aggregate};
use crate::cache::Cache;
use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::error::LedgerResult;
use crate::filter::RecordFilter;
use crate::models::{FinancialRecord, NewRecord};
use crate::store::RecordStore;

/// Read model over one record store. Store and cache are supplied by the
/// caller; the reader owns neither.
pub struct LedgerReader<'a> {
    store: &'a dyn RecordStore,
    cache: &'a dyn Cache,
    ttl_secs: u64,
}

impl<'a> LedgerReader<'a> {
    pub fn new(store: &'a dyn RecordStore, cache: &'a dyn Cache) -> Self {
        LedgerReader {
            store,
            cache,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn records(&self, owner_id: i64, filter: &RecordFilter) -> LedgerResult<Vec<FinancialRecord>> {
        self.store.find_many(owner_id, filter)
    }

    pub fn summarize(&self, owner_id: i64, filter: &RecordFilter) -> LedgerResult<LedgerSummary> {
        let key = format!(
            "summary:{}:g{}:{}",
            owner_id,
            self.generation(owner_id)?,
            filter.cache_key()
        );
        if let Some(hit) = self.cache.get(&key)? {
            match serde_json::from_str::<LedgerSummary>(&hit) {
                Ok(summary) => {
                    debug!(owner_id, key = %key, "summary served from cache");
                    return Ok(summary);
                }
                Err(e) => debug!(owner_id, error = %e, "discarding unreadable cache entry"),
            }
        }
        let records = self.store.find_many(owner_id, filter)?;
        let summary = aggregate(&records)?;
        self.cache
            .set(&key, &serde_json::to_string(&summary)?, self.ttl_secs)?;
        Ok(summary)
    }

    pub fn record(&self, new: NewRecord) -> LedgerResult<FinancialRecord> {
        let owner_id = new.owner_id;
        let rec = self.store.create(new)?;
        self.bump_generation(owner_id)?;
        info!(id = rec.id, owner_id, kind = %rec.kind, amount = %rec.amount, "recorded");
        Ok(rec)
    }

    pub fn has_external(&self, owner_id: i64, external_id: &str) -> LedgerResult<bool> {
        self.store.exists_external(owner_id, external_id)
    }

    pub fn delete(&self, owner_id: i64, id: i64) -> LedgerResult<bool> {
        let removed = self.store.delete(owner_id, id)?;
        if removed {
            self.bump_generation(owner_id)?;
        }
        Ok(removed)
    }

    /// Marks every cached summary of `owner_id` stale.
    pub fn invalidate(&self, owner_id: i64) -> LedgerResult<()> {
        self.bump_generation(owner_id)
    }

    fn generation_key(owner_id: i64) -> String {
        format!("gen:{}", owner_id)
    }

    fn generation(&self, owner_id: i64) -> LedgerResult<u64> {
        Ok(self
            .cache
            .get(&Self::generation_key(owner_id))?
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0))
    }

    fn bump_generation(&self, owner_id: i64) -> LedgerResult<()> {
        let next = self.generation(owner_id)?.wrapping_add(1);
        // never expires: a reset to 0 could resurrect summaries of an older generation
        self.cache
            .set(&Self::generation_key(owner_id), &next.to_string(), u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoCache};
    use crate::error::LedgerError;
    use crate::models::RecordKind;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn new_rec(owner_id: i64, category: &str, amount: &str) -> NewRecord {
        NewRecord {
            owner_id,
            kind: RecordKind::Expense,
            category: category.into(),
            amount: Decimal::from_str(amount).unwrap(),
            occurred_at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
            is_recurring: false,
            description: None,
            external_id: None,
        }
    }

    struct BrokenCache;

    impl Cache for BrokenCache {
        fn get(&self, _key: &str) -> LedgerResult<Option<String>> {
            Err(LedgerError::Cache("connection refused".into()))
        }
        fn set(&self, _key: &str, _value: &str, _ttl: u64) -> LedgerResult<()> {
            Err(LedgerError::Cache("connection refused".into()))
        }
        fn del(&self, _key: &str) -> LedgerResult<()> {
            Ok(())
        }
        fn clear(&self) -> LedgerResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn tenant_isolation() {
        let store = MemoryStore::new();
        let reader = LedgerReader::new(&store, &NoCache);
        reader.record(new_rec(1, "ads", "10.00")).unwrap();
        reader.record(new_rec(2, "ads", "99.00")).unwrap();
        let s = reader.summarize(1, &RecordFilter::new()).unwrap();
        assert_eq!(s.record_count, 1);
        assert_eq!(format!("{:.2}", s.total), "10.00");
    }

    #[test]
    fn cached_summary_invalidated_on_write() {
        let store = MemoryStore::new();
        let cache = MemoryCache::new();
        let reader = LedgerReader::new(&store, &cache);
        reader.record(new_rec(1, "ads", "10.00")).unwrap();
        let first = reader.summarize(1, &RecordFilter::new()).unwrap();
        assert_eq!(first.record_count, 1);

        reader.record(new_rec(1, "ads", "5.00")).unwrap();
        let second = reader.summarize(1, &RecordFilter::new()).unwrap();
        assert_eq!(second.record_count, 2);
        assert_eq!(format!("{:.2}", second.total), "15.00");
    }

    #[test]
    fn serves_from_cache_until_expiry() {
        let store = MemoryStore::new();
        let cache = MemoryCache::new();
        let reader = LedgerReader::new(&store, &cache).with_ttl(30);
        reader.record(new_rec(1, "ads", "10.00")).unwrap();
        reader.summarize(1, &RecordFilter::new()).unwrap();
        let before = cache.len();

        // a write that bypasses the reader is invisible until the TTL passes
        store.create(new_rec(1, "ads", "1.00")).unwrap();
        assert_eq!(reader.summarize(1, &RecordFilter::new()).unwrap().record_count, 1);
        assert_eq!(cache.len(), before);

        cache.advance(31);
        assert_eq!(reader.summarize(1, &RecordFilter::new()).unwrap().record_count, 2);
    }

    #[test]
    fn delete_is_owner_scoped() {
        let store = MemoryStore::new();
        let reader = LedgerReader::new(&store, &NoCache);
        let r = reader.record(new_rec(1, "ads", "10.00")).unwrap();
        assert!(!reader.delete(2, r.id).unwrap());
        assert!(reader.delete(1, r.id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn cache_failures_surface() {
        let store = MemoryStore::new();
        let reader = LedgerReader::new(&store, &BrokenCache);
        let err = reader.summarize(1, &RecordFilter::new()).unwrap_err();
        assert!(matches!(err, LedgerError::Cache(_)));
    }
}
