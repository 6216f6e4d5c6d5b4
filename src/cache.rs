// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Key/value cache with per-entry TTL.
//!
//! `SqliteCache` keeps entries next to the ledger so they survive between
//! CLI invocations, `MemoryCache` is the in-process fake used by tests, and
//! `NoCache` disables caching entirely.

use rusqlite::{Connection, OptionalExtension, params};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::trace;

use crate::error::LedgerResult;

pub trait Cache {
    fn get(&self, key: &str) -> LedgerResult<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> LedgerResult<()>;
    fn del(&self, key: &str) -> LedgerResult<()>;
    /// Drops every entry; returns how many were removed.
    fn clear(&self) -> LedgerResult<usize>;
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn expiry(now: i64, ttl_secs: u64) -> i64 {
    now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
}

pub struct SqliteCache<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteCache<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteCache { conn }
    }

    /// Deletes expired rows.
    pub fn purge_expired(&self) -> LedgerResult<usize> {
        let n = self
            .conn
            .execute("DELETE FROM cache_entries WHERE expires_at<=?1", params![now_secs()])?;
        Ok(n)
    }
}

impl Cache for SqliteCache<'_> {
    fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        let v: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key=?1 AND expires_at>?2",
                params![key, now_secs()],
                |r| r.get(0),
            )
            .optional()?;
        trace!(key, hit = v.is_some(), "cache get");
        Ok(v)
    }

    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO cache_entries(key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, expires_at=excluded.expires_at",
            params![key, value, expiry(now_secs(), ttl_secs)],
        )?;
        Ok(())
    }

    fn del(&self, key: &str) -> LedgerResult<()> {
        self.conn
            .execute("DELETE FROM cache_entries WHERE key=?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> LedgerResult<usize> {
        Ok(self.conn.execute("DELETE FROM cache_entries", [])?)
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, (String, i64)>>,
    skew: Cell<i64>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves this cache's clock forward.
    pub fn advance(&self, secs: i64) {
        self.skew.set(self.skew.get() + secs);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn now(&self) -> i64 {
        now_secs() + self.skew.get()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        let now = self.now();
        let mut entries = self.entries.borrow_mut();
        let expired = match entries.get(key) {
            Some((v, exp)) if *exp > now => return Ok(Some(v.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl_secs: u64) -> LedgerResult<()> {
        let exp = expiry(self.now(), ttl_secs);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), (value.to_string(), exp));
        Ok(())
    }

    fn del(&self, key: &str) -> LedgerResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> LedgerResult<usize> {
        let mut entries = self.entries.borrow_mut();
        let n = entries.len();
        entries.clear();
        Ok(n)
    }
}

pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> LedgerResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) -> LedgerResult<()> {
        Ok(())
    }

    fn del(&self, _key: &str) -> LedgerResult<()> {
        Ok(())
    }

    fn clear(&self) -> LedgerResult<usize> {
        Ok(0)
    }
}
