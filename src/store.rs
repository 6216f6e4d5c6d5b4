// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record persistence. Every query is scoped to one owner account.

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::cell::RefCell;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::filter::RecordFilter;
use crate::models::{FinancialRecord, NewRecord, RecordKind};
use crate::utils::{format_timestamp, parse_amount};

pub trait RecordStore {
    /// Records owned by `owner_id` matching `filter`, oldest first.
    fn find_many(&self, owner_id: i64, filter: &RecordFilter) -> LedgerResult<Vec<FinancialRecord>>;

    fn create(&self, record: NewRecord) -> LedgerResult<FinancialRecord>;

    /// Returns `false` when no such record exists for this owner.
    fn delete(&self, owner_id: i64, id: i64) -> LedgerResult<bool>;

    fn exists_external(&self, owner_id: i64, external_id: &str) -> LedgerResult<bool>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteStore { conn }
    }
}

/// Row as stored; amount, kind and timestamp stay textual until
/// `into_record` so that malformed rows surface as validation errors.
struct RawRecord {
    id: i64,
    owner_id: i64,
    kind: String,
    category: String,
    amount: String,
    occurred_at: String,
    is_recurring: bool,
    description: Option<String>,
    external_id: Option<String>,
}

impl RawRecord {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRecord {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            kind: r.get(2)?,
            category: r.get(3)?,
            amount: r.get(4)?,
            occurred_at: r.get(5)?,
            is_recurring: r.get::<_, i64>(6)? != 0,
            description: r.get(7)?,
            external_id: r.get(8)?,
        })
    }

    fn into_record(self) -> LedgerResult<FinancialRecord> {
        let occurred_at = chrono::DateTime::parse_from_rfc3339(&self.occurred_at)
            .map_err(|e| {
                LedgerError::validation(format!(
                    "record {} has bad timestamp '{}': {}",
                    self.id, self.occurred_at, e
                ))
            })?
            .with_timezone(&chrono::Utc);
        Ok(FinancialRecord {
            id: self.id,
            owner_id: self.owner_id,
            kind: self.kind.parse::<RecordKind>()?,
            category: self.category,
            amount: parse_amount(&self.amount)?,
            occurred_at,
            is_recurring: self.is_recurring,
            description: self.description,
            external_id: self.external_id,
        })
    }
}

impl RecordStore for SqliteStore<'_> {
    fn find_many(&self, owner_id: i64, filter: &RecordFilter) -> LedgerResult<Vec<FinancialRecord>> {
        let mut sql = String::from(
            "SELECT id, owner_id, kind, category, amount, occurred_at, is_recurring, description, external_id
             FROM records WHERE owner_id=?",
        );
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id)];

        if let Some(rec) = filter.recurring {
            sql.push_str(" AND is_recurring=?");
            args.push(Box::new(rec as i64));
        }
        if let Some(cat) = &filter.category {
            sql.push_str(" AND trim(category)=?");
            args.push(Box::new(cat.trim().to_string()));
        }
        if let Some(kind) = filter.kind {
            sql.push_str(" AND kind=?");
            args.push(Box::new(kind.as_str()));
        }
        if let Some(from) = filter.from {
            sql.push_str(" AND substr(occurred_at,1,10)>=?");
            args.push(Box::new(from.to_string()));
        }
        if let Some(to) = filter.to {
            sql.push_str(" AND substr(occurred_at,1,10)<=?");
            args.push(Box::new(to.to_string()));
        }
        sql.push_str(" ORDER BY occurred_at, id");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), RawRecord::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_record()?);
        }
        debug!(owner_id, count = out.len(), "records loaded");
        Ok(out)
    }

    fn create(&self, record: NewRecord) -> LedgerResult<FinancialRecord> {
        if record.category.trim().is_empty() {
            return Err(LedgerError::validation("category must not be empty"));
        }
        self.conn.execute(
            "INSERT INTO records(owner_id, kind, category, amount, occurred_at, is_recurring, description, external_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.owner_id,
                record.kind.as_str(),
                record.category.trim(),
                record.amount.to_string(),
                format_timestamp(&record.occurred_at),
                record.is_recurring as i64,
                record.description,
                record.external_id,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, owner_id = record.owner_id, kind = %record.kind, "record created");
        let mut rec = record.into_record(id);
        rec.category = rec.category.trim().to_string();
        Ok(rec)
    }

    fn delete(&self, owner_id: i64, id: i64) -> LedgerResult<bool> {
        let n = self.conn.execute(
            "DELETE FROM records WHERE id=?1 AND owner_id=?2",
            params![id, owner_id],
        )?;
        Ok(n > 0)
    }

    fn exists_external(&self, owner_id: i64, external_id: &str) -> LedgerResult<bool> {
        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE owner_id=?1 AND external_id=?2",
                params![owner_id, external_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }
}

/// Vector-backed store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    records: RefCell<Vec<FinancialRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn find_many(&self, owner_id: i64, filter: &RecordFilter) -> LedgerResult<Vec<FinancialRecord>> {
        let mut out: Vec<FinancialRecord> = self
            .records
            .borrow()
            .iter()
            .filter(|r| r.owner_id == owner_id && filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    fn create(&self, record: NewRecord) -> LedgerResult<FinancialRecord> {
        if record.category.trim().is_empty() {
            return Err(LedgerError::validation("category must not be empty"));
        }
        let mut records = self.records.borrow_mut();
        if let Some(ext) = &record.external_id {
            let dup = records
                .iter()
                .any(|r| r.owner_id == record.owner_id && r.external_id.as_ref() == Some(ext));
            if dup {
                return Err(LedgerError::validation(format!(
                    "external id '{}' already recorded",
                    ext
                )));
            }
        }
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let mut rec = record.into_record(id);
        rec.category = rec.category.trim().to_string();
        records.push(rec.clone());
        Ok(rec)
    }

    fn delete(&self, owner_id: i64, id: i64) -> LedgerResult<bool> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.owner_id == owner_id));
        Ok(records.len() != before)
    }

    fn exists_external(&self, owner_id: i64, external_id: &str) -> LedgerResult<bool> {
        Ok(self
            .records
            .borrow()
            .iter()
            .any(|r| r.owner_id == owner_id && r.external_id.as_deref() == Some(external_id)))
    }
}
