// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FinancialRecord, RecordKind};

/// Conjunction of optional record predicates. An empty filter matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub recurring: Option<bool>,
    pub category: Option<String>,
    pub kind: Option<RecordKind>,
    /// Inclusive lower bound on the record's UTC date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the record's UTC date.
    pub to: Option<NaiveDate>,
    /// Only honoured by stores; `apply` ignores it.
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recurring(mut self, yes: bool) -> Self {
        self.recurring = Some(yes);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn matches(&self, r: &FinancialRecord) -> bool {
        if let Some(want) = self.recurring {
            if r.is_recurring != want {
                return false;
            }
        }
        if let Some(cat) = &self.category {
            if r.category.trim() != cat.trim() {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if r.kind != kind {
                return false;
            }
        }
        let day = r.occurred_at.date_naive();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        true
    }

    /// Matching records in their original order.
    pub fn apply(&self, records: &[FinancialRecord]) -> Vec<FinancialRecord> {
        filter_by(records, |r| self.matches(r))
    }

    /// Stable textual form, used to key cached summaries.
    pub fn cache_key(&self) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|x| x.to_string()).unwrap_or_else(|| "*".into())
        }
        format!(
            "rec={};cat={};kind={};from={};to={};lim={}",
            opt(&self.recurring),
            opt(&self.category.as_ref().map(|c| c.trim().to_string())),
            opt(&self.kind),
            opt(&self.from),
            opt(&self.to),
            opt(&self.limit),
        )
    }
}

pub fn filter_by<P>(records: &[FinancialRecord], predicate: P) -> Vec<FinancialRecord>
where
    P: Fn(&FinancialRecord) -> bool,
{
    records.iter().filter(|r| predicate(r)).cloned().collect()
}
