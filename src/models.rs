// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Expense,
    Sale,
    AdSpend,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Sale => "sale",
            RecordKind::AdSpend => "ad_spend",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "expense" => Ok(RecordKind::Expense),
            "sale" => Ok(RecordKind::Sale),
            "ad_spend" | "ad" | "ads" => Ok(RecordKind::AdSpend),
            other => Err(LedgerError::validation(format!(
                "unknown record kind '{}', expected expense|sale|ad_spend",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancialRecord {
    pub id: i64,
    pub owner_id: i64,
    pub kind: RecordKind,
    pub category: String,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub is_recurring: bool,
    pub description: Option<String>,
    pub external_id: Option<String>,
}

/// Payload for `RecordStore::create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRecord {
    pub owner_id: i64,
    pub kind: RecordKind,
    pub category: String,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub is_recurring: bool,
    pub description: Option<String>,
    pub external_id: Option<String>,
}

impl NewRecord {
    pub fn into_record(self, id: i64) -> FinancialRecord {
        FinancialRecord {
            id,
            owner_id: self.owner_id,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            occurred_at: self.occurred_at,
            is_recurring: self.is_recurring,
            description: self.description,
            external_id: self.external_id,
        }
    }
}
