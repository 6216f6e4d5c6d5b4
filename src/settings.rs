// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-account tax and notification settings, stored as JSON in the
//! `settings` table and validated on every load and save.

use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    Simple,
    Presumed,
    Exempt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    Revenue,
    Profit,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self { $($ty::$variant => $s),+ })
            }
        }

        impl FromStr for $ty {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok($ty::$variant),)+
                    other => Err(LedgerError::validation(format!(
                        "unknown {} '{}'",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

str_enum!(TaxRegime { Simple => "simple", Presumed => "presumed", Exempt => "exempt" });
str_enum!(TaxBasis { Revenue => "revenue", Profit => "profit" });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxSettings {
    pub regime: TaxRegime,
    pub rate_percent: Decimal,
    pub basis: TaxBasis,
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            regime: TaxRegime::Simple,
            rate_percent: Decimal::new(6, 0),
            basis: TaxBasis::Revenue,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NotificationSettings {
    pub sales_alerts: bool,
    pub weekly_digest: bool,
    pub email_reports: bool,
    /// Warn when net margin drops below this percentage.
    pub low_margin_percent: Option<Decimal>,
}

fn check_percent(field: &str, v: Decimal) -> LedgerResult<()> {
    if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED {
        return Err(LedgerError::validation(format!(
            "{} must be between 0 and 100, got {}",
            field, v
        )));
    }
    Ok(())
}

pub trait Setting: Serialize + DeserializeOwned + Default {
    const KEY: &'static str;

    fn validate(&self) -> LedgerResult<()>;
}

impl Setting for TaxSettings {
    const KEY: &'static str = "tax";

    fn validate(&self) -> LedgerResult<()> {
        check_percent("rate_percent", self.rate_percent)
    }
}

impl Setting for NotificationSettings {
    const KEY: &'static str = "notifications";

    fn validate(&self) -> LedgerResult<()> {
        if let Some(p) = self.low_margin_percent {
            check_percent("low_margin_percent", p)?;
        }
        Ok(())
    }
}

/// Parses and validates a setting from JSON.
pub fn from_json<T: Setting>(raw: &str) -> LedgerResult<T> {
    let v: T = serde_json::from_str(raw)
        .map_err(|e| LedgerError::validation(format!("invalid {} settings: {}", T::KEY, e)))?;
    v.validate()?;
    Ok(v)
}

/// Stored value for the account, or the default when none was saved.
pub fn load<T: Setting>(conn: &Connection, account_id: i64) -> LedgerResult<T> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE account_id=?1 AND key=?2",
            params![account_id, T::KEY],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => from_json(&s),
        None => Ok(T::default()),
    }
}

pub fn save<T: Setting>(conn: &Connection, account_id: i64, value: &T) -> LedgerResult<()> {
    value.validate()?;
    conn.execute(
        "INSERT INTO settings(account_id, key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(account_id, key) DO UPDATE SET value=excluded.value",
        params![account_id, T::KEY, serde_json::to_string(value)?],
    )?;
    Ok(())
}
