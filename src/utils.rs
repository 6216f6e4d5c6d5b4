// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Account;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts either a plain `YYYY-MM-DD` date (midnight UTC) or a full
/// RFC 3339 timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    let d = parse_date(s)?;
    Ok(d.and_time(NaiveTime::MIN).and_utc())
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parses a currency amount. Anything that is not a plain decimal is a
/// validation failure rather than a generic parse error.
pub fn parse_amount(s: &str) -> LedgerResult<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|e| LedgerError::validation(format!("unparsable amount '{}': {}", s, e)))
}

pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" => Ok(true),
        other => Err(anyhow::anyhow!("Invalid boolean '{}'", other)),
    }
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn account_by_name(conn: &Connection, name: &str) -> Result<Account> {
    let name = name.trim();
    let mut stmt = conn.prepare("SELECT id, name, currency FROM accounts WHERE name=?1")?;
    let acct = stmt
        .query_row(params![name], |r| {
            Ok(Account {
                id: r.get(0)?,
                name: r.get(1)?,
                currency: r.get(2)?,
            })
        })
        .with_context(|| format!("Account '{}' not found", name))?;
    Ok(acct)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_accepts_date_and_rfc3339() {
        let a = parse_timestamp("2025-03-04").unwrap();
        assert_eq!(format_timestamp(&a), "2025-03-04T00:00:00Z");
        let b = parse_timestamp("2025-03-04T10:30:00-03:00").unwrap();
        assert_eq!(format_timestamp(&b), "2025-03-04T13:30:00Z");
        let c = parse_timestamp("2025-03-04 08:00:00").unwrap();
        assert_eq!(format_timestamp(&c), "2025-03-04T08:00:00Z");
        assert!(parse_timestamp("04/03/2025").is_err());
    }

    #[test]
    fn amount_errors_are_validation() {
        assert!(matches!(parse_amount("12,3x"), Err(LedgerError::Validation(_))));
        assert_eq!(parse_amount(" 10.50 ").unwrap().to_string(), "10.50");
    }

    #[test]
    fn bools() {
        assert!(parse_bool("yes").unwrap());
        assert!(!parse_bool("").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn money_format_pads_cents() {
        assert_eq!(fmt_money(&Decimal::new(5, 0), "BRL"), "BRL 5.00");
    }
}
