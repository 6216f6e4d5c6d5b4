// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::filter::RecordFilter;
use crate::reader::LedgerReader;
use crate::utils::{account_by_name, format_timestamp};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, reader: &LedgerReader<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("records", sub)) => {
            let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            let n = export_records(reader, acct.id, &fmt, out)?;
            println!("Exported {} records to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn export_records(reader: &LedgerReader<'_>, owner_id: i64, fmt: &str, out: &str) -> Result<usize> {
    let records = reader.records(owner_id, &RecordFilter::new())?;
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "kind", "category", "amount", "recurring", "description"])?;
            for r in &records {
                wtr.write_record([
                    format_timestamp(&r.occurred_at),
                    r.kind.to_string(),
                    r.category.clone(),
                    r.amount.to_string(),
                    r.is_recurring.to_string(),
                    r.description.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = records
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "date": format_timestamp(&r.occurred_at),
                        "kind": r.kind,
                        "category": r.category,
                        "amount": r.amount.to_string(),
                        "recurring": r.is_recurring,
                        "description": r.description,
                        "external_id": r.external_id,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(records.len())
}
