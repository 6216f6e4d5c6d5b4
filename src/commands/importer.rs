// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::kirvano::{self, IngestReport};
use crate::models::{NewRecord, RecordKind};
use crate::reader::LedgerReader;
use crate::utils::{account_by_name, parse_bool, parse_decimal, parse_timestamp};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::io::Read;
use tracing::info;

pub fn handle(conn: &Connection, reader: &LedgerReader<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => {
            let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
            let path = sub.get_one::<String>("path").unwrap().trim();
            let n = import_csv(conn, reader, acct.id, path)?;
            println!("Imported {} records from {}", n, path);
        }
        Some(("kirvano", sub)) => {
            let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
            let path = sub.get_one::<String>("path").unwrap().trim();
            let r = import_kirvano(conn, reader, acct.id, path)?;
            println!(
                "Kirvano: {} created, {} already recorded, {} ignored",
                r.created, r.duplicates, r.skipped
            );
        }
        _ => {}
    }
    Ok(())
}

/// Reads `date,kind,category,amount[,recurring[,description]]` rows. The
/// whole file is validated before anything is written.
pub fn parse_csv<R: Read>(input: R, owner_id: i64) -> Result<Vec<NewRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?;
        let kind_raw = rec.get(1).context("kind missing")?;
        let category = rec.get(2).context("category missing")?.to_string();
        let amount_raw = rec.get(3).context("amount missing")?;
        let recurring = parse_bool(rec.get(4).unwrap_or(""))
            .with_context(|| format!("line {}: bad recurring flag", line))?;
        let description = rec
            .get(5)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        if category.is_empty() {
            anyhow::bail!("line {}: category must not be empty", line);
        }
        out.push(NewRecord {
            owner_id,
            kind: kind_raw
                .parse::<RecordKind>()
                .with_context(|| format!("line {}", line))?,
            category,
            amount: parse_decimal(amount_raw)
                .with_context(|| format!("line {}: invalid amount", line))?,
            occurred_at: parse_timestamp(date_raw)
                .with_context(|| format!("line {}: invalid date", line))?,
            is_recurring: recurring,
            description,
            external_id: None,
        });
    }
    Ok(out)
}

pub fn import_csv(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    owner_id: i64,
    path: &str,
) -> Result<usize> {
    let file = std::fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
    let rows = parse_csv(file, owner_id)?;
    let tx = conn.unchecked_transaction()?;
    for row in rows.iter().cloned() {
        reader.record(row)?;
    }
    tx.commit()?;
    info!(owner_id, count = rows.len(), path, "csv import committed");
    Ok(rows.len())
}

pub fn import_kirvano(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    owner_id: i64,
    path: &str,
) -> Result<IngestReport> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
    let events = kirvano::parse_payloads(&raw)
        .with_context(|| format!("Invalid Kirvano payload in {}", path))?;
    let tx = conn.unchecked_transaction()?;
    let report = kirvano::ingest(reader, owner_id, &events)?;
    tx.commit()?;
    Ok(report)
}
