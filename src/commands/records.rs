// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::filter_from_args;
use crate::filter::RecordFilter;
use crate::models::{FinancialRecord, NewRecord, RecordKind};
use crate::reader::LedgerReader;
use crate::utils::{account_by_name, maybe_print_json, parse_decimal, parse_timestamp, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, reader: &LedgerReader<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, reader, sub)?,
        Some(("list", sub)) => list(conn, reader, sub)?,
        Some(("rm", sub)) => rm(conn, reader, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, reader: &LedgerReader<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let kind = sub.get_one::<String>("kind").unwrap().parse::<RecordKind>()?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let occurred_at = parse_timestamp(sub.get_one::<String>("date").unwrap())?;
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let rec = reader.record(NewRecord {
        owner_id: acct.id,
        kind,
        category,
        amount,
        occurred_at,
        is_recurring: sub.get_flag("recurring"),
        description,
        external_id: None,
    })?;
    println!(
        "Recorded #{} {} {:.2} {} in '{}' on {}",
        rec.id,
        rec.kind,
        rec.amount,
        acct.currency,
        rec.category,
        rec.occurred_at.date_naive()
    );
    Ok(())
}

/// Records of the named account matching the command's filter arguments.
pub fn query_records(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    sub: &clap::ArgMatches,
) -> Result<Vec<FinancialRecord>> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let mut filter: RecordFilter = filter_from_args(sub)?;
    if let Some(limit) = sub.get_one::<usize>("limit") {
        filter = filter.limit(*limit);
    }
    Ok(reader.records(acct.id, &filter)?)
}

fn list(conn: &Connection, reader: &LedgerReader<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_records(conn, reader, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.occurred_at.date_naive().to_string(),
                    r.kind.to_string(),
                    r.category.clone(),
                    format!("{:.2}", r.amount),
                    if r.is_recurring { "yes".into() } else { String::new() },
                    r.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Category", "Amount", "Recurring", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, reader: &LedgerReader<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let id = *sub.get_one::<i64>("id").unwrap();
    if !reader.delete(acct.id, id)? {
        bail!("Record {} not found for account '{}'", id, acct.name);
    }
    println!("Removed record {}", id);
    Ok(())
}
