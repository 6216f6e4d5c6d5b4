// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let ccy = sub.get_one::<String>("currency").unwrap().trim().to_uppercase();
            add(conn, name, &ccy)?;
            println!("Added account '{}' ({})", name, ccy);
        }
        Some(("list", _)) => {
            let mut stmt = conn
                .prepare("SELECT name, currency, created_at, (SELECT COUNT(*) FROM records r WHERE r.owner_id=a.id) FROM accounts a ORDER BY name")?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, i64>(3)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, c, cr, cnt) = row?;
                data.push(vec![n, c, cr, cnt.to_string()]);
            }
            println!(
                "{}",
                pretty_table(&["Name", "Currency", "Created", "Records"], data)
            );
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
            if n == 0 {
                bail!("Account '{}' not found", name);
            }
            info!(account = name, "account removed with its records");
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, name: &str, currency: &str) -> Result<i64> {
    if name.is_empty() {
        bail!("Account name must not be empty");
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("Invalid currency '{}', expected a 3-letter code", currency);
    }
    conn.execute(
        "INSERT INTO accounts(name, currency) VALUES (?1, ?2)",
        params![name, currency],
    )
    .with_context(|| format!("Could not add account '{}'", name))?;
    Ok(conn.last_insert_rowid())
}
