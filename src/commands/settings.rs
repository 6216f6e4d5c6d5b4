// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::{self, NotificationSettings, TaxBasis, TaxRegime, TaxSettings};
use crate::utils::{account_by_name, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("tax", sub)) => tax(conn, sub)?,
        Some(("notify", sub)) => notify(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Applies only the options that were given on top of the stored value.
pub fn update_tax(conn: &Connection, sub: &clap::ArgMatches) -> Result<TaxSettings> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let mut tax: TaxSettings = settings::load(conn, acct.id)?;
    if let Some(r) = sub.get_one::<String>("regime") {
        tax.regime = r.parse::<TaxRegime>()?;
    }
    if let Some(r) = sub.get_one::<String>("rate") {
        tax.rate_percent = parse_decimal(r)?;
    }
    if let Some(b) = sub.get_one::<String>("basis") {
        tax.basis = b.parse::<TaxBasis>()?;
    }
    settings::save(conn, acct.id, &tax)?;
    Ok(tax)
}

fn tax(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tax = update_tax(conn, sub)?;
    println!(
        "Tax: {} regime, {}% on {}",
        tax.regime, tax.rate_percent, tax.basis
    );
    Ok(())
}

pub fn update_notifications(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<NotificationSettings> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let mut n: NotificationSettings = settings::load(conn, acct.id)?;
    if let Some(v) = sub.get_one::<bool>("sales_alerts") {
        n.sales_alerts = *v;
    }
    if let Some(v) = sub.get_one::<bool>("weekly_digest") {
        n.weekly_digest = *v;
    }
    if let Some(v) = sub.get_one::<bool>("email_reports") {
        n.email_reports = *v;
    }
    if let Some(v) = sub.get_one::<String>("low_margin") {
        n.low_margin_percent = match v.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "" => None,
            s => Some(parse_decimal(s)?),
        };
    }
    settings::save(conn, acct.id, &n)?;
    Ok(n)
}

fn notify(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let n = update_notifications(conn, sub)?;
    println!("Notifications updated: {}", serde_json::to_string(&n)?);
    Ok(())
}

#[derive(Serialize)]
struct AllSettings {
    tax: TaxSettings,
    notifications: NotificationSettings,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let all = AllSettings {
        tax: settings::load(conn, acct.id)?,
        notifications: settings::load(conn, acct.id)?,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &all)? {
        return Ok(());
    }
    let yn = |b: bool| (if b { "on" } else { "off" }).to_string();
    let data = vec![
        vec!["tax.regime".into(), all.tax.regime.to_string()],
        vec!["tax.rate_percent".into(), all.tax.rate_percent.to_string()],
        vec!["tax.basis".into(), all.tax.basis.to_string()],
        vec!["notify.sales_alerts".into(), yn(all.notifications.sales_alerts)],
        vec!["notify.weekly_digest".into(), yn(all.notifications.weekly_digest)],
        vec!["notify.email_reports".into(), yn(all.notifications.email_reports)],
        vec![
            "notify.low_margin_percent".into(),
            all.notifications
                .low_margin_percent
                .map(|p| p.to_string())
                .unwrap_or_else(|| "off".into()),
        ],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], data));
    Ok(())
}
