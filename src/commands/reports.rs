// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::LedgerSummary;
use crate::commands::filter_from_args;
use crate::filter::RecordFilter;
use crate::overview::{Overview, cashflow, overview};
use crate::reader::LedgerReader;
use crate::settings::{self, TaxSettings};
use crate::utils::{account_by_name, fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, reader: &LedgerReader<'_>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, reader, sub)?,
        Some(("overview", sub)) => overview_report(conn, reader, sub)?,
        Some(("cashflow", sub)) => cashflow_report(conn, reader, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn summary_for(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    sub: &clap::ArgMatches,
) -> Result<LedgerSummary> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let filter = filter_from_args(sub)?;
    Ok(reader.summarize(acct.id, &filter)?)
}

fn summary(conn: &Connection, reader: &LedgerReader<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let s = summary_for(conn, reader, sub)?;
    let items = if sub.get_flag("ranked") {
        s.ranked()
    } else {
        s.categories()
    };
    if jsonl_flag {
        maybe_print_json(false, true, &items)?;
        return Ok(());
    }
    if maybe_print_json(json_flag, false, &s)? {
        return Ok(());
    }
    let mut data: Vec<Vec<String>> = items
        .into_iter()
        .map(|c| vec![c.category, c.count.to_string(), format!("{:.2}", c.total)])
        .collect();
    data.push(vec![
        "TOTAL".into(),
        s.record_count.to_string(),
        format!("{:.2}", s.total),
    ]);
    println!("{}", pretty_table(&["Category", "Count", "Total"], data));
    Ok(())
}

pub fn overview_for(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    sub: &clap::ArgMatches,
) -> Result<(Overview, String)> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let records = reader.records(acct.id, &RecordFilter::new().between(from, to))?;
    let tax: TaxSettings = settings::load(conn, acct.id)?;
    Ok((overview(&records, &tax), acct.currency))
}

fn overview_report(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let (o, ccy) = overview_for(conn, reader, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &o)? {
        return Ok(());
    }
    let pct = |v: Option<rust_decimal::Decimal>, suffix: &str| {
        v.map(|x| format!("{:.2}{}", x, suffix))
            .unwrap_or_else(|| "-".into())
    };
    let data = vec![
        vec!["Revenue".to_string(), fmt_money(&o.revenue, &ccy)],
        vec!["Expenses".to_string(), fmt_money(&o.expenses, &ccy)],
        vec!["Ad spend".to_string(), fmt_money(&o.ad_spend, &ccy)],
        vec!["Gross profit".to_string(), fmt_money(&o.gross_profit, &ccy)],
        vec!["Estimated tax".to_string(), fmt_money(&o.estimated_tax, &ccy)],
        vec!["Net profit".to_string(), fmt_money(&o.net_profit, &ccy)],
        vec!["ROAS".to_string(), pct(o.roas, "x")],
        vec!["Net margin".to_string(), pct(o.margin_percent, "%")],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], data));
    Ok(())
}

fn cashflow_report(
    conn: &Connection,
    reader: &LedgerReader<'_>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let acct = account_by_name(conn, sub.get_one::<String>("account").unwrap())?;
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let records = reader.records(acct.id, &RecordFilter::new())?;
    let flows = cashflow(&records, months);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &flows)? {
        return Ok(());
    }
    let data = flows
        .into_iter()
        .map(|f| {
            vec![
                f.month,
                format!("{:.2}", f.revenue),
                format!("{:.2}", f.costs),
                format!("{:.2}", f.net),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Revenue", "Costs", "Net"], data));
    Ok(())
}
