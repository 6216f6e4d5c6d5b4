// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use financeinfo::cache::{Cache, SqliteCache};
use financeinfo::commands::{accounts, exporter, importer, records, reports, settings};
use financeinfo::settings::{TaxBasis, TaxRegime};
use financeinfo::store::SqliteStore;
use financeinfo::{LedgerReader, cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;
use tempfile::{NamedTempFile, tempdir};

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    accounts::add(&conn, "shop", "BRL").unwrap();
    conn
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["financeinfo"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let (_, group) = matches.subcommand().expect("command");
    let (_, leaf) = group.subcommand().expect("subcommand");
    leaf.clone()
}

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const CSV: &str = "date,kind,category,amount,recurring,description
2025-03-01,sale,course,97.00,yes,launch
2025-03-02,ad_spend,meta ads,40.00,,
2025-03-05,expense,hosting,29.90,true,monthly plan
2025-04-01,sale,course,97.00,no,
";

fn write_tmp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn csv_import_then_summary_via_cli() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let cache = SqliteCache::new(&conn);
    let reader = LedgerReader::new(&store, &cache);
    let f = write_tmp(CSV);
    let acct = financeinfo::utils::account_by_name(&conn, "shop").unwrap();
    let n = importer::import_csv(&conn, &reader, acct.id, f.path().to_str().unwrap()).unwrap();
    assert_eq!(n, 4);

    let m = sub_matches(&["report", "summary", "-a", "shop", "--kind", "sale"]);
    let s = reports::summary_for(&conn, &reader, &m).unwrap();
    assert_eq!(s.get("course").unwrap().count, 2);
    assert_eq!(s.total, d("194.00"));

    let m = sub_matches(&["record", "list", "-a", "shop", "--recurring", "true"]);
    let rows = records::query_records(&conn, &reader, &m).unwrap();
    let cats: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(cats, vec!["course", "hosting"]);
}

#[test]
fn csv_import_is_all_or_nothing() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let cache = SqliteCache::new(&conn);
    let reader = LedgerReader::new(&store, &cache);
    let f = write_tmp("date,kind,category,amount\n2025-03-01,sale,course,97.00\n2025-03-02,refund,course,1\n");
    let err = importer::import_csv(&conn, &reader, 1, f.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn kirvano_import_dedupes_and_feeds_overview() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let cache = SqliteCache::new(&conn);
    let reader = LedgerReader::new(&store, &cache);
    let payload = r#"[
        {"event":"SALE_APPROVED","sale_id":"K1","created_at":"2025-05-01 10:00:00","total_price":"R$ 200,00","type":"ONE_TIME","products":[{"name":"Mentoria"}]},
        {"event":"SALE_APPROVED","sale_id":"K2","created_at":"2025-05-02 10:00:00","total_price":"R$ 100,00","type":"RECURRING","products":[{"name":"Clube"}]},
        {"event":"SALE_REFUNDED","sale_id":"K2","created_at":"2025-05-03 10:00:00","total_price":"R$ 100,00","products":[{"name":"Clube"}]},
        {"event":"PIX_GENERATED","sale_id":"K3","created_at":"2025-05-03 11:00:00","total_price":"R$ 50,00"}
    ]"#;
    let f = write_tmp(payload);
    let path = f.path().to_str().unwrap();
    let r = importer::import_kirvano(&conn, &reader, 1, path).unwrap();
    assert_eq!((r.created, r.duplicates, r.skipped), (3, 0, 1));
    let again = importer::import_kirvano(&conn, &reader, 1, path).unwrap();
    assert_eq!((again.created, again.duplicates), (0, 3));

    let m = sub_matches(&["settings", "tax", "-a", "shop", "--rate", "10"]);
    settings::update_tax(&conn, &m).unwrap();
    let m = sub_matches(&["report", "overview", "-a", "shop"]);
    let (o, ccy) = reports::overview_for(&conn, &reader, &m).unwrap();
    assert_eq!(ccy, "BRL");
    assert_eq!(o.revenue, d("200.00"));
    assert_eq!(o.estimated_tax, d("20.00"));
    assert_eq!(o.roas, None);
}

#[test]
fn settings_update_partially_and_validate() {
    let conn = setup();
    let m = sub_matches(&["settings", "tax", "-a", "shop", "--regime", "presumed", "--basis", "profit"]);
    let tax = settings::update_tax(&conn, &m).unwrap();
    assert_eq!(tax.regime, TaxRegime::Presumed);
    assert_eq!(tax.basis, TaxBasis::Profit);
    assert_eq!(tax.rate_percent, d("6"));

    let m = sub_matches(&["settings", "tax", "-a", "shop", "--rate", "150"]);
    assert!(settings::update_tax(&conn, &m).is_err());

    let m = sub_matches(&["settings", "notify", "-a", "shop", "--weekly-digest", "true", "--low-margin", "15"]);
    let n = settings::update_notifications(&conn, &m).unwrap();
    assert!(n.weekly_digest);
    assert_eq!(n.low_margin_percent, Some(d("15")));
    let m = sub_matches(&["settings", "notify", "-a", "shop", "--low-margin", "off"]);
    let n = settings::update_notifications(&conn, &m).unwrap();
    assert!(n.weekly_digest);
    assert_eq!(n.low_margin_percent, None);
}

#[test]
fn export_csv_reimports_cleanly() {
    let conn = setup();
    accounts::add(&conn, "mirror", "BRL").unwrap();
    let store = SqliteStore::new(&conn);
    let cache = SqliteCache::new(&conn);
    let reader = LedgerReader::new(&store, &cache);
    let f = write_tmp(CSV);
    importer::import_csv(&conn, &reader, 1, f.path().to_str().unwrap()).unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("records.csv");
    let out_str = out.to_string_lossy().to_string();
    assert_eq!(exporter::export_records(&reader, 1, "csv", &out_str).unwrap(), 4);
    importer::import_csv(&conn, &reader, 2, &out_str).unwrap();

    let filter = financeinfo::RecordFilter::new();
    assert_eq!(
        reader.summarize(1, &filter).unwrap().by_category,
        reader.summarize(2, &filter).unwrap().by_category
    );

    let json_out = dir.path().join("records.json");
    exporter::export_records(&reader, 1, "json", json_out.to_str().unwrap()).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
    assert_eq!(v[1]["kind"], "ad_spend");
    assert_eq!(v[1]["amount"], "40.00");
    assert!(exporter::export_records(&reader, 1, "xml", &out_str).is_err());
}

#[test]
fn bad_date_range_rejected() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let cache = SqliteCache::new(&conn);
    let reader = LedgerReader::new(&store, &cache);
    let m = sub_matches(&["report", "summary", "-a", "shop", "--from", "2025-05-01", "--to", "2025-04-01"]);
    assert!(reports::summary_for(&conn, &reader, &m).is_err());
    assert_eq!(cache.clear().unwrap(), 0);
}
