// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use financeinfo::cache::SqliteCache;
use financeinfo::config::{self, AppConfig};
use financeinfo::reader::LedgerReader;
use financeinfo::store::SqliteStore;
use financeinfo::{cli, commands, db};

fn main() -> Result<()> {
    config::init_logging();
    let cfg = AppConfig::from_env()?;
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init(&cfg)?;
    let store = SqliteStore::new(&conn);
    let cache = SqliteCache::new(&conn);
    cache.purge_expired()?;
    let reader = LedgerReader::new(&store, &cache).with_ttl(cfg.cache_ttl_secs);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path(&cfg)?.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&conn, sub)?,
        Some(("record", sub)) => commands::records::handle(&conn, &reader, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, &reader, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&conn, &reader, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &reader, sub)?,
        Some(("cache", sub)) => commands::cache::handle(&cache, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
