// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod cache;
pub mod exporter;
pub mod importer;
pub mod records;
pub mod reports;
pub mod settings;

use anyhow::Result;

use crate::filter::RecordFilter;
use crate::models::RecordKind;
use crate::utils::parse_date;

/// Builds a filter from the shared `--kind/--category/--recurring/--from/--to`
/// arguments.
pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<RecordFilter> {
    let mut f = RecordFilter::new();
    if let Some(k) = sub.get_one::<String>("kind") {
        f = f.kind(k.parse::<RecordKind>()?);
    }
    if let Some(c) = sub
        .get_one::<String>("category")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        f = f.category(c);
    }
    if let Some(r) = sub.get_one::<bool>("recurring") {
        f = f.recurring(*r);
    }
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    if let (Some(a), Some(b)) = (from, to) {
        if a > b {
            anyhow::bail!("--from {} is after --to {}", a, b);
        }
    }
    Ok(f.between(from, to))
}
