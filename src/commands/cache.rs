// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::Cache;
use anyhow::Result;

pub fn handle(cache: &dyn Cache, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("clear", _)) = m.subcommand() {
        let n = cache.clear()?;
        println!("Cleared {} cache entries", n);
    }
    Ok(())
}
