// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DB_ENV: &str = "FINANCEINFO_DB";
pub const CACHE_TTL_ENV: &str = "FINANCEINFO_CACHE_TTL";
pub const LOG_ENV: &str = "FINANCEINFO_LOG";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Process-level configuration, resolved once in `main` and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Explicit database file; `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from an arbitrary variable source so tests do not
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        if let Some(p) = lookup(DB_ENV).map(|s| s.trim().to_string()) {
            if !p.is_empty() {
                cfg.db_path = Some(PathBuf::from(p));
            }
        }
        if let Some(raw) = lookup(CACHE_TTL_ENV) {
            let raw = raw.trim();
            if !raw.is_empty() {
                cfg.cache_ttl_secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("Invalid {} '{}', expected seconds", CACHE_TTL_ENV, raw))?;
            }
        }
        Ok(cfg)
    }
}

/// Installs the global `tracing` subscriber. Events go to stderr so that
/// table and JSON output on stdout stay machine readable.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(env(&[
            (DB_ENV, " /tmp/fi.sqlite "),
            (CACHE_TTL_ENV, "60"),
        ]))
        .unwrap();
        assert_eq!(cfg.db_path, Some(PathBuf::from("/tmp/fi.sqlite")));
        assert_eq!(cfg.cache_ttl_secs, 60);
    }

    #[test]
    fn rejects_bad_ttl() {
        let err = AppConfig::from_lookup(env(&[(CACHE_TTL_ENV, "soon")])).unwrap_err();
        assert!(err.to_string().contains(CACHE_TTL_ENV));
    }
}
