// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors raised by the ledger library. Command handlers wrap these in
/// `anyhow` with extra context.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("record store: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("cache: {0}")]
    Cache(String),
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
