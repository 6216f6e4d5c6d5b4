// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod kirvano;
pub mod models;
pub mod overview;
pub mod reader;
pub mod settings;
pub mod store;
pub mod utils;

pub use aggregate::{CategorySummary, CategoryTotals, LedgerSummary, aggregate};
pub use error::{LedgerError, LedgerResult};
pub use filter::RecordFilter;
pub use models::{Account, FinancialRecord, NewRecord, RecordKind};
pub use reader::LedgerReader;
