// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Household annual plan and monthly ledger: surplus planning, budget
//! execution from linked actuals, and month-to-month carry-forward.

pub mod amount;
pub mod budget;
pub mod carry;
pub mod cli;
pub mod commands;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod plan;
pub mod reconcile;
pub mod records;
pub mod store;
pub mod utils;

pub use error::{LedgerError, Result};

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Installs the stderr subscriber once. `RUST_LOG` overrides the default
/// `moneyplan=warn` filter.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("moneyplan=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
