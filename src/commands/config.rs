// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::utils::{get_currency, maybe_print_json, pretty_table, required_arg, set_currency};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub),
        Some(("set-currency", sub)) => {
            set_currency(conn, required_arg(sub, "code")?)?;
            println!("Currency set to {}", get_currency(conn)?);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = db::db_path()?;
    let currency = get_currency(conn)?;
    let v = json!({
        "database": path.display().to_string(),
        "currency": currency.clone(),
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        let rows = vec![
            vec!["database".to_string(), path.display().to_string()],
            vec!["currency".to_string(), currency],
        ];
        println!("{}", pretty_table(&["Setting", "Value"], rows));
    }
    Ok(())
}
