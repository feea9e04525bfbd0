// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    AssetDetailInput, AssetGroup, ExpenseDetailInput, IncomeDetailInput, LiabilityDetailInput,
    PlanRequest, RecordLines,
};
use crate::utils::{parse_decimal, parse_opt_decimal, period_args, read_json_file, required_arg};
use crate::{plan, records};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => import_record(conn, sub),
        Some(("plan", sub)) => import_plan(conn, sub),
        _ => Ok(()),
    }
}

fn import_record(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let path = required_arg(sub, "path")?.trim();
    let lines = read_record_csv(path)?;
    let record = records::import_lines(conn, year, month, &lines)
        .with_context(|| format!("Import {}-{:02} from {}", year, month, path))?;
    println!(
        "Imported {} lines into {}-{:02} from {}",
        record.asset_details.len()
            + record.liability_details.len()
            + record.income_details.len()
            + record.expense_details.len(),
        year,
        month,
        path
    );
    Ok(())
}

fn import_plan(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = required_arg(sub, "path")?.trim();
    let req: PlanRequest = read_json_file(path)?;
    let p = plan::create_or_update_plan(conn, &req)
        .with_context(|| format!("Import plan from {}", path))?;
    println!("Imported plan {} from {}", p.year, path);
    Ok(())
}

/// Parses a month's lines from CSV with the header
/// `section,group,name,amount,rate,note,category_id`.
///
/// Rows without a name are skipped. Any malformed value fails the whole file.
pub fn read_record_csv(path: &str) -> Result<RecordLines> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    let mut incomes = Vec::new();
    let mut expenses = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let rec = result?;
        let line = idx + 2;
        let section = rec.get(0).unwrap_or("").trim().to_ascii_lowercase();
        let group = rec.get(1).unwrap_or("").trim();
        let name = rec.get(2).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let amount_raw = rec.get(3).unwrap_or("").trim();
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Invalid amount '{}' for {} (line {})", amount_raw, name, line))?;
        let rate_raw = rec.get(4).unwrap_or("");
        let rate = parse_opt_decimal(rate_raw)
            .with_context(|| format!("Invalid rate '{}' for {} (line {})", rate_raw.trim(), name, line))?;
        let note = rec
            .get(5)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let category_raw = rec.get(6).unwrap_or("").trim();
        let category_id = if category_raw.is_empty() {
            None
        } else {
            Some(category_raw.parse::<i64>().with_context(|| {
                format!("Invalid category id '{}' for {} (line {})", category_raw, name, line)
            })?)
        };

        match section.as_str() {
            "asset" => {
                let group = group
                    .parse::<AssetGroup>()
                    .with_context(|| format!("Invalid asset group '{}' for {} (line {})", group, name, line))?;
                let sort_order = Some(assets.len() as i32);
                assets.push(AssetDetailInput {
                    group: Some(group),
                    name,
                    amount: Some(amount),
                    return_rate: rate,
                    sort_order,
                });
            }
            "liability" => {
                let sort_order = Some(liabilities.len() as i32);
                liabilities.push(LiabilityDetailInput {
                    name,
                    amount: Some(amount),
                    interest_rate: rate,
                    sort_order,
                });
            }
            "income" => {
                let sort_order = Some(incomes.len() as i32);
                incomes.push(IncomeDetailInput {
                    name,
                    amount: Some(amount),
                    sort_order,
                });
            }
            "expense" => {
                let sort_order = Some(expenses.len() as i32);
                expenses.push(ExpenseDetailInput {
                    annual_expense_id: category_id,
                    name,
                    amount: Some(amount),
                    detail: note,
                    sort_order,
                });
            }
            other => {
                return Err(anyhow!(
                    "Unknown section '{}' for {} (line {}), expected asset|liability|income|expense",
                    other,
                    name,
                    line
                ));
            }
        }
    }

    Ok(RecordLines {
        asset_details: Some(assets),
        liability_details: Some(liabilities),
        income_details: Some(incomes),
        expense_details: Some(expenses),
    })
}
