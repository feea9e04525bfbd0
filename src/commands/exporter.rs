// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    AnnualExpenseInput, AnnualIncomeInput, AnnualPlan, AssetTargetInput, LiabilityTargetInput,
    MonthlyRecord, PlanRequest,
};
use crate::utils::{period_args, required_arg, year_arg};
use crate::{plan, records};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("records", sub)) => export_records(conn, sub),
        Some(("record", sub)) => export_record(conn, sub),
        Some(("plan", sub)) => export_plan(conn, sub),
        Some(("full", sub)) => export_full(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
struct MonthRow {
    year: i32,
    month: u32,
    total_asset: Decimal,
    total_liability: Decimal,
    net_worth: Decimal,
    total_income: Decimal,
    total_expense: Decimal,
    surplus: Decimal,
}

fn export_records(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required_arg(sub, "format")?.trim().to_lowercase();
    let out = required_arg(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }
    let year = year_arg(sub)?;

    let rows: Vec<MonthRow> = records::records_for_year(conn, year)?
        .iter()
        .map(|r| -> crate::Result<MonthRow> {
            Ok(MonthRow {
                year: r.year,
                month: r.month,
                total_asset: r.total_asset,
                total_liability: r.total_liability,
                net_worth: r.net_worth()?,
                total_income: r.total_income,
                total_expense: r.total_expense,
                surplus: r.surplus()?,
            })
        })
        .collect::<crate::Result<Vec<_>>>()?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        for row in &rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    println!("Exported {} records for {} to {}", rows.len(), year, out);
    Ok(())
}

/// One line of a month in the shape `import record` reads back.
#[derive(Debug, Serialize)]
struct LineRow<'a> {
    section: &'static str,
    group: Option<&'static str>,
    name: &'a str,
    amount: Decimal,
    rate: Option<Decimal>,
    note: Option<&'a str>,
    category_id: Option<i64>,
}

fn line_rows(r: &MonthlyRecord) -> Vec<LineRow<'_>> {
    let mut rows = Vec::new();
    for a in &r.asset_details {
        rows.push(LineRow {
            section: "asset",
            group: Some(a.group.as_str()),
            name: &a.name,
            amount: a.amount,
            rate: a.return_rate,
            note: None,
            category_id: None,
        });
    }
    for l in &r.liability_details {
        rows.push(LineRow {
            section: "liability",
            group: None,
            name: &l.name,
            amount: l.amount,
            rate: l.interest_rate,
            note: None,
            category_id: None,
        });
    }
    for i in &r.income_details {
        rows.push(LineRow {
            section: "income",
            group: None,
            name: &i.name,
            amount: i.amount,
            rate: None,
            note: None,
            category_id: None,
        });
    }
    for e in &r.expense_details {
        rows.push(LineRow {
            section: "expense",
            group: None,
            name: &e.name,
            amount: e.amount,
            rate: None,
            note: e.detail.as_deref(),
            category_id: e.annual_expense_id,
        });
    }
    rows
}

fn export_record(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let out = required_arg(sub, "out")?;
    let r = records::get_record(conn, year, month)?;
    let rows = line_rows(&r);

    let mut wtr = csv::Writer::from_path(out)?;
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    println!("Exported {} lines of {}-{:02} to {}", rows.len(), year, month, out);
    Ok(())
}

#[derive(Debug, Serialize)]
struct FullExport {
    year: i32,
    plan: Option<AnnualPlan>,
    records: Vec<MonthlyRecord>,
}

fn export_full(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let out = required_arg(sub, "out")?;
    let plan = match plan::get_plan(conn, year) {
        Ok(p) => Some(p),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e.into()),
    };
    let doc = FullExport {
        year,
        plan,
        records: records::records_for_year(conn, year)?,
    };
    std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
    println!(
        "Exported plan and {} records for {} to {}",
        doc.records.len(),
        year,
        out
    );
    Ok(())
}

fn export_plan(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let out = required_arg(sub, "out")?;
    let p = plan::get_plan(conn, year)?;
    std::fs::write(out, serde_json::to_string_pretty(&plan_request(&p))?)?;
    println!("Exported plan {} to {}", year, out);
    Ok(())
}

/// The request that recreates `p` when imported.
pub fn plan_request(p: &AnnualPlan) -> PlanRequest {
    PlanRequest {
        year: p.year,
        asset_targets: Some(
            p.asset_targets
                .iter()
                .map(|t| AssetTargetInput {
                    group: Some(t.group),
                    name: t.name.clone(),
                    target_amount: Some(t.target_amount),
                    allocation_percentage: t.allocation_percentage,
                    expected_return_rate: t.expected_return_rate,
                    sort_order: Some(t.sort_order),
                })
                .collect(),
        ),
        liability_targets: Some(
            p.liability_targets
                .iter()
                .map(|t| LiabilityTargetInput {
                    group: Some(t.group),
                    name: t.name.clone(),
                    target_balance: Some(t.target_balance),
                    interest_rate: t.interest_rate,
                    sort_order: Some(t.sort_order),
                })
                .collect(),
        ),
        annual_incomes: Some(
            p.annual_incomes
                .iter()
                .map(|i| AnnualIncomeInput {
                    income_type: Some(i.income_type),
                    name: i.name.clone(),
                    amount: Some(i.amount),
                    is_monthly: Some(i.is_monthly),
                    remark: i.remark.clone(),
                    sort_order: Some(i.sort_order),
                })
                .collect(),
        ),
        annual_expenses: Some(
            p.annual_expenses
                .iter()
                .map(|c| AnnualExpenseInput {
                    parent_group: Some(c.parent_group),
                    category: c.category.clone(),
                    budget_amount: Some(c.budget_amount),
                    is_monthly: Some(c.is_monthly),
                    sort_order: Some(c.sort_order),
                })
                .collect(),
        ),
    }
}
