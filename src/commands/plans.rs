// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AnnualPlan, PlanRequest};
use crate::plan;
use crate::utils::{
    fmt_money, fmt_rate, get_currency, maybe_print_json, pretty_table, read_json_file,
    required_arg, year_arg,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub),
        Some(("set", sub)) => set(conn, sub),
        Some(("summary", sub)) => summary(conn, sub),
        Some(("years", sub)) => years(conn, sub),
        _ => Ok(()),
    }
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let p = plan::get_plan(conn, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        return Ok(());
    }
    print_plan(conn, &p)
}

fn set(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = required_arg(sub, "file")?;
    let req: PlanRequest = read_json_file(path)?;
    let p = plan::create_or_update_plan(conn, &req)
        .with_context(|| format!("Save plan {}", req.year))?;
    let ccy = get_currency(conn)?;
    println!(
        "Plan {} saved: monthly surplus {}, annual surplus {}",
        p.year,
        fmt_money(&p.monthly_surplus, &ccy),
        fmt_money(&p.annual_surplus, &ccy)
    );
    Ok(())
}

fn summary(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let p = plan::plan_summary(conn, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        return Ok(());
    }
    print_plan(conn, &p)
}

fn years(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let years = plan::plan_years(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &years)? {
        let rows = years.iter().map(|y| vec![y.to_string()]).collect();
        println!("{}", pretty_table(&["Year"], rows));
    }
    Ok(())
}

fn print_plan(conn: &Connection, p: &AnnualPlan) -> Result<()> {
    let ccy = get_currency(conn)?;
    println!(
        "Plan {} | monthly surplus {} | annual surplus {}",
        p.year,
        fmt_money(&p.monthly_surplus, &ccy),
        fmt_money(&p.annual_surplus, &ccy)
    );

    if !p.asset_targets.is_empty() {
        let rows = p
            .asset_targets
            .iter()
            .map(|t| {
                vec![
                    t.group.label().to_string(),
                    t.name.clone(),
                    format!("{:.2}", t.target_amount),
                    t.allocation_percentage.map(|v| fmt_rate(&v)).unwrap_or_default(),
                    t.expected_return_rate.map(|v| fmt_rate(&v)).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Group", "Asset", "Target", "Allocation", "Return"], rows)
        );
    }

    if !p.liability_targets.is_empty() {
        let rows = p
            .liability_targets
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    format!("{:.2}", t.target_balance),
                    t.interest_rate.map(|v| fmt_rate(&v)).unwrap_or_default(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Liability", "Target balance", "Rate"], rows));
    }

    if !p.annual_incomes.is_empty() {
        let rows = p
            .annual_incomes
            .iter()
            .map(|i| {
                vec![
                    i.income_type.as_str().to_string(),
                    i.name.clone(),
                    format!("{:.2}", i.amount),
                    if i.is_monthly { "monthly" } else { "once" }.to_string(),
                    i.remark.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Type", "Income", "Amount", "Cadence", "Remark"], rows)
        );
    }

    if !p.annual_expenses.is_empty() {
        let rows = p
            .annual_expenses
            .iter()
            .map(|c| -> crate::Result<Vec<String>> {
                Ok(vec![
                    c.id.map(|id| id.to_string()).unwrap_or_default(),
                    c.parent_group.as_str().to_string(),
                    c.category.clone(),
                    format!("{:.2}", c.budget_amount),
                    if c.is_monthly { "monthly" } else { "once" }.to_string(),
                    format!("{:.2}", c.spent_amount),
                    format!("{:.2}", c.remaining_amount()?),
                    fmt_rate(&c.execution_rate()?),
                ])
            })
            .collect::<crate::Result<Vec<_>>>()?;
        println!(
            "{}",
            pretty_table(
                &["Id", "Group", "Category", "Budget", "Cadence", "Spent", "Remaining", "Executed"],
                rows
            )
        );
    }
    Ok(())
}
