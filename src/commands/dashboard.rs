// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::dashboard;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, fmt_rate, get_currency, maybe_print_json, period_args, pretty_table, year_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("overview", sub)) => overview(conn, sub),
        Some(("asset-trend", sub)) => asset_trend(conn, sub),
        Some(("cashflow", sub)) => cashflow(conn, sub),
        Some(("distribution", sub)) => distribution(conn, sub),
        Some(("progress", sub)) => progress(conn, sub),
        Some(("target-trend", sub)) => target_trend(conn, sub),
        Some(("budget-pie", sub)) => budget_pie(conn, sub),
        _ => Ok(()),
    }
}

fn flags(sub: &clap::ArgMatches) -> (bool, bool) {
    (sub.get_flag("json"), sub.get_flag("jsonl"))
}

fn overview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let v = dashboard::overview(&SqliteStore::new(conn), year, month)?;
    let (json, jsonl) = flags(sub);
    if maybe_print_json(json, jsonl, &v)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = vec![
        vec!["Assets".to_string(), fmt_money(&v.total_asset, &ccy)],
        vec!["Liabilities".to_string(), fmt_money(&v.total_liability, &ccy)],
        vec!["Net worth".to_string(), fmt_money(&v.net_worth, &ccy)],
        vec!["Income".to_string(), fmt_money(&v.total_income, &ccy)],
        vec!["Expense".to_string(), fmt_money(&v.total_expense, &ccy)],
        vec!["Surplus".to_string(), fmt_money(&v.surplus, &ccy)],
    ];
    println!("{}-{:02}", v.year, v.month);
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

fn asset_trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let points = dashboard::asset_trend(&SqliteStore::new(conn), year)?;
    let (json, jsonl) = flags(sub);
    if !maybe_print_json(json, jsonl, &points)? {
        let rows = points
            .iter()
            .map(|p| {
                vec![
                    p.month.to_string(),
                    format!("{:.2}", p.asset),
                    format!("{:.2}", p.liability),
                    format!("{:.2}", p.net_worth),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Assets", "Liabilities", "Net worth"], rows)
        );
    }
    Ok(())
}

fn cashflow(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let points = dashboard::cashflow_trend(&SqliteStore::new(conn), year)?;
    let (json, jsonl) = flags(sub);
    if !maybe_print_json(json, jsonl, &points)? {
        let rows = points
            .iter()
            .map(|p| {
                vec![
                    p.month.to_string(),
                    format!("{:.2}", p.income),
                    format!("{:.2}", p.expense),
                    format!("{:.2}", p.surplus),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Surplus"], rows)
        );
    }
    Ok(())
}

fn distribution(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let slices = dashboard::asset_distribution(&SqliteStore::new(conn), year, month)?;
    let (json, jsonl) = flags(sub);
    if !maybe_print_json(json, jsonl, &slices)? {
        let rows = slices
            .iter()
            .map(|s| {
                vec![
                    s.label.to_string(),
                    format!("{:.2}", s.current_amount),
                    format!("{:.2}", s.target_amount),
                    fmt_rate(&s.percentage),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Group", "Current", "Target", "Reached"], rows)
        );
    }
    Ok(())
}

fn progress(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let Some(v) = dashboard::annual_progress(&SqliteStore::new(conn), year)? else {
        println!("No plan for {}", year);
        return Ok(());
    };
    let (json, jsonl) = flags(sub);
    if maybe_print_json(json, jsonl, &v)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    println!(
        "{} | monthly surplus {} | annual surplus {}",
        v.year,
        fmt_money(&v.monthly_surplus, &ccy),
        fmt_money(&v.annual_surplus, &ccy)
    );
    let rows = v
        .budget_progress
        .iter()
        .map(|b| {
            vec![
                b.category.clone(),
                format!("{:.2}", b.budget_amount),
                format!("{:.2}", b.spent_amount),
                format!("{:.2}", b.remaining_amount),
                fmt_rate(&b.execution_rate),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Budget", "Spent", "Remaining", "Executed"], rows)
    );
    Ok(())
}

fn target_trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let Some(v) = dashboard::target_trend(&SqliteStore::new(conn), year)? else {
        println!("No plan for {}", year);
        return Ok(());
    };
    let (json, jsonl) = flags(sub);
    if maybe_print_json(json, jsonl, &v)? {
        return Ok(());
    }
    let rows = v
        .months
        .iter()
        .map(|p| {
            vec![
                p.month.to_string(),
                format!("{:.2}", p.asset_target),
                p.asset_actual.map(|a| format!("{:.2}", a)).unwrap_or_else(|| "-".into()),
                format!("{:.2}", p.liability_target),
                p.liability_actual
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Month", "Asset target", "Assets", "Liability target", "Liabilities"],
            rows
        )
    );
    Ok(())
}

fn budget_pie(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let Some(v) = dashboard::budget_pie(&SqliteStore::new(conn), year)? else {
        println!("No plan for {}", year);
        return Ok(());
    };
    let (json, jsonl) = flags(sub);
    if maybe_print_json(json, jsonl, &v)? {
        return Ok(());
    }
    let rows = v
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                format!("{:.2}", c.budget_amount),
                format!("{:.2}", c.spent_amount),
                fmt_rate(&c.percentage),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Annual budget", "Spent", "Share"], rows)
    );
    let ccy = get_currency(conn)?;
    println!(
        "Total budget {} | total spent {}",
        fmt_money(&v.total_budget, &ccy),
        fmt_money(&v.total_spent, &ccy)
    );
    Ok(())
}
