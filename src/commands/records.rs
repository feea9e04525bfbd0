// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{MonthlyRecord, RecordLines, RecordRequest};
use crate::records;
use crate::utils::{
    fmt_money, fmt_rate, get_currency, maybe_print_json, parse_month, parse_year, period_args,
    pretty_table, read_json_file, required_arg, year_arg,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub),
        Some(("list", sub)) => list(conn, sub),
        Some(("create", sub)) => create(conn, sub),
        Some(("update", sub)) => update(conn, sub),
        Some(("delete", sub)) => delete(conn, sub),
        Some(("template", sub)) => template(conn, sub),
        _ => Ok(()),
    }
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = required_arg(sub, "id")?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid record id '{}'", raw))
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let r = records::get_record(conn, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        return Ok(());
    }
    print_record(conn, &r)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_arg(sub)?;
    let items = records::records_for_year(conn, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|r| -> crate::Result<Vec<String>> {
            Ok(vec![
                r.id.map(|id| id.to_string()).unwrap_or_default(),
                format!("{}-{:02}", r.year, r.month),
                format!("{:.2}", r.total_asset),
                format!("{:.2}", r.total_liability),
                format!("{:.2}", r.net_worth()?),
                format!("{:.2}", r.total_income),
                format!("{:.2}", r.total_expense),
                format!("{:.2}", r.surplus()?),
            ])
        })
        .collect::<crate::Result<Vec<_>>>()?;
    println!(
        "{}",
        pretty_table(
            &["Id", "Month", "Assets", "Liabilities", "Net worth", "Income", "Expense", "Surplus"],
            rows
        )
    );
    Ok(())
}

fn create(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let lines: RecordLines = match sub.get_one::<String>("lines") {
        Some(path) => read_json_file(path)?,
        None => RecordLines::default(),
    };
    let req = RecordRequest {
        year,
        month,
        summary: sub.get_one::<String>("summary").cloned(),
        lines,
    };
    let r = records::create_record(conn, &req)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        return Ok(());
    }
    println!(
        "Created record {}-{:02} (id {})",
        r.year,
        r.month,
        r.id.unwrap_or_default()
    );
    Ok(())
}

fn update(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let current = records::get_record_by_id(conn, id)?;
    let year = match sub.get_one::<String>("year") {
        Some(y) => parse_year(y)?,
        None => current.year,
    };
    let month = match sub.get_one::<String>("month") {
        Some(v) => parse_month(v)?,
        None => current.month,
    };
    let lines: RecordLines = read_json_file(required_arg(sub, "lines")?)?;
    let req = RecordRequest {
        year,
        month,
        summary: sub
            .get_one::<String>("summary")
            .cloned()
            .or(current.summary),
        lines,
    };
    let r = records::update_record(conn, id, &req)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        return Ok(());
    }
    println!("Updated record {}-{:02} (id {})", r.year, r.month, id);
    Ok(())
}

fn delete(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    records::delete_record(conn, id)?;
    println!("Deleted record {}", id);
    Ok(())
}

fn template(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period_args(sub)?;
    let r = records::previous_template(conn, year, month)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        return Ok(());
    }
    print_record(conn, &r)
}

fn print_record(conn: &Connection, r: &MonthlyRecord) -> Result<()> {
    let ccy = get_currency(conn)?;
    println!(
        "{}-{:02} | net worth {} | surplus {}",
        r.year,
        r.month,
        fmt_money(&r.net_worth()?, &ccy),
        fmt_money(&r.surplus()?, &ccy)
    );
    if let Some(s) = &r.summary {
        println!("{}", s);
    }

    let mut rows = Vec::new();
    for d in &r.asset_details {
        rows.push(vec![
            "asset".to_string(),
            d.group.label().to_string(),
            d.name.clone(),
            format!("{:.2}", d.amount),
            d.return_rate.map(|v| fmt_rate(&v)).unwrap_or_default(),
            String::new(),
        ]);
    }
    for d in &r.liability_details {
        rows.push(vec![
            "liability".to_string(),
            String::new(),
            d.name.clone(),
            format!("{:.2}", d.amount),
            d.interest_rate.map(|v| fmt_rate(&v)).unwrap_or_default(),
            String::new(),
        ]);
    }
    for d in &r.income_details {
        rows.push(vec![
            "income".to_string(),
            String::new(),
            d.name.clone(),
            format!("{:.2}", d.amount),
            String::new(),
            String::new(),
        ]);
    }
    for d in &r.expense_details {
        rows.push(vec![
            "expense".to_string(),
            d.annual_expense_id
                .map(|id| format!("#{}", id))
                .unwrap_or_default(),
            d.name.clone(),
            format!("{:.2}", d.amount),
            String::new(),
            d.detail.clone().unwrap_or_default(),
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Section", "Group", "Name", "Amount", "Rate", "Note"], rows)
    );
    println!(
        "Totals: assets {:.2}, liabilities {:.2}, income {:.2}, expense {:.2}",
        r.total_asset, r.total_liability, r.total_income, r.total_expense
    );
    Ok(())
}
