// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Moneyplan", "moneyplan"));

pub const DB_ENV: &str = "MONEYPLAN_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("moneyplan.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS annual_plans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL UNIQUE,
        monthly_surplus TEXT NOT NULL DEFAULT '0',
        annual_surplus TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS asset_targets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plan_id INTEGER NOT NULL,
        asset_group TEXT NOT NULL,
        name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        allocation_percentage TEXT,
        expected_return_rate TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(plan_id) REFERENCES annual_plans(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS liability_targets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plan_id INTEGER NOT NULL,
        liability_group TEXT NOT NULL DEFAULT 'LOAN',
        name TEXT NOT NULL,
        target_balance TEXT NOT NULL,
        interest_rate TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(plan_id) REFERENCES annual_plans(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS annual_incomes(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plan_id INTEGER NOT NULL,
        income_type TEXT NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        is_monthly INTEGER NOT NULL DEFAULT 1,
        remark TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(plan_id) REFERENCES annual_plans(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS annual_expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plan_id INTEGER NOT NULL,
        parent_group TEXT NOT NULL DEFAULT 'DAILY',
        category TEXT NOT NULL,
        budget_amount TEXT NOT NULL,
        is_monthly INTEGER NOT NULL DEFAULT 1,
        spent_amount TEXT NOT NULL DEFAULT '0', -- display cache only
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(plan_id) REFERENCES annual_plans(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS monthly_records(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL,
        month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
        summary TEXT,
        total_asset TEXT NOT NULL DEFAULT '0',
        total_liability TEXT NOT NULL DEFAULT '0',
        total_income TEXT NOT NULL DEFAULT '0',
        total_expense TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(year, month)
    );

    CREATE TABLE IF NOT EXISTS asset_details(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER NOT NULL,
        asset_group TEXT NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        return_rate TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(record_id) REFERENCES monthly_records(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS liability_details(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        interest_rate TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(record_id) REFERENCES monthly_records(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS income_details(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(record_id) REFERENCES monthly_records(id) ON DELETE CASCADE
    );

    -- annual_expense_id has no ON DELETE action: links must be cleared before a
    -- category is discarded.
    CREATE TABLE IF NOT EXISTS expense_details(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        record_id INTEGER NOT NULL,
        annual_expense_id INTEGER,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        detail TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(record_id) REFERENCES monthly_records(id) ON DELETE CASCADE,
        FOREIGN KEY(annual_expense_id) REFERENCES annual_expenses(id)
    );
    CREATE INDEX IF NOT EXISTS idx_expense_details_category ON expense_details(annual_expense_id);
    "#,
    )?;
    Ok(())
}
