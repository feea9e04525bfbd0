// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::carry;
use crate::error::{FieldError, LedgerError, Result};
use crate::models::{MonthlyRecord, RecordLines, RecordRequest};
use crate::reconcile;
use crate::store::{RecordStore, SqliteStore};
use rusqlite::Connection;
use tracing::{info, warn};

fn check_period(year: i32, month: u32) -> Result<()> {
    let mut errors = Vec::new();
    if year < 1 {
        errors.push(FieldError::new("year", "must be a positive year"));
    }
    if !(1..=12).contains(&month) {
        errors.push(FieldError::new("month", "must be between 1 and 12"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(errors))
    }
}

pub fn get_record(conn: &Connection, year: i32, month: u32) -> Result<MonthlyRecord> {
    SqliteStore::new(conn)
        .find_record(year, month)?
        .ok_or_else(|| LedgerError::not_found("Monthly record", format!("{}-{:02}", year, month)))
}

pub fn get_record_by_id(conn: &Connection, id: i64) -> Result<MonthlyRecord> {
    SqliteStore::new(conn)
        .find_record_by_id(id)?
        .ok_or_else(|| LedgerError::not_found("Monthly record", id))
}

pub fn records_for_year(conn: &Connection, year: i32) -> Result<Vec<MonthlyRecord>> {
    SqliteStore::new(conn).records_for_year(year)
}

pub fn create_record(conn: &mut Connection, req: &RecordRequest) -> Result<MonthlyRecord> {
    req.validate()?;
    let tx = conn.transaction()?;
    let record = {
        let store = SqliteStore::new(&tx);
        reconcile::create_record(&store, req)?
    };
    tx.commit()?;
    info!(
        year = record.year,
        month = record.month,
        lines = line_count(&record),
        "monthly record created"
    );
    Ok(record)
}

/// Replaces the summary and every line collection of record `id`.
///
/// The payload's `year`/`month` are validated but not applied: the row keeps
/// the period it was created for.
pub fn update_record(conn: &mut Connection, id: i64, req: &RecordRequest) -> Result<MonthlyRecord> {
    req.validate()?;
    let tx = conn.transaction()?;
    let record = {
        let store = SqliteStore::new(&tx);
        let existing = store
            .find_record_by_id(id)?
            .ok_or_else(|| LedgerError::not_found("Monthly record", id))?;
        if (existing.year, existing.month) != (req.year, req.month) {
            warn!(
                id,
                stored_year = existing.year,
                stored_month = existing.month,
                payload_year = req.year,
                payload_month = req.month,
                "update payload names a different period; keeping the stored one"
            );
        }
        reconcile::replace_record(&store, existing, req.summary.clone(), &req.lines)?
    };
    tx.commit()?;
    info!(id, year = record.year, month = record.month, "monthly record updated");
    Ok(record)
}

pub fn delete_record(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    let deleted = SqliteStore::new(&tx).delete_record(id)?;
    if !deleted {
        return Err(LedgerError::not_found("Monthly record", id));
    }
    tx.commit()?;
    info!(id, "monthly record deleted");
    Ok(())
}

/// The skeleton a new `(year, month)` would be created with. Nothing is saved.
pub fn previous_template(conn: &Connection, year: i32, month: u32) -> Result<MonthlyRecord> {
    check_period(year, month)?;
    let (prev_year, prev_month) = carry::previous_period(year, month);
    let prior = SqliteStore::new(conn).find_record(prev_year, prev_month)?;
    Ok(carry::carry_forward(prior.as_ref(), year, month))
}

/// Writes parsed import lines into `(year, month)`, creating or replacing the record.
pub fn import_lines(
    conn: &mut Connection,
    year: i32,
    month: u32,
    lines: &RecordLines,
) -> Result<MonthlyRecord> {
    check_period(year, month)?;
    lines.validate()?;
    let tx = conn.transaction()?;
    let record = {
        let store = SqliteStore::new(&tx);
        reconcile::import_record(&store, year, month, lines)?
    };
    tx.commit()?;
    info!(year, month, lines = line_count(&record), "monthly record imported");
    Ok(record)
}

fn line_count(r: &MonthlyRecord) -> usize {
    r.asset_details.len() + r.liability_details.len() + r.income_details.len() + r.expense_details.len()
}
