// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{PlanStore, RecordStore, SqliteStore};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|i| vec![i.kind.to_string(), i.detail]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Read-only consistency checks.
pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Expense lines linked to a category of another year's plan
    let mut stmt = conn.prepare(
        "SELECT r.year, r.month, d.name, e.category, p.year
         FROM expense_details d
         JOIN monthly_records r ON d.record_id = r.id
         JOIN annual_expenses e ON d.annual_expense_id = e.id
         JOIN annual_plans p ON e.plan_id = p.id
         WHERE p.year != r.year
         ORDER BY r.year, r.month, d.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let year: i32 = r.get(0)?;
        let month: u32 = r.get(1)?;
        let name: String = r.get(2)?;
        let category: String = r.get(3)?;
        let plan_year: i32 = r.get(4)?;
        issues.push(Issue {
            kind: "cross_year_link",
            detail: format!(
                "{}-{:02} '{}' -> '{}' of plan {}",
                year, month, name, category, plan_year
            ),
        });
    }

    // 2) Stored totals that no longer match the lines
    let store = SqliteStore::new(conn);
    let mut years_stmt = conn.prepare("SELECT DISTINCT year FROM monthly_records ORDER BY year")?;
    let years = years_stmt
        .query_map([], |r| r.get::<_, i32>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for year in &years {
        for stored in store.records_for_year(*year)? {
            let mut fresh = stored.clone();
            fresh.recalculate_totals()?;
            if (fresh.total_asset, fresh.total_liability, fresh.total_income, fresh.total_expense)
                != (stored.total_asset, stored.total_liability, stored.total_income, stored.total_expense)
            {
                issues.push(Issue {
                    kind: "stale_totals",
                    detail: format!("{}-{:02}", stored.year, stored.month),
                });
            }
        }
    }

    // 3) Years with records but no plan
    for year in years {
        if !store.plan_exists(year)? {
            issues.push(Issue {
                kind: "missing_plan",
                detail: year.to_string(),
            });
        }
    }

    Ok(issues)
}
