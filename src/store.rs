// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, Result, UnknownVariant};
use crate::models::{
    AnnualExpense, AnnualIncome, AnnualPlan, AssetDetail, AssetTarget, ExpenseDetail,
    IncomeDetail, LiabilityDetail, LiabilityTarget, MonthlyRecord,
};
use crate::amount;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;

pub trait PlanStore {
    fn find_plan(&self, year: i32) -> Result<Option<AnnualPlan>>;
    fn plan_exists(&self, year: i32) -> Result<bool>;
    fn save_plan(&self, plan: AnnualPlan) -> Result<AnnualPlan>;
    fn plan_years(&self) -> Result<Vec<i32>>;
}

pub trait RecordStore {
    fn find_record(&self, year: i32, month: u32) -> Result<Option<MonthlyRecord>>;
    fn find_record_by_id(&self, id: i64) -> Result<Option<MonthlyRecord>>;
    /// Records of `year`, ordered by month.
    fn records_for_year(&self, year: i32) -> Result<Vec<MonthlyRecord>>;
    fn record_exists(&self, year: i32, month: u32) -> Result<bool>;
    fn save_record(&self, record: MonthlyRecord) -> Result<MonthlyRecord>;
    /// Returns false when no record had that id.
    fn delete_record(&self, id: i64) -> Result<bool>;
}

pub trait BudgetCategoryStore {
    fn find_category(&self, id: i64) -> Result<Option<AnnualExpense>>;
    /// Sum of actual expense lines linked to `category_id` in records of `year`;
    /// `None` when no line matches.
    fn sum_linked_actuals(&self, category_id: i64, year: i32) -> Result<Option<Decimal>>;
    /// Detaches every actual line, in any year, from the given categories.
    fn clear_category_links(&self, category_ids: &[i64]) -> Result<usize>;
}

/// Store over a borrowed connection. Build it over a `rusqlite::Transaction`
/// to make a multi-step write atomic.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = r.get(idx)?;
    raw.map(|s| {
        s.trim()
            .parse::<Decimal>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn enum_at<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = r.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_text(d: Option<Decimal>) -> Option<String> {
    d.map(|v| v.to_string())
}

fn unique_violation(err: rusqlite::Error, entity: &'static str, key: String) -> LedgerError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            LedgerError::conflict(entity, key)
        }
        _ => LedgerError::Storage(err),
    }
}

fn record_header(r: &Row<'_>) -> rusqlite::Result<MonthlyRecord> {
    Ok(MonthlyRecord {
        id: Some(r.get(0)?),
        year: r.get(1)?,
        month: r.get(2)?,
        summary: r.get(3)?,
        total_asset: decimal_at(r, 4)?,
        total_liability: decimal_at(r, 5)?,
        total_income: decimal_at(r, 6)?,
        total_expense: decimal_at(r, 7)?,
        ..MonthlyRecord::new(0, 0)
    })
}

fn category_row(r: &Row<'_>) -> rusqlite::Result<AnnualExpense> {
    Ok(AnnualExpense {
        id: Some(r.get(0)?),
        parent_group: enum_at(r, 1)?,
        category: r.get(2)?,
        budget_amount: decimal_at(r, 3)?,
        is_monthly: r.get(4)?,
        spent_amount: decimal_at(r, 5)?,
        sort_order: r.get(6)?,
    })
}

// Kept below SQLite's default limit of 999 host parameters per statement.
const LINK_CHUNK: usize = 500;
const RECORD_COLUMNS: &str = "id, year, month, summary, total_asset, total_liability, total_income, total_expense";
const CATEGORY_COLUMNS: &str =
    "id, parent_group, category, budget_amount, is_monthly, spent_amount, sort_order";

impl SqliteStore<'_> {
    fn load_plan_children(&self, plan: &mut AnnualPlan, plan_id: i64) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, asset_group, name, target_amount, allocation_percentage, expected_return_rate, sort_order
             FROM asset_targets WHERE plan_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![plan_id], |r| {
            Ok(AssetTarget {
                id: Some(r.get(0)?),
                group: enum_at(r, 1)?,
                name: r.get(2)?,
                target_amount: decimal_at(r, 3)?,
                allocation_percentage: opt_decimal_at(r, 4)?,
                expected_return_rate: opt_decimal_at(r, 5)?,
                sort_order: r.get(6)?,
            })
        })?;
        plan.asset_targets = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, liability_group, name, target_balance, interest_rate, sort_order
             FROM liability_targets WHERE plan_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![plan_id], |r| {
            Ok(LiabilityTarget {
                id: Some(r.get(0)?),
                group: enum_at(r, 1)?,
                name: r.get(2)?,
                target_balance: decimal_at(r, 3)?,
                interest_rate: opt_decimal_at(r, 4)?,
                sort_order: r.get(5)?,
            })
        })?;
        plan.liability_targets = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, income_type, name, amount, is_monthly, remark, sort_order
             FROM annual_incomes WHERE plan_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![plan_id], |r| {
            Ok(AnnualIncome {
                id: Some(r.get(0)?),
                income_type: enum_at(r, 1)?,
                name: r.get(2)?,
                amount: decimal_at(r, 3)?,
                is_monthly: r.get(4)?,
                remark: r.get(5)?,
                sort_order: r.get(6)?,
            })
        })?;
        plan.annual_incomes = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let sql = format!(
            "SELECT {} FROM annual_expenses WHERE plan_id=?1 ORDER BY sort_order, id",
            CATEGORY_COLUMNS
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![plan_id], category_row)?;
        plan.annual_expenses = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(())
    }

    fn sync_categories(&self, plan_id: i64, categories: &mut [AnnualExpense]) -> Result<()> {
        let keep: Vec<i64> = categories.iter().filter_map(|c| c.id).collect();
        let existing: Vec<i64> = {
            let mut stmt = self
                .conn
                .prepare_cached("SELECT id FROM annual_expenses WHERE plan_id=?1")?;
            let rows = stmt.query_map(params![plan_id], |r| r.get::<_, i64>(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for id in existing.into_iter().filter(|id| !keep.contains(id)) {
            // Fails on the foreign key if actual lines still point here.
            self.conn
                .execute("DELETE FROM annual_expenses WHERE id=?1", params![id])?;
        }

        for c in categories.iter_mut() {
            let updated = match c.id {
                Some(id) => self.conn.execute(
                    "UPDATE annual_expenses SET parent_group=?1, category=?2, budget_amount=?3,
                         is_monthly=?4, spent_amount=?5, sort_order=?6
                     WHERE id=?7 AND plan_id=?8",
                    params![
                        c.parent_group.as_str(),
                        c.category,
                        c.budget_amount.to_string(),
                        c.is_monthly,
                        c.spent_amount.to_string(),
                        c.sort_order,
                        id,
                        plan_id
                    ],
                )?,
                None => 0,
            };
            if updated == 0 {
                self.conn.execute(
                    "INSERT INTO annual_expenses(plan_id, parent_group, category, budget_amount, is_monthly, spent_amount, sort_order)
                     VALUES (?1,?2,?3,?4,?5,?6,?7)",
                    params![
                        plan_id,
                        c.parent_group.as_str(),
                        c.category,
                        c.budget_amount.to_string(),
                        c.is_monthly,
                        c.spent_amount.to_string(),
                        c.sort_order
                    ],
                )?;
                c.id = Some(self.conn.last_insert_rowid());
            }
        }
        Ok(())
    }

    fn load_record_lines(&self, record: &mut MonthlyRecord, record_id: i64) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, asset_group, name, amount, return_rate, sort_order
             FROM asset_details WHERE record_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![record_id], |r| {
            Ok(AssetDetail {
                id: Some(r.get(0)?),
                group: enum_at(r, 1)?,
                name: r.get(2)?,
                amount: decimal_at(r, 3)?,
                return_rate: opt_decimal_at(r, 4)?,
                sort_order: r.get(5)?,
            })
        })?;
        record.asset_details = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, amount, interest_rate, sort_order
             FROM liability_details WHERE record_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![record_id], |r| {
            Ok(LiabilityDetail {
                id: Some(r.get(0)?),
                name: r.get(1)?,
                amount: decimal_at(r, 2)?,
                interest_rate: opt_decimal_at(r, 3)?,
                sort_order: r.get(4)?,
            })
        })?;
        record.liability_details = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, amount, sort_order
             FROM income_details WHERE record_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![record_id], |r| {
            Ok(IncomeDetail {
                id: Some(r.get(0)?),
                name: r.get(1)?,
                amount: decimal_at(r, 2)?,
                sort_order: r.get(3)?,
            })
        })?;
        record.income_details = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare_cached(
            "SELECT id, annual_expense_id, name, amount, detail, sort_order
             FROM expense_details WHERE record_id=?1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![record_id], |r| {
            Ok(ExpenseDetail {
                id: Some(r.get(0)?),
                annual_expense_id: r.get(1)?,
                name: r.get(2)?,
                amount: decimal_at(r, 3)?,
                detail: r.get(4)?,
                sort_order: r.get(5)?,
            })
        })?;
        record.expense_details = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(())
    }

    fn write_record_lines(&self, record: &mut MonthlyRecord, record_id: i64) -> Result<()> {
        for table in [
            "asset_details",
            "liability_details",
            "income_details",
            "expense_details",
        ] {
            self.conn.execute(
                &format!("DELETE FROM {} WHERE record_id=?1", table),
                params![record_id],
            )?;
        }

        for d in record.asset_details.iter_mut() {
            self.conn.execute(
                "INSERT INTO asset_details(record_id, asset_group, name, amount, return_rate, sort_order)
                 VALUES (?1,?2,?3,?4,?5,?6)",
                params![
                    record_id,
                    d.group.as_str(),
                    d.name,
                    d.amount.to_string(),
                    opt_text(d.return_rate),
                    d.sort_order
                ],
            )?;
            d.id = Some(self.conn.last_insert_rowid());
        }
        for d in record.liability_details.iter_mut() {
            self.conn.execute(
                "INSERT INTO liability_details(record_id, name, amount, interest_rate, sort_order)
                 VALUES (?1,?2,?3,?4,?5)",
                params![
                    record_id,
                    d.name,
                    d.amount.to_string(),
                    opt_text(d.interest_rate),
                    d.sort_order
                ],
            )?;
            d.id = Some(self.conn.last_insert_rowid());
        }
        for d in record.income_details.iter_mut() {
            self.conn.execute(
                "INSERT INTO income_details(record_id, name, amount, sort_order) VALUES (?1,?2,?3,?4)",
                params![record_id, d.name, d.amount.to_string(), d.sort_order],
            )?;
            d.id = Some(self.conn.last_insert_rowid());
        }
        for d in record.expense_details.iter_mut() {
            self.conn.execute(
                "INSERT INTO expense_details(record_id, annual_expense_id, name, amount, detail, sort_order)
                 VALUES (?1,?2,?3,?4,?5,?6)",
                params![
                    record_id,
                    d.annual_expense_id,
                    d.name,
                    d.amount.to_string(),
                    d.detail,
                    d.sort_order
                ],
            )?;
            d.id = Some(self.conn.last_insert_rowid());
        }
        Ok(())
    }

    fn load_record_where(&self, clause: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Option<MonthlyRecord>> {
        let sql = format!("SELECT {} FROM monthly_records WHERE {}", RECORD_COLUMNS, clause);
        let header = self
            .conn
            .query_row(&sql, args, record_header)
            .optional()?;
        match header {
            Some(mut record) => {
                if let Some(id) = record.id {
                    self.load_record_lines(&mut record, id)?;
                }
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

impl PlanStore for SqliteStore<'_> {
    fn find_plan(&self, year: i32) -> Result<Option<AnnualPlan>> {
        let head = self
            .conn
            .query_row(
                "SELECT id, monthly_surplus, annual_surplus FROM annual_plans WHERE year=?1",
                params![year],
                |r| {
                    Ok(AnnualPlan {
                        id: Some(r.get(0)?),
                        monthly_surplus: decimal_at(r, 1)?,
                        annual_surplus: decimal_at(r, 2)?,
                        ..AnnualPlan::new(year)
                    })
                },
            )
            .optional()?;
        match head {
            Some(mut plan) => {
                if let Some(id) = plan.id {
                    self.load_plan_children(&mut plan, id)?;
                }
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    fn plan_exists(&self, year: i32) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM annual_plans WHERE year=?1",
                params![year],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn save_plan(&self, mut plan: AnnualPlan) -> Result<AnnualPlan> {
        let plan_id = match plan.id {
            Some(id) => {
                self.conn.execute(
                    "UPDATE annual_plans SET monthly_surplus=?1, annual_surplus=?2, updated_at=datetime('now')
                     WHERE id=?3",
                    params![
                        plan.monthly_surplus.to_string(),
                        plan.annual_surplus.to_string(),
                        id
                    ],
                )?;
                id
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO annual_plans(year, monthly_surplus, annual_surplus) VALUES (?1,?2,?3)",
                        params![
                            plan.year,
                            plan.monthly_surplus.to_string(),
                            plan.annual_surplus.to_string()
                        ],
                    )
                    .map_err(|e| unique_violation(e, "Annual plan", plan.year.to_string()))?;
                self.conn.last_insert_rowid()
            }
        };
        plan.id = Some(plan_id);

        for table in ["asset_targets", "liability_targets", "annual_incomes"] {
            self.conn.execute(
                &format!("DELETE FROM {} WHERE plan_id=?1", table),
                params![plan_id],
            )?;
        }
        for t in plan.asset_targets.iter_mut() {
            self.conn.execute(
                "INSERT INTO asset_targets(plan_id, asset_group, name, target_amount, allocation_percentage, expected_return_rate, sort_order)
                 VALUES (?1,?2,?3,?4,?5,?6,?7)",
                params![
                    plan_id,
                    t.group.as_str(),
                    t.name,
                    t.target_amount.to_string(),
                    opt_text(t.allocation_percentage),
                    opt_text(t.expected_return_rate),
                    t.sort_order
                ],
            )?;
            t.id = Some(self.conn.last_insert_rowid());
        }
        for t in plan.liability_targets.iter_mut() {
            self.conn.execute(
                "INSERT INTO liability_targets(plan_id, liability_group, name, target_balance, interest_rate, sort_order)
                 VALUES (?1,?2,?3,?4,?5,?6)",
                params![
                    plan_id,
                    t.group.as_str(),
                    t.name,
                    t.target_balance.to_string(),
                    opt_text(t.interest_rate),
                    t.sort_order
                ],
            )?;
            t.id = Some(self.conn.last_insert_rowid());
        }
        for inc in plan.annual_incomes.iter_mut() {
            self.conn.execute(
                "INSERT INTO annual_incomes(plan_id, income_type, name, amount, is_monthly, remark, sort_order)
                 VALUES (?1,?2,?3,?4,?5,?6,?7)",
                params![
                    plan_id,
                    inc.income_type.as_str(),
                    inc.name,
                    inc.amount.to_string(),
                    inc.is_monthly,
                    inc.remark,
                    inc.sort_order
                ],
            )?;
            inc.id = Some(self.conn.last_insert_rowid());
        }
        self.sync_categories(plan_id, &mut plan.annual_expenses)?;
        Ok(plan)
    }

    fn plan_years(&self) -> Result<Vec<i32>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT year FROM annual_plans ORDER BY year")?;
        let rows = stmt.query_map([], |r| r.get::<_, i32>(0))?;
        let years = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(years)
    }
}

impl RecordStore for SqliteStore<'_> {
    fn find_record(&self, year: i32, month: u32) -> Result<Option<MonthlyRecord>> {
        self.load_record_where("year=?1 AND month=?2", &[&year, &month])
    }

    fn find_record_by_id(&self, id: i64) -> Result<Option<MonthlyRecord>> {
        self.load_record_where("id=?1", &[&id])
    }

    fn records_for_year(&self, year: i32) -> Result<Vec<MonthlyRecord>> {
        let sql = format!(
            "SELECT {} FROM monthly_records WHERE year=?1 ORDER BY month",
            RECORD_COLUMNS
        );
        let mut records = {
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params![year], record_header)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for record in records.iter_mut() {
            if let Some(id) = record.id {
                self.load_record_lines(record, id)?;
            }
        }
        Ok(records)
    }

    fn record_exists(&self, year: i32, month: u32) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM monthly_records WHERE year=?1 AND month=?2",
                params![year, month],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn save_record(&self, mut record: MonthlyRecord) -> Result<MonthlyRecord> {
        let record_id = match record.id {
            Some(id) => {
                // The natural key is never rewritten on update.
                let n = self.conn.execute(
                    "UPDATE monthly_records SET summary=?1, total_asset=?2, total_liability=?3,
                         total_income=?4, total_expense=?5, updated_at=datetime('now')
                     WHERE id=?6",
                    params![
                        record.summary,
                        record.total_asset.to_string(),
                        record.total_liability.to_string(),
                        record.total_income.to_string(),
                        record.total_expense.to_string(),
                        id
                    ],
                )?;
                if n == 0 {
                    return Err(LedgerError::not_found("Monthly record", id));
                }
                id
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO monthly_records(year, month, summary, total_asset, total_liability, total_income, total_expense)
                         VALUES (?1,?2,?3,?4,?5,?6,?7)",
                        params![
                            record.year,
                            record.month,
                            record.summary,
                            record.total_asset.to_string(),
                            record.total_liability.to_string(),
                            record.total_income.to_string(),
                            record.total_expense.to_string()
                        ],
                    )
                    .map_err(|e| {
                        unique_violation(
                            e,
                            "Monthly record",
                            format!("{}-{:02}", record.year, record.month),
                        )
                    })?;
                self.conn.last_insert_rowid()
            }
        };
        record.id = Some(record_id);
        self.write_record_lines(&mut record, record_id)?;
        Ok(record)
    }

    fn delete_record(&self, id: i64) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM monthly_records WHERE id=?1", params![id])?;
        Ok(n > 0)
    }
}

impl BudgetCategoryStore for SqliteStore<'_> {
    fn find_category(&self, id: i64) -> Result<Option<AnnualExpense>> {
        let sql = format!("SELECT {} FROM annual_expenses WHERE id=?1", CATEGORY_COLUMNS);
        let found = self
            .conn
            .query_row(&sql, params![id], category_row)
            .optional()?;
        Ok(found)
    }

    fn sum_linked_actuals(&self, category_id: i64, year: i32) -> Result<Option<Decimal>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT d.amount FROM expense_details d
             JOIN monthly_records r ON d.record_id = r.id
             WHERE d.annual_expense_id=?1 AND r.year=?2",
        )?;
        let rows = stmt.query_map(params![category_id, year], |r| decimal_at(r, 0))?;
        let amounts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        if amounts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(amount::sum(amounts)?))
        }
    }

    fn clear_category_links(&self, category_ids: &[i64]) -> Result<usize> {
        let mut n = 0;
        for chunk in category_ids.chunks(LINK_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "UPDATE expense_details SET annual_expense_id=NULL WHERE annual_expense_id IN ({})",
                placeholders
            );
            n += self
                .conn
                .execute(&sql, rusqlite::params_from_iter(chunk.iter()))?;
        }
        Ok(n)
    }
}
