// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount;
use crate::budget;
use crate::error::{LedgerError, Result};
use crate::models::{AnnualExpense, AnnualIncome, AnnualPlan, PlanRequest};
use crate::reconcile;
use crate::store::{PlanStore, SqliteStore};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanTotals {
    pub monthly_surplus: Decimal,
    pub annual_surplus: Decimal,
}

/// Surplus figures derived from the income and budget lines alone.
///
/// `annual = monthly * 12 + one-off income - one-off budgets`.
pub fn compute_surplus(incomes: &[AnnualIncome], expenses: &[AnnualExpense]) -> Result<PlanTotals> {
    let monthly_income = amount::sum(incomes.iter().filter(|i| i.is_monthly).map(|i| i.amount))?;
    let monthly_expense = amount::sum(
        expenses
            .iter()
            .filter(|e| e.is_monthly)
            .map(|e| e.budget_amount),
    )?;
    let once_income = amount::sum(incomes.iter().filter(|i| !i.is_monthly).map(|i| i.amount))?;
    let once_expense = amount::sum(
        expenses
            .iter()
            .filter(|e| !e.is_monthly)
            .map(|e| e.budget_amount),
    )?;

    let monthly_surplus = amount::difference(monthly_income, monthly_expense)?;
    let year_of_months = amount::twelve_months(monthly_surplus)?;
    let annual_surplus = amount::difference(amount::sum([year_of_months, once_income])?, once_expense)?;
    Ok(PlanTotals {
        monthly_surplus,
        annual_surplus,
    })
}

pub fn apply_surplus(plan: &mut AnnualPlan) -> Result<()> {
    let totals = compute_surplus(&plan.annual_incomes, &plan.annual_expenses)?;
    plan.monthly_surplus = totals.monthly_surplus;
    plan.annual_surplus = totals.annual_surplus;
    Ok(())
}

/// Loads the plan for `year` with every category's spent amount refreshed
/// from the ledger.
pub fn get_plan(conn: &Connection, year: i32) -> Result<AnnualPlan> {
    let store = SqliteStore::new(conn);
    let mut plan = store
        .find_plan(year)?
        .ok_or_else(|| LedgerError::not_found("Annual plan", year))?;
    budget::refresh_spent_amounts(&store, &mut plan)?;
    Ok(plan)
}

pub fn create_or_update_plan(conn: &mut Connection, req: &PlanRequest) -> Result<AnnualPlan> {
    req.validate()?;
    let tx = conn.transaction()?;
    let plan = {
        let store = SqliteStore::new(&tx);
        let mut saved = reconcile::replace_plan(&store, req)?;
        budget::refresh_spent_amounts(&store, &mut saved)?;
        saved
    };
    tx.commit()?;
    info!(
        year = plan.year,
        categories = plan.annual_expenses.len(),
        monthly_surplus = %plan.monthly_surplus,
        annual_surplus = %plan.annual_surplus,
        "annual plan saved"
    );
    Ok(plan)
}

/// Recomputes surplus and spent figures and writes them back.
pub fn plan_summary(conn: &mut Connection, year: i32) -> Result<AnnualPlan> {
    let tx = conn.transaction()?;
    let plan = {
        let store = SqliteStore::new(&tx);
        let mut plan = store
            .find_plan(year)?
            .ok_or_else(|| LedgerError::not_found("Annual plan", year))?;
        apply_surplus(&mut plan)?;
        budget::refresh_spent_amounts(&store, &mut plan)?;
        store.save_plan(plan)?
    };
    tx.commit()?;
    Ok(plan)
}

pub fn plan_years(conn: &Connection) -> Result<Vec<i32>> {
    SqliteStore::new(conn).plan_years()
}
