// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Wholesale replacement of plan and record line items.
//!
//! Callers run these inside one transaction; nothing here commits.

use crate::carry;
use crate::error::{LedgerError, Result};
use crate::models::{
    AnnualExpense, AnnualIncome, AnnualPlan, AssetDetail, AssetTarget, ExpenseDetail,
    IncomeDetail, LiabilityDetail, LiabilityTarget, MonthlyRecord, PlanRequest, RecordLines,
    RecordRequest,
};
use crate::plan;
use crate::store::{BudgetCategoryStore, PlanStore, RecordStore};
use tracing::debug;

fn required<T>(value: Option<T>, field: String) -> Result<T> {
    value.ok_or_else(|| LedgerError::invalid(field, "is required"))
}

/// Applies `req` to the stored plan of its year, creating the plan when absent.
///
/// A collection left out of the request keeps its stored lines. A present
/// collection replaces them. Replacing the budget categories first detaches
/// every actual expense line, in any year, from the categories being discarded.
pub fn replace_plan<S>(store: &S, req: &PlanRequest) -> Result<AnnualPlan>
where
    S: PlanStore + BudgetCategoryStore + ?Sized,
{
    let mut plan = store
        .find_plan(req.year)?
        .unwrap_or_else(|| AnnualPlan::new(req.year));

    if let Some(items) = &req.asset_targets {
        let mut lines = Vec::with_capacity(items.len());
        for (i, t) in items.iter().enumerate() {
            lines.push(AssetTarget {
                id: None,
                group: required(t.group, format!("asset_targets[{}].group", i))?,
                name: t.name.trim().to_string(),
                target_amount: required(t.target_amount, format!("asset_targets[{}].target_amount", i))?,
                allocation_percentage: t.allocation_percentage,
                expected_return_rate: t.expected_return_rate,
                sort_order: t.sort_order.unwrap_or(0),
            });
        }
        lines.sort_by_key(|t| t.sort_order);
        plan.asset_targets = lines;
    }

    if let Some(items) = &req.liability_targets {
        let mut lines = Vec::with_capacity(items.len());
        for (i, t) in items.iter().enumerate() {
            lines.push(LiabilityTarget {
                id: None,
                group: t.group.unwrap_or_default(),
                name: t.name.trim().to_string(),
                target_balance: required(t.target_balance, format!("liability_targets[{}].target_balance", i))?,
                interest_rate: t.interest_rate,
                sort_order: t.sort_order.unwrap_or(0),
            });
        }
        lines.sort_by_key(|t| t.sort_order);
        plan.liability_targets = lines;
    }

    if let Some(items) = &req.annual_incomes {
        let mut lines = Vec::with_capacity(items.len());
        for (i, inc) in items.iter().enumerate() {
            lines.push(AnnualIncome {
                id: None,
                income_type: required(inc.income_type, format!("annual_incomes[{}].income_type", i))?,
                name: inc.name.trim().to_string(),
                amount: required(inc.amount, format!("annual_incomes[{}].amount", i))?,
                is_monthly: inc.is_monthly.unwrap_or(true),
                remark: inc.remark.clone(),
                sort_order: inc.sort_order.unwrap_or(0),
            });
        }
        lines.sort_by_key(|l| l.sort_order);
        plan.annual_incomes = lines;
    }

    if let Some(items) = &req.annual_expenses {
        let discarded: Vec<i64> = plan.annual_expenses.iter().filter_map(|c| c.id).collect();
        let cleared = store.clear_category_links(&discarded)?;
        if cleared > 0 {
            debug!(year = req.year, categories = discarded.len(), lines = cleared, "cleared budget-category links");
        }

        let mut lines = Vec::with_capacity(items.len());
        for (i, e) in items.iter().enumerate() {
            lines.push(AnnualExpense {
                id: None,
                parent_group: e.parent_group.unwrap_or_default(),
                category: e.category.trim().to_string(),
                budget_amount: required(e.budget_amount, format!("annual_expenses[{}].budget_amount", i))?,
                is_monthly: e.is_monthly.unwrap_or(true),
                spent_amount: rust_decimal::Decimal::ZERO,
                sort_order: e.sort_order.unwrap_or(0),
            });
        }
        lines.sort_by_key(|c| c.sort_order);
        plan.annual_expenses = lines;
    }

    plan::apply_surplus(&mut plan)?;
    store.save_plan(plan)
}

fn resolve_category<S>(store: &S, id: Option<i64>) -> Result<Option<i64>>
where
    S: BudgetCategoryStore + ?Sized,
{
    let Some(id) = id else {
        return Ok(None);
    };
    match store.find_category(id)? {
        Some(category) => Ok(category.id),
        None => {
            debug!(category_id = id, "budget category not found, line left unlinked");
            Ok(None)
        }
    }
}

/// Replaces the four line collections of `record` from `lines` (absent means
/// empty) and recomputes its totals.
pub fn fill_lines<S>(store: &S, record: &mut MonthlyRecord, lines: &RecordLines) -> Result<()>
where
    S: BudgetCategoryStore + ?Sized,
{
    let mut assets = Vec::new();
    for (i, d) in lines.asset_details.iter().flatten().enumerate() {
        assets.push(AssetDetail {
            id: None,
            group: required(d.group, format!("asset_details[{}].group", i))?,
            name: d.name.trim().to_string(),
            amount: required(d.amount, format!("asset_details[{}].amount", i))?,
            return_rate: d.return_rate,
            sort_order: d.sort_order.unwrap_or(0),
        });
    }
    assets.sort_by_key(|d| d.sort_order);

    let mut liabilities = Vec::new();
    for (i, d) in lines.liability_details.iter().flatten().enumerate() {
        liabilities.push(LiabilityDetail {
            id: None,
            name: d.name.trim().to_string(),
            amount: required(d.amount, format!("liability_details[{}].amount", i))?,
            interest_rate: d.interest_rate,
            sort_order: d.sort_order.unwrap_or(0),
        });
    }
    liabilities.sort_by_key(|d| d.sort_order);

    let mut incomes = Vec::new();
    for (i, d) in lines.income_details.iter().flatten().enumerate() {
        incomes.push(IncomeDetail {
            id: None,
            name: d.name.trim().to_string(),
            amount: required(d.amount, format!("income_details[{}].amount", i))?,
            sort_order: d.sort_order.unwrap_or(0),
        });
    }
    incomes.sort_by_key(|d| d.sort_order);

    let mut expenses = Vec::new();
    for (i, d) in lines.expense_details.iter().flatten().enumerate() {
        expenses.push(ExpenseDetail {
            id: None,
            annual_expense_id: resolve_category(store, d.annual_expense_id)?,
            name: d.name.trim().to_string(),
            amount: required(d.amount, format!("expense_details[{}].amount", i))?,
            detail: d.detail.clone(),
            sort_order: d.sort_order.unwrap_or(0),
        });
    }
    expenses.sort_by_key(|d| d.sort_order);

    record.asset_details = assets;
    record.liability_details = liabilities;
    record.income_details = incomes;
    record.expense_details = expenses;
    record.recalculate_totals()
}

/// Creates the record of `(req.year, req.month)`.
///
/// A request without any line starts from the previous month's skeleton.
pub fn create_record<S>(store: &S, req: &RecordRequest) -> Result<MonthlyRecord>
where
    S: RecordStore + BudgetCategoryStore + ?Sized,
{
    if store.record_exists(req.year, req.month)? {
        return Err(LedgerError::conflict(
            "Monthly record",
            format!("{}-{:02}", req.year, req.month),
        ));
    }

    let mut record = if req.lines.is_empty() {
        let (year, month) = carry::previous_period(req.year, req.month);
        let prior = store.find_record(year, month)?;
        debug!(
            source_year = year,
            source_month = month,
            found = prior.is_some(),
            "carrying forward month skeleton"
        );
        carry::carry_forward(prior.as_ref(), req.year, req.month)
    } else {
        let mut record = MonthlyRecord::new(req.year, req.month);
        fill_lines(store, &mut record, &req.lines)?;
        record
    };
    record.summary = req.summary.clone();
    record.recalculate_totals()?;
    store.save_record(record)
}

/// Replaces summary and lines of an existing record. The record keeps its
/// `(year, month)`.
pub fn replace_record<S>(
    store: &S,
    mut record: MonthlyRecord,
    summary: Option<String>,
    lines: &RecordLines,
) -> Result<MonthlyRecord>
where
    S: RecordStore + BudgetCategoryStore + ?Sized,
{
    record.summary = summary;
    fill_lines(store, &mut record, lines)?;
    store.save_record(record)
}

/// Writes imported lines into `(year, month)`: the record is created when
/// absent (never carried forward) and replaced otherwise.
pub fn import_record<S>(store: &S, year: i32, month: u32, lines: &RecordLines) -> Result<MonthlyRecord>
where
    S: RecordStore + BudgetCategoryStore + ?Sized,
{
    let mut record = store
        .find_record(year, month)?
        .unwrap_or_else(|| MonthlyRecord::new(year, month));
    fill_lines(store, &mut record, lines)?;
    store.save_record(record)
}
