// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only views across plans and records. Missing data shows up as zeros
//! or empty series, and plan-based views return `None` for a year without a plan.

use crate::amount;
use crate::budget::{self, BudgetProgress};
use crate::error::Result;
use crate::models::AssetGroup;
use crate::plan;
use crate::store::{BudgetCategoryStore, PlanStore, RecordStore};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub year: i32,
    pub month: u32,
    pub total_asset: Decimal,
    pub total_liability: Decimal,
    pub net_worth: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub surplus: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetTrendPoint {
    pub month: u32,
    pub asset: Decimal,
    pub liability: Decimal,
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowPoint {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub surplus: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub group: AssetGroup,
    pub label: &'static str,
    pub current_amount: Decimal,
    pub target_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualProgress {
    pub year: i32,
    pub monthly_surplus: Decimal,
    pub annual_surplus: Decimal,
    pub budget_progress: Vec<BudgetProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetPoint {
    pub month: u32,
    pub asset_target: Decimal,
    pub liability_target: Decimal,
    pub asset_actual: Option<Decimal>,
    pub liability_actual: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetTrend {
    pub year: i32,
    pub asset_target_total: Decimal,
    pub liability_target_total: Decimal,
    pub months: Vec<TargetPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category_id: Option<i64>,
    pub category: String,
    pub budget_amount: Decimal,
    pub spent_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPie {
    pub year: i32,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    pub categories: Vec<PieSlice>,
}

pub fn overview<S>(store: &S, year: i32, month: u32) -> Result<Overview>
where
    S: RecordStore + ?Sized,
{
    let mut view = Overview {
        year,
        month,
        total_asset: Decimal::ZERO,
        total_liability: Decimal::ZERO,
        net_worth: Decimal::ZERO,
        total_income: Decimal::ZERO,
        total_expense: Decimal::ZERO,
        surplus: Decimal::ZERO,
    };
    if let Some(r) = store.find_record(year, month)? {
        view.total_asset = r.total_asset;
        view.total_liability = r.total_liability;
        view.net_worth = r.net_worth()?;
        view.total_income = r.total_income;
        view.total_expense = r.total_expense;
        view.surplus = r.surplus()?;
    }
    Ok(view)
}

pub fn asset_trend<S>(store: &S, year: i32) -> Result<Vec<AssetTrendPoint>>
where
    S: RecordStore + ?Sized,
{
    store
        .records_for_year(year)?
        .iter()
        .map(|r| -> Result<AssetTrendPoint> {
            Ok(AssetTrendPoint {
                month: r.month,
                asset: r.total_asset,
                liability: r.total_liability,
                net_worth: r.net_worth()?,
            })
        })
        .collect()
}

pub fn cashflow_trend<S>(store: &S, year: i32) -> Result<Vec<CashflowPoint>>
where
    S: RecordStore + ?Sized,
{
    store
        .records_for_year(year)?
        .iter()
        .map(|r| -> Result<CashflowPoint> {
            Ok(CashflowPoint {
                month: r.month,
                income: r.total_income,
                expense: r.total_expense,
                surplus: r.surplus()?,
            })
        })
        .collect()
}

/// Every asset group with the month's holdings against the plan's target.
pub fn asset_distribution<S>(store: &S, year: i32, month: u32) -> Result<Vec<DistributionSlice>>
where
    S: RecordStore + PlanStore + ?Sized,
{
    let record = store.find_record(year, month)?;
    let plan = store.find_plan(year)?;

    AssetGroup::ALL
        .iter()
        .map(|&group| -> Result<DistributionSlice> {
            let current_amount = match &record {
                Some(r) => amount::sum(
                    r.asset_details
                        .iter()
                        .filter(|d| d.group == group)
                        .map(|d| d.amount),
                )?,
                None => Decimal::ZERO,
            };
            let target_amount = match &plan {
                Some(p) => amount::sum(
                    p.asset_targets
                        .iter()
                        .filter(|t| t.group == group)
                        .map(|t| t.target_amount),
                )?,
                None => Decimal::ZERO,
            };
            Ok(DistributionSlice {
                group,
                label: group.label(),
                current_amount,
                target_amount,
                percentage: amount::percentage(current_amount, target_amount)?,
            })
        })
        .collect()
}

/// Surplus recomputed from the plan lines, with raw (not annualized) budget
/// progress for every tracked category.
pub fn annual_progress<S>(store: &S, year: i32) -> Result<Option<AnnualProgress>>
where
    S: PlanStore + BudgetCategoryStore + ?Sized,
{
    let Some(plan) = store.find_plan(year)? else {
        return Ok(None);
    };
    let totals = plan::compute_surplus(&plan.annual_incomes, &plan.annual_expenses)?;
    let budget_progress = budget::budget_progress(store, &plan, false)?;
    Ok(Some(AnnualProgress {
        year,
        monthly_surplus: totals.monthly_surplus,
        annual_surplus: totals.annual_surplus,
        budget_progress,
    }))
}

/// Twelve monthly points against the plan's asset and liability targets.
pub fn target_trend<S>(store: &S, year: i32) -> Result<Option<TargetTrend>>
where
    S: PlanStore + RecordStore + ?Sized,
{
    let Some(plan) = store.find_plan(year)? else {
        return Ok(None);
    };
    let asset_target_total = amount::sum(plan.asset_targets.iter().map(|t| t.target_amount))?;
    let liability_target_total =
        amount::sum(plan.liability_targets.iter().map(|t| t.target_balance))?;

    let records = store.records_for_year(year)?;
    let months = (1..=12u32)
        .map(|month| {
            let actual = records.iter().find(|r| r.month == month);
            TargetPoint {
                month,
                asset_target: asset_target_total,
                liability_target: liability_target_total,
                asset_actual: actual.map(|r| r.total_asset),
                liability_actual: actual.map(|r| r.total_liability),
            }
        })
        .collect();

    Ok(Some(TargetTrend {
        year,
        asset_target_total,
        liability_target_total,
        months,
    }))
}

/// Tracked categories with annualized budgets; each slice's percentage is its
/// share of the total spent.
pub fn budget_pie<S>(store: &S, year: i32) -> Result<Option<BudgetPie>>
where
    S: PlanStore + BudgetCategoryStore + ?Sized,
{
    let Some(plan) = store.find_plan(year)? else {
        return Ok(None);
    };
    let rows = budget::budget_progress(store, &plan, true)?;
    let total_budget = amount::sum(rows.iter().map(|r| r.budget_amount))?;
    let total_spent = amount::sum(rows.iter().map(|r| r.spent_amount))?;
    let categories = rows
        .into_iter()
        .map(|r| -> Result<PieSlice> {
            Ok(PieSlice {
                percentage: amount::percentage(r.spent_amount, total_spent)?,
                category_id: r.category_id,
                category: r.category,
                budget_amount: r.budget_amount,
                spent_amount: r.spent_amount,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(BudgetPie {
        year,
        total_budget,
        total_spent,
        categories,
    }))
}
