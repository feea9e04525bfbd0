// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spent/remaining/execution figures for budget categories.
//!
//! The stored `spent_amount` of a category is never read here; every figure
//! is aggregated from the actual expense lines linked to the category within
//! the plan's year.

use crate::amount;
use crate::error::Result;
use crate::models::{AnnualExpense, AnnualPlan, ExpenseGroup};
use crate::store::BudgetCategoryStore;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub category_id: Option<i64>,
    pub category: String,
    pub parent_group: ExpenseGroup,
    pub budget_amount: Decimal,
    pub spent_amount: Decimal,
    pub remaining_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub execution_rate: Decimal,
}

/// Sum of lines linked to `category_id` in records of `year`. An unsaved
/// category or one without linked lines has spent nothing.
pub fn spent_amount<S>(store: &S, category_id: Option<i64>, year: i32) -> Result<Decimal>
where
    S: BudgetCategoryStore + ?Sized,
{
    match category_id {
        Some(id) => Ok(store.sum_linked_actuals(id, year)?.unwrap_or(Decimal::ZERO)),
        None => Ok(Decimal::ZERO),
    }
}

/// `(remaining, execution rate)`. Overspend gives a negative remainder and a
/// rate above 100.
pub fn remaining_and_rate(budget: Decimal, spent: Decimal) -> Result<(Decimal, Decimal)> {
    Ok((
        amount::difference(budget, spent)?,
        amount::percentage(spent, budget)?,
    ))
}

/// Reconciles one category for `year`. With `annualize`, monthly budgets are
/// scaled to a full year first.
pub fn reconcile<S>(
    store: &S,
    category: &AnnualExpense,
    year: i32,
    annualize: bool,
) -> Result<BudgetProgress>
where
    S: BudgetCategoryStore + ?Sized,
{
    let budget = if annualize {
        amount::annualize(category.budget_amount, category.is_monthly)?
    } else {
        category.budget_amount
    };
    let spent = spent_amount(store, category.id, year)?;
    let (remaining, rate) = remaining_and_rate(budget, spent)?;
    Ok(BudgetProgress {
        category_id: category.id,
        category: category.category.clone(),
        parent_group: category.parent_group,
        budget_amount: budget,
        spent_amount: spent,
        remaining_amount: remaining,
        execution_rate: rate,
    })
}

/// Overwrites the in-memory `spent_amount` of every category of `plan`.
pub fn refresh_spent_amounts<S>(store: &S, plan: &mut AnnualPlan) -> Result<()>
where
    S: BudgetCategoryStore + ?Sized,
{
    let year = plan.year;
    for category in plan.annual_expenses.iter_mut() {
        category.spent_amount = spent_amount(store, category.id, year)?;
    }
    Ok(())
}

/// Categories with a trackable annual target. Day-to-day spend is open-ended
/// and stays out of progress views.
pub fn tracked_categories(plan: &AnnualPlan) -> impl Iterator<Item = &AnnualExpense> {
    plan.annual_expenses
        .iter()
        .filter(|c| c.parent_group != ExpenseGroup::Daily)
}

pub fn budget_progress<S>(store: &S, plan: &AnnualPlan, annualize: bool) -> Result<Vec<BudgetProgress>>
where
    S: BudgetCategoryStore + ?Sized,
{
    tracked_categories(plan)
        .map(|c| reconcile(store, c, plan.year, annualize))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeLedger {
        sums: HashMap<(i64, i32), Decimal>,
    }

    impl BudgetCategoryStore for FakeLedger {
        fn find_category(&self, _id: i64) -> Result<Option<AnnualExpense>> {
            Ok(None)
        }

        fn sum_linked_actuals(&self, category_id: i64, year: i32) -> Result<Option<Decimal>> {
            Ok(self.sums.get(&(category_id, year)).copied())
        }

        fn clear_category_links(&self, _category_ids: &[i64]) -> Result<usize> {
            Ok(0)
        }
    }

    fn category(id: i64, group: ExpenseGroup, budget: Decimal, is_monthly: bool) -> AnnualExpense {
        AnnualExpense {
            id: Some(id),
            parent_group: group,
            category: format!("cat-{}", id),
            budget_amount: budget,
            is_monthly,
            spent_amount: dec!(999),
            sort_order: 0,
        }
    }

    #[test]
    fn spent_only_counts_the_requested_year() {
        let mut ledger = FakeLedger::default();
        ledger.sums.insert((1, 2026), dec!(300));
        ledger.sums.insert((1, 2025), dec!(5000));

        let c = category(1, ExpenseGroup::Leisure, dec!(1000), false);
        let p = reconcile(&ledger, &c, 2026, false).unwrap();
        assert_eq!(p.spent_amount, dec!(300));
        assert_eq!(p.remaining_amount, dec!(700));
        assert_eq!(p.execution_rate, dec!(30));
    }

    #[test]
    fn missing_actuals_mean_nothing_spent() {
        let ledger = FakeLedger::default();
        let c = category(4, ExpenseGroup::Other, dec!(250), false);
        let p = reconcile(&ledger, &c, 2026, false).unwrap();
        assert_eq!(p.spent_amount, Decimal::ZERO);
        assert_eq!(p.remaining_amount, dec!(250));
        assert_eq!(p.execution_rate, Decimal::ZERO);
    }

    #[test]
    fn overspend_is_representable() {
        let mut ledger = FakeLedger::default();
        ledger.sums.insert((2, 2026), dec!(1200));
        let c = category(2, ExpenseGroup::Protection, dec!(1000), false);
        let p = reconcile(&ledger, &c, 2026, false).unwrap();
        assert_eq!(p.remaining_amount, dec!(-200));
        assert_eq!(p.execution_rate, dec!(120));
    }

    #[test]
    fn annualized_budget_scales_monthly_categories() {
        let mut ledger = FakeLedger::default();
        ledger.sums.insert((3, 2026), dec!(600));
        let c = category(3, ExpenseGroup::Leisure, dec!(100), true);
        let p = reconcile(&ledger, &c, 2026, true).unwrap();
        assert_eq!(p.budget_amount, dec!(1200));
        assert_eq!(p.execution_rate, dec!(50));

        let raw = reconcile(&ledger, &c, 2026, false).unwrap();
        assert_eq!(raw.budget_amount, dec!(100));
        assert_eq!(raw.execution_rate, dec!(600));
    }

    #[test]
    fn zero_budget_has_zero_rate() {
        let mut ledger = FakeLedger::default();
        ledger.sums.insert((5, 2026), dec!(80));
        let c = category(5, ExpenseGroup::Other, Decimal::ZERO, false);
        let p = reconcile(&ledger, &c, 2026, false).unwrap();
        assert_eq!(p.execution_rate, Decimal::ZERO);
        assert_eq!(p.remaining_amount, dec!(-80));
    }

    #[test]
    fn refresh_ignores_the_stored_cache() {
        let mut ledger = FakeLedger::default();
        ledger.sums.insert((1, 2026), dec!(42));
        let mut plan = AnnualPlan::new(2026);
        plan.annual_expenses = vec![
            category(1, ExpenseGroup::Daily, dec!(100), true),
            category(9, ExpenseGroup::Leisure, dec!(100), true),
        ];
        refresh_spent_amounts(&ledger, &mut plan).unwrap();
        assert_eq!(plan.annual_expenses[0].spent_amount, dec!(42));
        assert_eq!(plan.annual_expenses[1].spent_amount, Decimal::ZERO);
    }

    #[test]
    fn progress_skips_daily_categories() {
        let ledger = FakeLedger::default();
        let mut plan = AnnualPlan::new(2026);
        plan.annual_expenses = vec![
            category(1, ExpenseGroup::Daily, dec!(100), true),
            category(2, ExpenseGroup::Leisure, dec!(100), true),
            category(3, ExpenseGroup::Protection, dec!(100), false),
        ];
        let rows = budget_progress(&ledger, &plan, false).unwrap();
        let ids: Vec<_> = rows.iter().filter_map(|r| r.category_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
