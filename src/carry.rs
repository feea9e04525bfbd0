// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AssetDetail, ExpenseDetail, IncomeDetail, LiabilityDetail, MonthlyRecord};
use rust_decimal::Decimal;

/// The calendar month before `(year, month)`; January rolls back to the
/// previous December.
pub fn previous_period(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Builds the skeleton of `(year, month)` from the month before it.
///
/// Every line keeps its name, grouping, rates, order and (for expenses) its
/// budget-category link; amounts become zero and expense notes are dropped.
/// Without a prior record the result has no lines. The result is unsaved:
/// it carries no identity and no summary.
pub fn carry_forward(prior: Option<&MonthlyRecord>, year: i32, month: u32) -> MonthlyRecord {
    let mut next = MonthlyRecord::new(year, month);
    let Some(prior) = prior else {
        return next;
    };

    next.asset_details = prior
        .asset_details
        .iter()
        .map(|d| AssetDetail {
            id: None,
            group: d.group,
            name: d.name.clone(),
            amount: Decimal::ZERO,
            return_rate: d.return_rate,
            sort_order: d.sort_order,
        })
        .collect();
    next.liability_details = prior
        .liability_details
        .iter()
        .map(|d| LiabilityDetail {
            id: None,
            name: d.name.clone(),
            amount: Decimal::ZERO,
            interest_rate: d.interest_rate,
            sort_order: d.sort_order,
        })
        .collect();
    next.income_details = prior
        .income_details
        .iter()
        .map(|d| IncomeDetail {
            id: None,
            name: d.name.clone(),
            amount: Decimal::ZERO,
            sort_order: d.sort_order,
        })
        .collect();
    next.expense_details = prior
        .expense_details
        .iter()
        .map(|d| ExpenseDetail {
            id: None,
            annual_expense_id: d.annual_expense_id,
            name: d.name.clone(),
            amount: Decimal::ZERO,
            detail: None,
            sort_order: d.sort_order,
        })
        .collect();
    next
}
