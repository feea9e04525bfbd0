// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount;
use crate::error::{FieldError, LedgerError, Result, UnknownVariant};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetGroup {
    Liquid,
    Protection,
    Investment,
}

impl AssetGroup {
    pub const ALL: [AssetGroup; 3] = [
        AssetGroup::Liquid,
        AssetGroup::Protection,
        AssetGroup::Investment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetGroup::Liquid => "LIQUID",
            AssetGroup::Protection => "PROTECTION",
            AssetGroup::Investment => "INVESTMENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetGroup::Liquid => "Liquid cash",
            AssetGroup::Protection => "Protection",
            AssetGroup::Investment => "Investment",
        }
    }
}

impl FromStr for AssetGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIQUID" => Ok(AssetGroup::Liquid),
            "PROTECTION" => Ok(AssetGroup::Protection),
            "INVESTMENT" => Ok(AssetGroup::Investment),
            _ => Err(UnknownVariant {
                kind: "asset group",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiabilityGroup {
    #[default]
    Loan,
}

impl LiabilityGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiabilityGroup::Loan => "LOAN",
        }
    }
}

impl FromStr for LiabilityGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOAN" => Ok(LiabilityGroup::Loan),
            _ => Err(UnknownVariant {
                kind: "liability group",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeType {
    Salary,
    Fund,
    Bonus,
    Dividend,
    #[default]
    Other,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeType::Salary => "SALARY",
            IncomeType::Fund => "FUND",
            IncomeType::Bonus => "BONUS",
            IncomeType::Dividend => "DIVIDEND",
            IncomeType::Other => "OTHER",
        }
    }
}

impl FromStr for IncomeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SALARY" => Ok(IncomeType::Salary),
            "FUND" => Ok(IncomeType::Fund),
            "BONUS" => Ok(IncomeType::Bonus),
            "DIVIDEND" => Ok(IncomeType::Dividend),
            "OTHER" => Ok(IncomeType::Other),
            _ => Err(UnknownVariant {
                kind: "income type",
                value: s.to_string(),
            }),
        }
    }
}

/// Parent group of a budget category. `Daily` marks open-ended day-to-day spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseGroup {
    Protection,
    Leisure,
    #[default]
    Daily,
    Other,
}

impl ExpenseGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseGroup::Protection => "PROTECTION",
            ExpenseGroup::Leisure => "LEISURE",
            ExpenseGroup::Daily => "DAILY",
            ExpenseGroup::Other => "OTHER",
        }
    }
}

impl FromStr for ExpenseGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROTECTION" => Ok(ExpenseGroup::Protection),
            "LEISURE" => Ok(ExpenseGroup::Leisure),
            "DAILY" => Ok(ExpenseGroup::Daily),
            "OTHER" => Ok(ExpenseGroup::Other),
            _ => Err(UnknownVariant {
                kind: "expense group",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Annual plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTarget {
    pub id: Option<i64>,
    pub group: AssetGroup,
    pub name: String,
    pub target_amount: Decimal,
    pub allocation_percentage: Option<Decimal>,
    pub expected_return_rate: Option<Decimal>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityTarget {
    pub id: Option<i64>,
    pub group: LiabilityGroup,
    pub name: String,
    pub target_balance: Decimal,
    pub interest_rate: Option<Decimal>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualIncome {
    pub id: Option<i64>,
    pub income_type: IncomeType,
    pub name: String,
    pub amount: Decimal,
    pub is_monthly: bool,
    pub remark: Option<String>,
    pub sort_order: i32,
}

/// A budget category. `spent_amount` is a display cache; the authoritative figure
/// always comes from `budget::spent_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualExpense {
    pub id: Option<i64>,
    pub parent_group: ExpenseGroup,
    pub category: String,
    pub budget_amount: Decimal,
    pub is_monthly: bool,
    pub spent_amount: Decimal,
    pub sort_order: i32,
}

impl AnnualExpense {
    pub fn remaining_amount(&self) -> Result<Decimal> {
        amount::difference(self.budget_amount, self.spent_amount)
    }

    pub fn execution_rate(&self) -> Result<Decimal> {
        amount::percentage(self.spent_amount, self.budget_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualPlan {
    pub id: Option<i64>,
    pub year: i32,
    pub monthly_surplus: Decimal,
    pub annual_surplus: Decimal,
    pub asset_targets: Vec<AssetTarget>,
    pub liability_targets: Vec<LiabilityTarget>,
    pub annual_incomes: Vec<AnnualIncome>,
    pub annual_expenses: Vec<AnnualExpense>,
}

impl AnnualPlan {
    pub fn new(year: i32) -> Self {
        Self {
            id: None,
            year,
            monthly_surplus: Decimal::ZERO,
            annual_surplus: Decimal::ZERO,
            asset_targets: Vec::new(),
            liability_targets: Vec::new(),
            annual_incomes: Vec::new(),
            annual_expenses: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Monthly record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    pub id: Option<i64>,
    pub group: AssetGroup,
    pub name: String,
    pub amount: Decimal,
    pub return_rate: Option<Decimal>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityDetail {
    pub id: Option<i64>,
    pub name: String,
    pub amount: Decimal,
    pub interest_rate: Option<Decimal>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeDetail {
    pub id: Option<i64>,
    pub name: String,
    pub amount: Decimal,
    pub sort_order: i32,
}

/// An actual spend line. `annual_expense_id` is a weak link to a budget category:
/// it may be empty and is never checked against the record's year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDetail {
    pub id: Option<i64>,
    pub annual_expense_id: Option<i64>,
    pub name: String,
    pub amount: Decimal,
    pub detail: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub id: Option<i64>,
    pub year: i32,
    pub month: u32,
    pub summary: Option<String>,
    pub total_asset: Decimal,
    pub total_liability: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub asset_details: Vec<AssetDetail>,
    pub liability_details: Vec<LiabilityDetail>,
    pub income_details: Vec<IncomeDetail>,
    pub expense_details: Vec<ExpenseDetail>,
}

impl MonthlyRecord {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            id: None,
            year,
            month,
            summary: None,
            total_asset: Decimal::ZERO,
            total_liability: Decimal::ZERO,
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            asset_details: Vec::new(),
            liability_details: Vec::new(),
            income_details: Vec::new(),
            expense_details: Vec::new(),
        }
    }

    pub fn net_worth(&self) -> Result<Decimal> {
        amount::difference(self.total_asset, self.total_liability)
    }

    pub fn surplus(&self) -> Result<Decimal> {
        amount::difference(self.total_income, self.total_expense)
    }

    pub fn recalculate_totals(&mut self) -> Result<()> {
        self.total_asset = amount::sum(self.asset_details.iter().map(|d| d.amount))?;
        self.total_liability = amount::sum(self.liability_details.iter().map(|d| d.amount))?;
        self.total_income = amount::sum(self.income_details.iter().map(|d| d.amount))?;
        self.total_expense = amount::sum(self.expense_details.iter().map(|d| d.amount))?;
        Ok(())
    }

    pub fn has_lines(&self) -> bool {
        !(self.asset_details.is_empty()
            && self.liability_details.is_empty()
            && self.income_details.is_empty()
            && self.expense_details.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Requests (form submissions and parsed imports)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetTargetInput {
    pub group: Option<AssetGroup>,
    #[serde(default)]
    pub name: String,
    pub target_amount: Option<Decimal>,
    pub allocation_percentage: Option<Decimal>,
    pub expected_return_rate: Option<Decimal>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiabilityTargetInput {
    pub group: Option<LiabilityGroup>,
    #[serde(default)]
    pub name: String,
    pub target_balance: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnualIncomeInput {
    pub income_type: Option<IncomeType>,
    #[serde(default)]
    pub name: String,
    pub amount: Option<Decimal>,
    pub is_monthly: Option<bool>,
    pub remark: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnualExpenseInput {
    pub parent_group: Option<ExpenseGroup>,
    #[serde(default)]
    pub category: String,
    pub budget_amount: Option<Decimal>,
    pub is_monthly: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Create-or-update payload for a year's plan. An absent collection leaves the
/// stored one untouched; a present one (even empty) replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub year: i32,
    pub asset_targets: Option<Vec<AssetTargetInput>>,
    pub liability_targets: Option<Vec<LiabilityTargetInput>>,
    pub annual_incomes: Option<Vec<AnnualIncomeInput>>,
    pub annual_expenses: Option<Vec<AnnualExpenseInput>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetDetailInput {
    pub group: Option<AssetGroup>,
    #[serde(default)]
    pub name: String,
    pub amount: Option<Decimal>,
    pub return_rate: Option<Decimal>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiabilityDetailInput {
    #[serde(default)]
    pub name: String,
    pub amount: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeDetailInput {
    #[serde(default)]
    pub name: String,
    pub amount: Option<Decimal>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseDetailInput {
    pub annual_expense_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    pub amount: Option<Decimal>,
    pub detail: Option<String>,
    pub sort_order: Option<i32>,
}

/// The four line-item collections of a month, as submitted or parsed from an import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordLines {
    pub asset_details: Option<Vec<AssetDetailInput>>,
    pub liability_details: Option<Vec<LiabilityDetailInput>>,
    pub income_details: Option<Vec<IncomeDetailInput>>,
    pub expense_details: Option<Vec<ExpenseDetailInput>>,
}

impl RecordLines {
    /// True when every collection is absent or empty: the caller's signal for carry-forward.
    pub fn is_empty(&self) -> bool {
        self.asset_details.as_ref().is_none_or(|v| v.is_empty())
            && self.liability_details.as_ref().is_none_or(|v| v.is_empty())
            && self.income_details.as_ref().is_none_or(|v| v.is_empty())
            && self.expense_details.as_ref().is_none_or(|v| v.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordRequest {
    pub year: i32,
    pub month: u32,
    pub summary: Option<String>,
    #[serde(flatten)]
    pub lines: RecordLines,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_name(errors: &mut Vec<FieldError>, path: String, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(path, "must not be blank"));
    }
}

fn check_amount(errors: &mut Vec<FieldError>, path: String, value: Option<Decimal>) {
    if value.is_none() {
        errors.push(FieldError::new(path, "is required"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(errors))
    }
}

impl PlanRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.year < 1 {
            errors.push(FieldError::new("year", "must be a positive year"));
        }
        for (i, t) in self.asset_targets.iter().flatten().enumerate() {
            if t.group.is_none() {
                errors.push(FieldError::new(
                    format!("asset_targets[{}].group", i),
                    "is required",
                ));
            }
            check_name(&mut errors, format!("asset_targets[{}].name", i), &t.name);
            check_amount(
                &mut errors,
                format!("asset_targets[{}].target_amount", i),
                t.target_amount,
            );
        }
        for (i, t) in self.liability_targets.iter().flatten().enumerate() {
            check_name(&mut errors, format!("liability_targets[{}].name", i), &t.name);
            check_amount(
                &mut errors,
                format!("liability_targets[{}].target_balance", i),
                t.target_balance,
            );
        }
        for (i, inc) in self.annual_incomes.iter().flatten().enumerate() {
            if inc.income_type.is_none() {
                errors.push(FieldError::new(
                    format!("annual_incomes[{}].income_type", i),
                    "is required",
                ));
            }
            check_name(&mut errors, format!("annual_incomes[{}].name", i), &inc.name);
            check_amount(
                &mut errors,
                format!("annual_incomes[{}].amount", i),
                inc.amount,
            );
        }
        for (i, e) in self.annual_expenses.iter().flatten().enumerate() {
            check_name(
                &mut errors,
                format!("annual_expenses[{}].category", i),
                &e.category,
            );
            check_amount(
                &mut errors,
                format!("annual_expenses[{}].budget_amount", i),
                e.budget_amount,
            );
        }
        finish(errors)
    }
}

impl RecordLines {
    fn collect_errors(&self, errors: &mut Vec<FieldError>) {
        for (i, d) in self.asset_details.iter().flatten().enumerate() {
            if d.group.is_none() {
                errors.push(FieldError::new(
                    format!("asset_details[{}].group", i),
                    "is required",
                ));
            }
            check_name(errors, format!("asset_details[{}].name", i), &d.name);
            check_amount(errors, format!("asset_details[{}].amount", i), d.amount);
        }
        for (i, d) in self.liability_details.iter().flatten().enumerate() {
            check_name(errors, format!("liability_details[{}].name", i), &d.name);
            check_amount(errors, format!("liability_details[{}].amount", i), d.amount);
        }
        for (i, d) in self.income_details.iter().flatten().enumerate() {
            check_name(errors, format!("income_details[{}].name", i), &d.name);
            check_amount(errors, format!("income_details[{}].amount", i), d.amount);
        }
        for (i, d) in self.expense_details.iter().flatten().enumerate() {
            check_name(errors, format!("expense_details[{}].name", i), &d.name);
            check_amount(errors, format!("expense_details[{}].amount", i), d.amount);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        self.collect_errors(&mut errors);
        finish(errors)
    }
}

impl RecordRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.year < 1 {
            errors.push(FieldError::new("year", "must be a positive year"));
        }
        if !(1..=12).contains(&self.month) {
            errors.push(FieldError::new("month", "must be between 1 and 12"));
        }
        self.lines.collect_errors(&mut errors);
        finish(errors)
    }
}
