// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Decimal helpers shared by every aggregation so rounding stays consistent.
//!
//! All arithmetic is checked; an overflow surfaces as
//! [`LedgerError::Arithmetic`] instead of a panic.

use crate::error::{LedgerError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn checked(value: Option<Decimal>, what: &'static str) -> Result<Decimal> {
    value.ok_or(LedgerError::Arithmetic(what))
}

/// Sum of `values`; zero for an empty sequence.
pub fn sum<I>(values: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked(acc.checked_add(v), "sum"))
}

/// `a - b`.
pub fn difference(a: Decimal, b: Decimal) -> Result<Decimal> {
    checked(a.checked_sub(b), "difference")
}

/// `round(numerator / denominator, 4, half-up) * 100`, or zero when the
/// denominator is not positive.
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
    if denominator <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let ratio = checked(numerator.checked_div(denominator), "percentage")?
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    checked(ratio.checked_mul(HUNDRED), "percentage")
}

/// `value * 12`.
pub fn twelve_months(value: Decimal) -> Result<Decimal> {
    checked(value.checked_mul(Decimal::from(12)), "twelve months")
}

/// Budgets tagged monthly are annualized by twelve for year-level views.
pub fn annualize(value: Decimal, is_monthly: bool) -> Result<Decimal> {
    if is_monthly {
        twelve_months(value)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(sum(Vec::new()).unwrap(), Decimal::ZERO);
        assert_eq!(sum([dec!(1.25), dec!(2.75)]).unwrap(), dec!(4));
    }

    #[test]
    fn sum_past_the_decimal_range_is_an_error() {
        let err = sum([Decimal::MAX, dec!(1)]).unwrap_err();
        assert!(err.is_arithmetic());
        assert!(difference(Decimal::MIN, dec!(1)).unwrap_err().is_arithmetic());
        assert!(twelve_months(Decimal::MAX).unwrap_err().is_arithmetic());
    }

    #[test]
    fn percentage_rounds_half_up_at_four_places() {
        // 1/3 = 0.33333.. -> 0.3333
        assert_eq!(percentage(dec!(1), dec!(3)).unwrap(), dec!(33.33));
        // 2/3 = 0.66666.. -> 0.6667
        assert_eq!(percentage(dec!(2), dec!(3)).unwrap(), dec!(66.67));
        // 0.00005 sits exactly on the midpoint and rounds away from zero
        assert_eq!(percentage(dec!(0.00005), dec!(1)).unwrap(), dec!(0.01));
    }

    #[test]
    fn percentage_of_degenerate_denominator_is_zero() {
        assert_eq!(percentage(dec!(500), dec!(0)).unwrap(), Decimal::ZERO);
        assert_eq!(percentage(dec!(500), dec!(-10)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn percentage_of_tiny_budget_is_an_error() {
        let err = percentage(dec!(1000000000), dec!(0.0000000000000000000001)).unwrap_err();
        assert!(err.is_arithmetic());
        assert_eq!(err.to_string(), "Arithmetic overflow computing percentage");
    }

    #[test]
    fn overspend_exceeds_one_hundred() {
        assert_eq!(percentage(dec!(1200), dec!(1000)).unwrap(), dec!(120));
    }

    #[test]
    fn annualize_only_touches_monthly_values() {
        assert_eq!(annualize(dec!(1.5), true).unwrap(), dec!(18));
        assert_eq!(annualize(dec!(1.5), false).unwrap(), dec!(1.5));
        assert_eq!(annualize(Decimal::MAX, false).unwrap(), Decimal::MAX);
    }

    proptest! {
        #[test]
        fn percentage_matches_rounded_ratio(
            spent in 0i64..10_000_000,
            budget in 1i64..10_000_000,
        ) {
            let spent = Decimal::new(spent, 2);
            let budget = Decimal::new(budget, 2);
            let expected = (spent / budget)
                .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
                * dec!(100);
            prop_assert_eq!(percentage(spent, budget).unwrap(), expected);
        }

        #[test]
        fn percentage_is_zero_for_non_positive_budget(
            spent in -10_000_000i64..10_000_000,
            budget in -10_000_000i64..=0,
        ) {
            prop_assert_eq!(
                percentage(Decimal::new(spent, 2), Decimal::new(budget, 2)).unwrap(),
                Decimal::ZERO
            );
        }
    }
}
