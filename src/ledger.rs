//! The ledger state transitions.
//!
//! A debt changes in exactly two ways: a payment lowers what is left, an increase raises both the
//! total and what is left. Both append to the history and neither touches the input snapshot, so
//! the balance can always be rebuilt by replaying the history from the initial total. Nothing here
//! does I/O; the only thing read from the environment is the clock.

use crate::model::{Amount, Debt, EntryType, LedgerEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the ledger refused an operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum LedgerError {
    /// The amount was zero or negative, or too large to add to the debt.
    #[error("The amount must be greater than zero and fit the debt, got {0}")]
    InvalidAmount(Amount),

    /// The payment is larger than what is still owed.
    #[error("The payment of {amount} exceeds the remaining debt of {remaining}")]
    ExceedsBalance { amount: Amount, remaining: Amount },
}

/// Rejects an amount that can never be recorded, whatever the debt.
///
/// # Errors
/// - `InvalidAmount` if `amount <= 0`
pub fn check_amount(amount: Amount) -> Result<(), LedgerError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}

/// Records a payment of `amount` against `debt`, stamped with the current time.
pub fn record_payment(debt: &Debt, amount: Amount) -> Result<Debt, LedgerError> {
    record_payment_at(debt, amount, Utc::now())
}

/// Records a payment of `amount` against `debt`, stamped with `date`.
///
/// # Errors
/// - `InvalidAmount` if `amount <= 0`
/// - `ExceedsBalance` if `amount` is more than the remaining debt
pub fn record_payment_at(
    debt: &Debt,
    amount: Amount,
    date: DateTime<Utc>,
) -> Result<Debt, LedgerError> {
    check_amount(amount)?;
    let remaining = debt.remaining_debt();
    if amount > remaining {
        return Err(LedgerError::ExceedsBalance { amount, remaining });
    }
    let next_remaining = remaining
        .checked_sub(amount)
        .ok_or(LedgerError::InvalidAmount(amount))?;
    Ok(debt.with_entry(
        debt.total_debt(),
        next_remaining,
        LedgerEntry::new(amount, date, EntryType::Payment),
    ))
}

/// Records an increase of `amount` against `debt`, stamped with the current time.
pub fn record_increase(debt: &Debt, amount: Amount) -> Result<Debt, LedgerError> {
    record_increase_at(debt, amount, Utc::now())
}

/// Records an increase of `amount` against `debt`, stamped with `date`.
///
/// # Errors
/// - `InvalidAmount` if `amount <= 0` or the new total does not fit in an `Amount`
pub fn record_increase_at(
    debt: &Debt,
    amount: Amount,
    date: DateTime<Utc>,
) -> Result<Debt, LedgerError> {
    check_amount(amount)?;
    let overflow = LedgerError::InvalidAmount(amount);
    let total = debt.total_debt().checked_add(amount).ok_or(overflow)?;
    let remaining = debt.remaining_debt().checked_add(amount).ok_or(overflow)?;
    Ok(debt.with_entry(
        total,
        remaining,
        LedgerEntry::new(amount, date, EntryType::Increase),
    ))
}

/// A ledger operation held as a value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "amount")]
pub enum Transition {
    Payment(Amount),
    Increase(Amount),
}

impl Transition {
    pub fn amount(&self) -> Amount {
        match self {
            Transition::Payment(a) | Transition::Increase(a) => *a,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Transition::Payment(_) => EntryType::Payment,
            Transition::Increase(_) => EntryType::Increase,
        }
    }

    /// Rejects the operation before any debt is looked at when its amount can never be recorded.
    pub fn validate(&self) -> Result<(), LedgerError> {
        check_amount(self.amount())
    }

    /// Applies the operation to `debt`, stamped with the current time.
    pub fn apply(&self, debt: &Debt) -> Result<Debt, LedgerError> {
        self.apply_at(debt, Utc::now())
    }

    /// Applies the operation to `debt`, stamped with `date`.
    pub fn apply_at(&self, debt: &Debt, date: DateTime<Utc>) -> Result<Debt, LedgerError> {
        match *self {
            Transition::Payment(amount) => record_payment_at(debt, amount, date),
            Transition::Increase(amount) => record_increase_at(debt, amount, date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DebtId, NewDebt};
    use chrono::TimeZone;
    use std::str::FromStr;

    fn alex() -> Debt {
        NewDebt::new("Alex", Amount::from(1000)).into_debt(DebtId::new("1"))
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_created_debt_owes_everything() {
        let debt = alex();
        assert_eq!(debt.remaining_debt(), Amount::from(1000));
        assert_eq!(debt.total_debt(), Amount::from(1000));
        assert!(debt.payments().is_empty());
    }

    #[test]
    fn test_payment_lowers_remaining_only() {
        let debt = alex();
        let next = record_payment_at(&debt, Amount::from(300), at(1)).unwrap();
        assert_eq!(next.remaining_debt(), Amount::from(700));
        assert_eq!(next.total_debt(), Amount::from(1000));
        assert_eq!(next.id(), debt.id());
        assert_eq!(next.name(), "Alex");
        assert_eq!(
            next.payments(),
            &[LedgerEntry::new(Amount::from(300), at(1), EntryType::Payment)]
        );
        // the input snapshot is untouched
        assert_eq!(debt, alex());
    }

    #[test]
    fn test_payment_of_entire_balance() {
        let next = record_payment(&alex(), Amount::from(1000)).unwrap();
        assert!(next.remaining_debt().is_zero());
        assert!(next.check_invariants().is_empty());
    }

    #[test]
    fn test_payment_rejects_non_positive() {
        let debt = alex();
        for amount in [Amount::ZERO, Amount::from(-5)] {
            assert_eq!(
                record_payment(&debt, amount),
                Err(LedgerError::InvalidAmount(amount))
            );
        }
    }

    #[test]
    fn test_payment_rejects_overpayment() {
        let debt = record_payment_at(&alex(), Amount::from(300), at(1)).unwrap();
        let err = record_payment(&debt, Amount::from(800)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ExceedsBalance {
                amount: Amount::from(800),
                remaining: Amount::from(700),
            }
        );
        assert_eq!(debt.remaining_debt(), Amount::from(700));
        assert_eq!(debt.payments().len(), 1);
    }

    #[test]
    fn test_increase_raises_both() {
        let debt = record_payment_at(&alex(), Amount::from(300), at(1)).unwrap();
        let next = record_increase_at(&debt, Amount::from(200), at(2)).unwrap();
        assert_eq!(next.total_debt(), Amount::from(1200));
        assert_eq!(next.remaining_debt(), Amount::from(900));
        assert_eq!(next.payments().len(), 2);
        assert_eq!(next.payments()[1].entry_type(), EntryType::Increase);
        assert_eq!(next.payments()[1].date(), at(2));
    }

    #[test]
    fn test_increase_rejects_non_positive() {
        assert_eq!(
            record_increase(&alex(), Amount::ZERO),
            Err(LedgerError::InvalidAmount(Amount::ZERO))
        );
    }

    #[test]
    fn test_increase_past_the_largest_amount_is_rejected() {
        let debt = alex();
        let amount = Amount::from_str("79228162514264337593543950335").unwrap();
        assert_eq!(
            record_increase(&debt, amount),
            Err(LedgerError::InvalidAmount(amount))
        );
        assert_eq!(debt, alex());
    }

    #[test]
    fn test_validate_checks_only_the_amount() {
        assert!(Transition::Payment(Amount::from(1)).validate().is_ok());
        assert_eq!(
            Transition::Increase(Amount::ZERO).validate(),
            Err(LedgerError::InvalidAmount(Amount::ZERO))
        );
        assert_eq!(
            Transition::Payment(Amount::from(-2)).validate(),
            Err(LedgerError::InvalidAmount(Amount::from(-2)))
        );
    }

    #[test]
    fn test_increase_on_paid_off_debt_reopens_it() {
        let paid = record_payment(&alex(), Amount::from(1000)).unwrap();
        let next = record_increase(&paid, Amount::from(50)).unwrap();
        assert_eq!(next.remaining_debt(), Amount::from(50));
        assert_eq!(next.total_debt(), Amount::from(1050));
    }

    #[test]
    fn test_replay_after_mixed_sequence() {
        let amounts = [
            Transition::Payment(Amount::from(120)),
            Transition::Increase(Amount::from_str("45.5").unwrap()),
            Transition::Payment(Amount::from_str("0.1").unwrap()),
            Transition::Payment(Amount::from_str("0.2").unwrap()),
            Transition::Increase(Amount::from(1)),
            Transition::Payment(Amount::from(900)),
        ];
        let mut debt = alex();
        for (day, t) in amounts.iter().enumerate() {
            debt = t.apply_at(&debt, at(day as u32 + 1)).unwrap();
            assert!(debt.check_invariants().is_empty(), "{:?}", debt);
            assert_eq!(debt.replayed_remaining(), Some(debt.remaining_debt()));
            assert_eq!(debt.initial_total(), Some(Amount::from(1000)));
            assert_eq!(
                debt.total_debt().checked_sub(debt.remaining_debt()),
                debt.paid_total()
            );
        }
        assert_eq!(debt.remaining_debt(), Amount::from_str("26.2").unwrap());
        assert_eq!(debt.payments().len(), amounts.len());
    }

    #[test]
    fn test_rejected_transition_in_sequence_changes_nothing() {
        let debt = Transition::Payment(Amount::from(999)).apply(&alex()).unwrap();
        let before = debt.clone();
        assert!(Transition::Payment(Amount::from(2)).apply(&debt).is_err());
        assert_eq!(debt, before);
    }

    #[test]
    fn test_transition_accessors() {
        let t = Transition::Increase(Amount::from(3));
        assert_eq!(t.amount(), Amount::from(3));
        assert_eq!(t.entry_type(), EntryType::Increase);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"type":"increase","amount":3}"#);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use rust_decimal::Decimal;

        const MAX_CENTS: i64 = 100_000_000_00;

        fn cents(n: i64) -> Amount {
            Amount::new(Decimal::new(n, 2))
        }

        /// A debt created at `total` cents that has since been paid down by `paid` cents.
        fn debt_with(total: i64, paid: i64) -> Debt {
            let debt = NewDebt::new("Alex", cents(total)).into_debt(DebtId::new("1"));
            if paid == 0 {
                debt
            } else {
                record_payment_at(&debt, cents(paid), at(1)).unwrap()
            }
        }

        prop_compose! {
            fn arb_debt()(total in 0..MAX_CENTS)(
                total in Just(total),
                paid in 0..=total,
            ) -> Debt {
                debt_with(total, paid)
            }
        }

        /// A debt and a payment of at least one cent and at most what remains.
        fn arb_payment() -> impl Strategy<Value = (Debt, Amount)> {
            (1..MAX_CENTS)
                .prop_flat_map(|total| (Just(total), 0..total))
                .prop_flat_map(|(total, paid)| (Just(debt_with(total, paid)), 1..=(total - paid)))
                .prop_map(|(debt, amount)| (debt, cents(amount)))
        }

        proptest! {
            #[test]
            fn test_payment_lowers_remaining_by_amount((debt, amount) in arb_payment()) {
                let next = record_payment_at(&debt, amount, at(2)).unwrap();
                prop_assert_eq!(
                    Some(next.remaining_debt()),
                    debt.remaining_debt().checked_sub(amount)
                );
                prop_assert_eq!(next.total_debt(), debt.total_debt());
                prop_assert_eq!(next.payments().len(), debt.payments().len() + 1);
                prop_assert_eq!(&next.payments()[..debt.payments().len()], debt.payments());
                prop_assert!(next.check_invariants().is_empty());
            }

            #[test]
            fn test_non_positive_amounts_leave_debt_alone(
                debt in arb_debt(),
                n in -MAX_CENTS..=0,
            ) {
                let before = debt.clone();
                let amount = cents(n);
                prop_assert_eq!(
                    record_payment_at(&debt, amount, at(2)),
                    Err(LedgerError::InvalidAmount(amount))
                );
                prop_assert_eq!(
                    record_increase_at(&debt, amount, at(2)),
                    Err(LedgerError::InvalidAmount(amount))
                );
                prop_assert_eq!(debt, before);
            }

            #[test]
            fn test_overpayment_leaves_debt_alone(debt in arb_debt(), extra in 1..MAX_CENTS) {
                let before = debt.clone();
                let remaining = debt.remaining_debt();
                let amount = remaining.checked_add(cents(extra)).unwrap();
                prop_assert_eq!(
                    record_payment_at(&debt, amount, at(2)),
                    Err(LedgerError::ExceedsBalance { amount, remaining })
                );
                prop_assert_eq!(debt, before);
            }

            #[test]
            fn test_increase_raises_both_by_amount(debt in arb_debt(), n in 1..MAX_CENTS) {
                let amount = cents(n);
                let next = record_increase_at(&debt, amount, at(2)).unwrap();
                prop_assert_eq!(
                    Some(next.total_debt()),
                    debt.total_debt().checked_add(amount)
                );
                prop_assert_eq!(
                    Some(next.remaining_debt()),
                    debt.remaining_debt().checked_add(amount)
                );
                prop_assert_eq!(next.payments().len(), debt.payments().len() + 1);
                prop_assert!(next.check_invariants().is_empty());
            }

            #[test]
            fn test_replay_reproduces_remaining(
                total in 0..MAX_CENTS,
                steps in prop::collection::vec((any::<bool>(), 1..MAX_CENTS), 0..40),
            ) {
                let initial = cents(total);
                let mut debt = NewDebt::new("Alex", initial).into_debt(DebtId::new("1"));
                for (is_payment, n) in steps {
                    let transition = if is_payment {
                        Transition::Payment(cents(n))
                    } else {
                        Transition::Increase(cents(n))
                    };
                    match transition.apply_at(&debt, at(2)) {
                        Ok(next) => debt = next,
                        Err(e) => {
                            prop_assert!(
                                matches!(e, LedgerError::ExceedsBalance { .. }),
                                "unexpected rejection {}",
                                e
                            );
                        }
                    }
                    prop_assert_eq!(debt.replayed_remaining(), Some(debt.remaining_debt()));
                    prop_assert_eq!(debt.initial_total(), Some(initial));
                    prop_assert!(debt.check_invariants().is_empty());
                }
            }
        }
    }
}
