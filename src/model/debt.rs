use crate::model::{Amount, EntryType, LedgerEntry};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The opaque identifier the store assigns to a debt. Some stores send ids as JSON numbers, some
/// as strings; either way it is kept as text and never interpreted.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct DebtId(String);

impl DebtId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DebtId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DebtId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for DebtId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = DebtId;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(DebtId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(DebtId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(DebtId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// A snapshot of one debt: who it is owed by, how much was ever owed, how much is left, and the
/// history that explains the difference.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    id: DebtId,
    name: String,
    total_debt: Amount,
    remaining_debt: Amount,
    #[serde(default)]
    payments: Vec<LedgerEntry>,
}

impl Debt {
    pub fn new(
        id: DebtId,
        name: impl Into<String>,
        total_debt: Amount,
        remaining_debt: Amount,
        payments: Vec<LedgerEntry>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            total_debt,
            remaining_debt,
            payments,
        }
    }

    pub fn id(&self) -> &DebtId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_debt(&self) -> Amount {
        self.total_debt
    }

    pub fn remaining_debt(&self) -> Amount {
        self.remaining_debt
    }

    /// The full history, oldest first.
    pub fn payments(&self) -> &[LedgerEntry] {
        &self.payments
    }

    /// Builds the next snapshot with new balances and one more history entry. Only the ledger
    /// transitions call this.
    pub(crate) fn with_entry(
        &self,
        total_debt: Amount,
        remaining_debt: Amount,
        entry: LedgerEntry,
    ) -> Self {
        let mut payments = Vec::with_capacity(self.payments.len() + 1);
        payments.extend_from_slice(&self.payments);
        payments.push(entry);
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            total_debt,
            remaining_debt,
            payments,
        }
    }

    /// Sum of all entries of `entry_type`, `None` on overflow.
    fn sum_of(&self, entry_type: EntryType) -> Option<Amount> {
        Amount::checked_sum(
            self.payments
                .iter()
                .filter(|e| e.entry_type() == entry_type)
                .map(|e| e.amount()),
        )
    }

    /// Sum of all payments recorded against this debt, `None` if it does not fit in an `Amount`.
    pub fn paid_total(&self) -> Option<Amount> {
        self.sum_of(EntryType::Payment)
    }

    /// Sum of all increases recorded against this debt, `None` if it does not fit in an `Amount`.
    pub fn increased_total(&self) -> Option<Amount> {
        self.sum_of(EntryType::Increase)
    }

    /// The amount the debt was created with.
    pub fn initial_total(&self) -> Option<Amount> {
        self.total_debt.checked_sub(self.increased_total()?)
    }

    /// Replays the history from the initial total and returns the balance it produces, or `None`
    /// if some step of the replay overflows.
    pub fn replayed_remaining(&self) -> Option<Amount> {
        self.payments
            .iter()
            .try_fold(self.initial_total()?, |acc, e| match e.entry_type() {
                EntryType::Payment => acc.checked_sub(e.amount()),
                EntryType::Increase => acc.checked_add(e.amount()),
            })
    }

    /// Lists every ledger invariant this snapshot breaks. Snapshots produced by the ledger
    /// transitions from a well-formed debt always return an empty list; records edited by other
    /// clients directly on the server may not.
    pub fn check_invariants(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(Violation::EmptyName);
        }
        if self.remaining_debt.is_negative() {
            violations.push(Violation::NegativeRemaining {
                remaining: self.remaining_debt,
            });
        }
        if self.remaining_debt > self.total_debt {
            violations.push(Violation::RemainingAboveTotal {
                remaining: self.remaining_debt,
                total: self.total_debt,
            });
        }
        for (index, entry) in self.payments.iter().enumerate() {
            if !entry.amount().is_positive() {
                violations.push(Violation::NonPositiveEntry {
                    index,
                    amount: entry.amount(),
                });
            }
        }
        match self.initial_total() {
            Some(initial) if initial.is_negative() => {
                violations.push(Violation::NegativeInitialTotal { initial });
            }
            Some(_) => {}
            None => violations.push(Violation::Overflow),
        }
        match self.replayed_remaining() {
            Some(replayed) if replayed != self.remaining_debt => {
                violations.push(Violation::ReplayMismatch {
                    replayed,
                    remaining: self.remaining_debt,
                });
            }
            Some(_) => {}
            None if self.initial_total().is_some() => violations.push(Violation::Overflow),
            None => {}
        }
        violations
    }
}

/// The body sent to the store to create a debt: a debt that has no id yet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebt {
    name: String,
    total_debt: Amount,
    remaining_debt: Amount,
    payments: Vec<LedgerEntry>,
}

impl NewDebt {
    /// A fresh debt owes everything it was created with and has no history.
    pub fn new(name: impl Into<String>, total_debt: Amount) -> Self {
        Self {
            name: name.into(),
            total_debt,
            remaining_debt: total_debt,
            payments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_debt(&self) -> Amount {
        self.total_debt
    }

    /// Attaches the id the store assigned.
    pub fn into_debt(self, id: DebtId) -> Debt {
        Debt {
            id,
            name: self.name,
            total_debt: self.total_debt,
            remaining_debt: self.remaining_debt,
            payments: self.payments,
        }
    }
}

/// A broken ledger invariant found by `Debt::check_invariants`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "violation")]
pub enum Violation {
    EmptyName,
    NegativeRemaining { remaining: Amount },
    RemainingAboveTotal { remaining: Amount, total: Amount },
    NegativeInitialTotal { initial: Amount },
    NonPositiveEntry { index: usize, amount: Amount },
    ReplayMismatch { replayed: Amount, remaining: Amount },
    Overflow,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyName => write!(f, "the name is empty"),
            Violation::NegativeRemaining { remaining } => {
                write!(f, "the remaining debt {remaining} is negative")
            }
            Violation::RemainingAboveTotal { remaining, total } => {
                write!(f, "the remaining debt {remaining} exceeds the total {total}")
            }
            Violation::NegativeInitialTotal { initial } => {
                write!(f, "the increases imply a negative initial total {initial}")
            }
            Violation::NonPositiveEntry { index, amount } => {
                write!(f, "history entry {index} has non-positive amount {amount}")
            }
            Violation::ReplayMismatch {
                replayed,
                remaining,
            } => write!(
                f,
                "replaying the history gives {replayed} but the remaining debt is {remaining}"
            ),
            Violation::Overflow => write!(f, "the history sums beyond the largest amount"),
        }
    }
}
