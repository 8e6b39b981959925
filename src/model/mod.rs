//! Types that represent the core data model, such as `Debt` and `LedgerEntry`.
mod amount;
mod debt;
mod entry;

pub use amount::{Amount, AmountError};
pub use debt::{Debt, DebtId, NewDebt, Violation};
pub use entry::{EntryType, LedgerEntry};
