use crate::model::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of change a `LedgerEntry` records.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Money paid back, reduces the remaining debt.
    Payment,
    /// Money added to the debt, raises both the total and the remaining debt.
    Increase,
}

serde_plain::derive_display_from_serialize!(EntryType);
serde_plain::derive_fromstr_from_deserialize!(EntryType);

impl EntryType {
    /// The label used in the history table.
    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Payment => "Payment",
            EntryType::Increase => "Increase",
        }
    }
}

/// One recorded transition in a debt's history. Entries are only ever appended.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    amount: Amount,
    date: DateTime<Utc>,
    #[serde(rename = "type")]
    entry_type: EntryType,
}

impl LedgerEntry {
    pub fn new(amount: Amount, date: DateTime<Utc>, entry_type: EntryType) -> Self {
        Self {
            amount,
            date,
            entry_type,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// When the client accepted the operation.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }
}
