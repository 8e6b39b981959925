//! The public error type.
//!
//! Internally, code returns `anyhow` errors with context. At the public boundary those errors are
//! tagged with an `ErrorType` so callers can tell a refused amount from a dead server.

use crate::ledger::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of failure occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// An amount of zero or less was given. Nothing was sent to the store.
    InvalidAmount,
    /// A payment was larger than the remaining debt. Nothing was sent to the store.
    ExceedsBalance,
    /// A new debt was missing its name or had a negative total. Nothing was sent to the store.
    InvalidInput,
    /// Debts could not be fetched from the store.
    LoadFailed,
    /// The store did not accept a new debt.
    CreateFailed,
    /// The store did not accept an updated debt.
    SyncFailed,
    /// The configuration directory or file is missing or invalid.
    Config,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

impl ErrorType {
    /// Local validation failures are never sent to the store and never retried.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ErrorType::InvalidAmount | ErrorType::ExceedsBalance | ErrorType::InvalidInput
        )
    }
}

/// An error with a kind and a chain of context messages.
pub struct Error {
    kind: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(kind: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            inner: inner.into(),
        }
    }

    pub fn kind(&self) -> ErrorType {
        self.kind
    }

    /// The underlying error chain.
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.kind, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.inner)
    }
}

impl From<LedgerError> for Error {
    fn from(e: LedgerError) -> Self {
        let kind = match e {
            LedgerError::InvalidAmount(_) => ErrorType::InvalidAmount,
            LedgerError::ExceedsBalance { .. } => ErrorType::ExceedsBalance,
        };
        Error::new(kind, e)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::new(ErrorType::Internal, e)
    }
}

/// Tags an internal result with the `ErrorType` it should carry at the public boundary.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, kind: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, kind: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(kind, e))
    }
}
