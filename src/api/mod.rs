//! The remote debt store.
//!
//! The `Store` trait is the whole contract with the persistence collaborator: list, fetch one,
//! create, update. `HttpStore` talks to a REST endpoint, `TestStore` keeps everything in memory.

mod http_store;
mod test_store;

use crate::error::Res;
use crate::model::{Debt, DebtId, NewDebt};
use crate::Config;
use tracing::debug;

pub use http_store::HttpStore;
pub use test_store::{TestStore, TestStoreState};

/// Environment variable that switches the binary to the in-memory store.
pub const TEST_MODE_ENV: &str = "DEBTS_IN_TEST_MODE";

/// The operations the debt client needs from the store.
#[async_trait::async_trait]
pub trait Store {
    /// Fetches every debt, in the order the store keeps them.
    async fn list(&mut self) -> Res<Vec<Debt>>;

    /// Fetches one debt. A missing id is an error.
    async fn get(&mut self, id: &DebtId) -> Res<Debt>;

    /// Stores a new debt and returns it with the id the store assigned.
    async fn create(&mut self, debt: &NewDebt) -> Res<Debt>;

    /// Replaces the stored debt with `debt`. The response body is not used.
    async fn update(&mut self, debt: &Debt) -> Res<()>;
}

/// Which `Store` implementation to use.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Mode {
    /// Talk to the configured REST endpoint.
    #[default]
    Http,
    /// Use the in-memory store, no network.
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `DEBTS_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Builds the store for `config` in the requested `mode`.
pub fn store(config: &Config, mode: Mode) -> Res<Box<dyn Store + Send>> {
    debug!("Using {mode:?} store for {}", config.api_url());
    Ok(match mode {
        Mode::Http => Box::new(HttpStore::new(config)?),
        Mode::Test => Box::new(TestStore::shared(config.api_url().as_str())),
    })
}
