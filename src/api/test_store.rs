//! Implements the `Store` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a server.

use crate::api::Store;
use crate::error::Res;
use crate::model::{Amount, Debt, DebtId, NewDebt};
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use uuid::Uuid;

/// The data held by a `TestStore`, plus a switch that makes every call fail as if the server
/// could not be reached.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TestStoreState {
    pub debts: Vec<Debt>,
    pub offline: bool,
    /// Number of calls that reached the store, successful or not.
    pub calls: usize,
}

/// An implementation of the `Store` trait that keeps debts in memory. Clones share the same data,
/// so a test can hold one handle and give another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct TestStore {
    state: Arc<Mutex<TestStoreState>>,
}

/// Stores used by the binary in test mode, keyed by the configured store URL, so that every
/// command run in one process sees the same data.
fn registry() -> &'static Mutex<HashMap<String, TestStore>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, TestStore>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

impl TestStore {
    /// Create a new `TestStore` holding `debts`.
    pub fn new(debts: Vec<Debt>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TestStoreState {
                debts,
                ..TestStoreState::default()
            })),
        }
    }

    /// Returns the store registered for `key`, creating one with seed data on first use.
    pub fn shared(key: &str) -> Self {
        let mut map = match registry().lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(key.to_string())
            .or_insert_with(|| TestStore::new(seed_data()))
            .clone()
    }

    /// A copy of the current state.
    pub fn get_state(&self) -> TestStoreState {
        self.lock().clone()
    }

    /// Replaces the current state.
    pub fn set_state(&self, state: TestStoreState) {
        *self.lock() = state;
    }

    /// Makes every following call fail (`true`) or succeed again (`false`).
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TestStoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Counts the call and fails if the store is offline.
    fn connect(&self) -> Res<std::sync::MutexGuard<'_, TestStoreState>> {
        let mut state = self.lock();
        state.calls += 1;
        if state.offline {
            bail!("Connection refused: the test store is offline");
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl Store for TestStore {
    async fn list(&mut self) -> Res<Vec<Debt>> {
        Ok(self.connect()?.debts.clone())
    }

    async fn get(&mut self, id: &DebtId) -> Res<Debt> {
        self.connect()?
            .debts
            .iter()
            .find(|d| d.id() == id)
            .cloned()
            .with_context(|| format!("Debt '{id}' not found"))
    }

    async fn create(&mut self, debt: &NewDebt) -> Res<Debt> {
        let mut state = self.connect()?;
        let id = DebtId::new(Uuid::new_v4().simple().to_string());
        let stored = debt.clone().into_debt(id);
        state.debts.push(stored.clone());
        Ok(stored)
    }

    async fn update(&mut self, debt: &Debt) -> Res<()> {
        let mut state = self.connect()?;
        match state.debts.iter_mut().find(|d| d.id() == debt.id()) {
            Some(existing) => {
                *existing = debt.clone();
                Ok(())
            }
            None => bail!("Debt '{}' not found", debt.id()),
        }
    }
}

/// Seed data for a store that nobody has written to yet.
fn seed_data() -> Vec<Debt> {
    vec![
        NewDebt::new("Alex", Amount::from(1000)).into_debt(DebtId::new("1")),
        NewDebt::new("Maria", Amount::from(250)).into_debt(DebtId::new("2")),
    ]
}
