//! The sync controller keeps the client's view of debts in step with the remote store.
//!
//! Every operation either commits fully, leaving `AppState` holding what the store accepted, or
//! fails and leaves `AppState` exactly as it was. Ledger rejections fail before any request is
//! made.

use crate::api::Store;
use crate::error::{Error, ErrorType, IntoResult};
use crate::ledger::{LedgerError, Transition};
use crate::model::{Amount, Debt, DebtId, NewDebt, Violation};
use crate::Result;
use anyhow::anyhow;
use serde::Serialize;
use tracing::debug;

/// What the client currently shows: the list of debts and the one debt opened for detail.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AppState {
    debts: Vec<Debt>,
    current: Option<Debt>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The debts as last loaded or created.
    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    /// The debt opened for detail, if any.
    pub fn current(&self) -> Option<&Debt> {
        self.current.as_ref()
    }

    /// The freshest local snapshot of `id`.
    pub fn find(&self, id: &DebtId) -> Option<&Debt> {
        self.current
            .as_ref()
            .filter(|d| d.id() == id)
            .or_else(|| self.debts.iter().find(|d| d.id() == id))
    }

    /// Replaces every local copy of `debt` with `debt`.
    fn commit(&mut self, debt: &Debt) {
        if let Some(current) = self.current.as_mut().filter(|d| d.id() == debt.id()) {
            *current = debt.clone();
        }
        if let Some(listed) = self.debts.iter_mut().find(|d| d.id() == debt.id()) {
            *listed = debt.clone();
        }
    }
}

/// The result of auditing one debt's history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Audit {
    pub id: DebtId,
    pub name: String,
    pub violations: Vec<Violation>,
}

impl Audit {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Bridges the ledger transitions to a `Store`.
pub struct SyncController {
    store: Box<dyn Store + Send>,
}

impl SyncController {
    pub fn new(store: Box<dyn Store + Send>) -> Self {
        Self { store }
    }

    /// Fetches all debts and replaces the local list with them.
    ///
    /// # Errors
    /// `LoadFailed` if the store cannot be reached or answers with an error. The local list keeps
    /// its previous value.
    pub async fn load_all<'a>(&mut self, state: &'a mut AppState) -> Result<&'a [Debt]> {
        let debts = self
            .store
            .list()
            .await
            .map_err(|e| e.context("Failed to load debts"))
            .pub_result(ErrorType::LoadFailed)?;
        debug!("Loaded {} debts", debts.len());
        state.debts = debts;
        Ok(&state.debts)
    }

    /// Fetches one debt and makes it the current debt.
    ///
    /// # Errors
    /// `LoadFailed` if the debt does not exist or the store cannot be reached. The current debt
    /// keeps its previous value.
    pub async fn load_one<'a>(
        &mut self,
        state: &'a mut AppState,
        id: &DebtId,
    ) -> Result<&'a Debt> {
        let debt = self.fetch(id).await?;
        debug!("Loaded debt '{id}'");
        Ok(state.current.insert(debt))
    }

    /// Creates a debt owing `total_debt` and appends the stored record to the local list.
    ///
    /// # Errors
    /// - `InvalidInput` if `name` is blank or `total_debt` is negative; nothing is sent
    /// - `CreateFailed` if the store does not accept it; the local list is unchanged
    pub async fn create(
        &mut self,
        state: &mut AppState,
        name: &str,
        total_debt: Amount,
    ) -> Result<Debt> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::new(
                ErrorType::InvalidInput,
                anyhow!("A debt needs a name"),
            ));
        }
        if total_debt.is_negative() {
            return Err(Error::new(
                ErrorType::InvalidInput,
                anyhow!("The total debt cannot be negative, got {total_debt}"),
            ));
        }
        let new_debt = NewDebt::new(name, total_debt);
        let created = self
            .store
            .create(&new_debt)
            .await
            .map_err(|e| e.context(format!("Failed to add a debt for {name}")))
            .pub_result(ErrorType::CreateFailed)?;
        debug!("Created debt '{}' for {}", created.id(), created.name());
        state.debts.push(created.clone());
        Ok(created)
    }

    /// Computes the next snapshot of `debt` with `transition` and persists it.
    ///
    /// A rejection from `transition` is returned as is and the store is never contacted. When the
    /// store accepts the update, every local copy of the debt is replaced with the computed
    /// snapshot. When it does not, the local state is left untouched.
    ///
    /// # Errors
    /// - `InvalidAmount` or `ExceedsBalance` from the ledger
    /// - `SyncFailed` if the store does not accept the update
    pub async fn apply_transition<F>(
        &mut self,
        state: &mut AppState,
        debt: &Debt,
        transition: F,
    ) -> Result<Debt>
    where
        F: FnOnce(&Debt) -> std::result::Result<Debt, LedgerError>,
    {
        let next = transition(debt)?;
        self.store
            .update(&next)
            .await
            .map_err(|e| e.context(format!("Failed to update debt '{}'", debt.id())))
            .pub_result(ErrorType::SyncFailed)?;
        debug!(
            "Debt '{}' is now {} of {}",
            next.id(),
            next.remaining_debt(),
            next.total_debt()
        );
        state.commit(&next);
        Ok(next)
    }

    /// Applies `transition` to the freshest local snapshot of `id`, fetching it first when it is
    /// not held locally. A non-positive amount is refused before anything is looked up.
    ///
    /// A debt fetched here becomes `state.current` only once the store has accepted the update.
    pub async fn apply(
        &mut self,
        state: &mut AppState,
        id: &DebtId,
        transition: Transition,
    ) -> Result<Debt> {
        transition.validate()?;
        let (debt, fetched) = match state.find(id) {
            Some(debt) => (debt.clone(), false),
            None => (self.fetch(id).await?, true),
        };
        let next = self
            .apply_transition(state, &debt, |d| transition.apply(d))
            .await?;
        if fetched {
            state.current = Some(next.clone());
        }
        Ok(next)
    }

    /// Records a payment of `amount` against debt `id`.
    pub async fn record_payment(
        &mut self,
        state: &mut AppState,
        id: &DebtId,
        amount: Amount,
    ) -> Result<Debt> {
        self.apply(state, id, Transition::Payment(amount)).await
    }

    /// Records an increase of `amount` against debt `id`.
    pub async fn record_increase(
        &mut self,
        state: &mut AppState,
        id: &DebtId,
        amount: Amount,
    ) -> Result<Debt> {
        self.apply(state, id, Transition::Increase(amount)).await
    }

    /// Loads one debt, or all of them, and checks each history against its balances.
    pub async fn verify(
        &mut self,
        state: &mut AppState,
        id: Option<&DebtId>,
    ) -> Result<Vec<Audit>> {
        let debts: Vec<Debt> = match id {
            Some(id) => vec![self.load_one(state, id).await?.clone()],
            None => self.load_all(state).await?.to_vec(),
        };
        Ok(debts
            .iter()
            .map(|d| Audit {
                id: d.id().clone(),
                name: d.name().to_string(),
                violations: d.check_invariants(),
            })
            .collect())
    }

    /// Fetches `id` from the store without touching any local state.
    async fn fetch(&mut self, id: &DebtId) -> Result<Debt> {
        self.store
            .get(id)
            .await
            .map_err(|e| e.context(format!("Failed to load debt '{id}'")))
            .pub_result(ErrorType::LoadFailed)
    }
}
