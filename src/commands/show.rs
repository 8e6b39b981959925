use crate::api::Mode;
use crate::commands::{controller, Out};
use crate::model::{Debt, DebtId};
use crate::sync::AppState;
use crate::{view, Config, Result};

/// Loads every debt and renders the debt table.
pub async fn list(config: Config, mode: Mode) -> Result<Out<Vec<Debt>>> {
    let mut controller = controller(&config, mode)?;
    let mut state = AppState::new();
    let debts = controller.load_all(&mut state).await?.to_vec();
    let table = view::debt_table(&debts);
    Ok(Out::new(format!("Loaded {} debts", debts.len()), debts).with_display(table))
}

/// Loads one debt and renders its balances and history.
pub async fn show(config: Config, mode: Mode, id: &DebtId) -> Result<Out<Debt>> {
    let mut controller = controller(&config, mode)?;
    let mut state = AppState::new();
    let debt = controller.load_one(&mut state, id).await?.clone();
    let detail = view::debt_detail(&debt);
    Ok(Out::new(
        format!(
            "Debt for {} has {} history entries",
            debt.name(),
            debt.payments().len()
        ),
        debt,
    )
    .with_display(detail))
}
