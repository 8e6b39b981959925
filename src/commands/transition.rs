use crate::api::Mode;
use crate::args::AmountArgs;
use crate::commands::{controller, Out};
use crate::model::Debt;
use crate::sync::AppState;
use crate::{Config, Result};

/// Records a partial payment against a debt.
///
/// # Errors
/// - `InvalidAmount` if the amount is not above zero
/// - `ExceedsBalance` if the amount is more than what remains
/// - `LoadFailed` or `SyncFailed` if the store cannot be reached or refuses the change
pub async fn pay(config: Config, mode: Mode, args: AmountArgs) -> Result<Out<Debt>> {
    let mut controller = controller(&config, mode)?;
    let mut state = AppState::new();
    let debt = controller
        .record_payment(&mut state, args.id(), args.amount())
        .await?;
    Ok(Out::new(
        format!(
            "Payment accepted: paid {}. Remaining debt: {}",
            args.amount(),
            debt.remaining_debt()
        ),
        debt,
    ))
}

/// Raises the total and the remaining balance of a debt.
///
/// # Errors
/// - `InvalidAmount` if the amount is not above zero
/// - `LoadFailed` or `SyncFailed` if the store cannot be reached or refuses the change
pub async fn increase(config: Config, mode: Mode, args: AmountArgs) -> Result<Out<Debt>> {
    let mut controller = controller(&config, mode)?;
    let mut state = AppState::new();
    let debt = controller
        .record_increase(&mut state, args.id(), args.amount())
        .await?;
    Ok(Out::new(
        format!(
            "Debt increased by {}. New total: {}",
            args.amount(),
            debt.total_debt()
        ),
        debt,
    ))
}
