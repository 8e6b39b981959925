use crate::api::Mode;
use crate::args::AddArgs;
use crate::commands::{controller, Out};
use crate::model::Debt;
use crate::sync::AppState;
use crate::{Config, Result};

/// Creates a debt for `args.name()` owing `args.total()`.
pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<Debt>> {
    let mut controller = controller(&config, mode)?;
    let mut state = AppState::new();
    let debt = controller
        .create(&mut state, args.name(), args.total())
        .await?;
    Ok(Out::new(
        format!(
            "Debt added: debt for {} of {} (id {})",
            debt.name(),
            debt.total_debt(),
            debt.id()
        ),
        debt,
    ))
}
