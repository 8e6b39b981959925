use crate::api::Mode;
use crate::args::VerifyArgs;
use crate::commands::{controller, Out};
use crate::sync::{AppState, Audit};
use crate::{view, Config, Result};
use tracing::warn;

/// Replays the history of one debt, or of all debts, and reports any that do not add up.
pub async fn verify(config: Config, mode: Mode, args: VerifyArgs) -> Result<Out<Vec<Audit>>> {
    let mut controller = controller(&config, mode)?;
    let mut state = AppState::new();
    let audits = controller.verify(&mut state, args.id()).await?;
    let broken = audits.iter().filter(|a| !a.is_clean()).count();
    for audit in audits.iter().filter(|a| !a.is_clean()) {
        warn!(
            "Debt '{}' has {} problems",
            audit.id,
            audit.violations.len()
        );
    }
    let message = if broken == 0 {
        format!("All {} debts are consistent", audits.len())
    } else {
        format!("{broken} of {} debts are inconsistent", audits.len())
    };
    let report = view::audit_report(&audits);
    Ok(Out::new(message, audits).with_display(report))
}
