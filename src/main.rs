use clap::Parser;
use debt_ledger::args::{Args, Command};
use debt_ledger::{commands, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error ({}): {e}", e.kind());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().debts_home().path();
    let api_url = args.common().api_url();

    // When DEBTS_IN_TEST_MODE is set and non-empty the in-memory store is used instead of HTTP.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_url()).await?.print(),

        Command::List => {
            let config = commands::open_config(home, api_url).await?;
            commands::list(config, mode).await?.print()
        }

        Command::Show(show_args) => {
            let config = commands::open_config(home, api_url).await?;
            commands::show(config, mode, show_args.id()).await?.print()
        }

        Command::Add(add_args) => {
            let config = commands::open_config(home, api_url).await?;
            commands::add(config, mode, add_args.clone()).await?.print()
        }

        Command::Pay(pay_args) => {
            let config = commands::open_config(home, api_url).await?;
            commands::pay(config, mode, pay_args.clone()).await?.print()
        }

        Command::Increase(increase_args) => {
            let config = commands::open_config(home, api_url).await?;
            commands::increase(config, mode, increase_args.clone())
                .await?
                .print()
        }

        Command::Verify(verify_args) => {
            let config = commands::open_config(home, api_url).await?;
            commands::verify(config, mode, verify_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
