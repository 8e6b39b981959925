//! These structs provide the CLI interface for the debts CLI.

use crate::model::{Amount, DebtId};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// debts: A command-line tool for keeping track of money people owe you.
///
/// Each debt has a name, a total and a remaining balance. Record partial payments as they come
/// in and raise the total when more is borrowed; the full history is kept with every debt.
///
/// Debts are stored on a remote REST endpoint. Run `debts init --api-url <URL>` once to save the
/// URL, or pass --api-url (or DEBTS_API_URL) on every call.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and save the URL of the debt store.
    Init(InitArgs),
    /// List all debts with their totals and remaining balances.
    List,
    /// Show one debt and its repayment history.
    Show(ShowArgs),
    /// Add a new debt.
    Add(AddArgs),
    /// Record a partial payment against a debt.
    Pay(AmountArgs),
    /// Increase the total of a debt.
    Increase(AmountArgs),
    /// Check that each debt's history adds up to its balances.
    Verify(VerifyArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration is held. Defaults to ~/debts
    #[arg(long, env = "DEBTS_HOME", default_value_t = default_debts_home())]
    debts_home: DisplayPath,

    /// The collection URL of the debt store. Overrides the URL saved by `debts init`.
    #[arg(long, env = "DEBTS_API_URL")]
    api_url: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, debts_home: PathBuf, api_url: Option<String>) -> Self {
        Self {
            log_level,
            debts_home: debts_home.into(),
            api_url,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn debts_home(&self) -> &DisplayPath {
        &self.debts_home
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

/// (Not shown): Args for the `debts init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The collection URL of the debt store, e.g. https://example.com/api/debts
    #[arg(long = "api-url", id = "init_api_url")]
    api_url: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// (Not shown): Args for the `debts show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The id of the debt.
    id: DebtId,
}

impl ShowArgs {
    pub fn new(id: DebtId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &DebtId {
        &self.id
    }
}

/// (Not shown): Args for the `debts add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Who owes the money.
    name: String,

    /// How much is owed, zero or more.
    #[arg(allow_negative_numbers = true)]
    total: Amount,
}

impl AddArgs {
    pub fn new(name: impl Into<String>, total: Amount) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> Amount {
        self.total
    }
}

/// (Not shown): Args for the `debts pay` and `debts increase` commands.
#[derive(Debug, Parser, Clone)]
pub struct AmountArgs {
    /// The id of the debt.
    id: DebtId,

    /// The amount, greater than zero.
    #[arg(allow_negative_numbers = true)]
    amount: Amount,
}

impl AmountArgs {
    pub fn new(id: DebtId, amount: Amount) -> Self {
        Self { id, amount }
    }

    pub fn id(&self) -> &DebtId {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// (Not shown): Args for the `debts verify` command.
#[derive(Debug, Parser, Clone)]
pub struct VerifyArgs {
    /// The id of the debt to check. All debts are checked when omitted.
    id: Option<DebtId>,
}

impl VerifyArgs {
    pub fn new(id: Option<DebtId>) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Option<&DebtId> {
        self.id.as_ref()
    }
}

fn default_debts_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("debts"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --debts-home or DEBTS_HOME instead of relying on the default \
                debts home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("debts")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_pay() {
        let args =
            Args::try_parse_from(["debts", "--debts-home", "/tmp/d", "pay", "7", "1,250.50"])
                .unwrap();
        assert_eq!(args.common().debts_home().path(), Path::new("/tmp/d"));
        match args.command() {
            Command::Pay(pay) => {
                assert_eq!(pay.id().as_str(), "7");
                assert_eq!(pay.amount(), Amount::from_str("1250.50").unwrap());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_negative_amount_reaches_the_ledger() {
        let args = Args::try_parse_from(["debts", "increase", "7", "-5"]).unwrap();
        match args.command() {
            Command::Increase(increase) => assert!(increase.amount().is_negative()),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_amount_is_a_usage_error() {
        assert!(Args::try_parse_from(["debts", "pay", "7", "lots"]).is_err());
    }

    #[test]
    fn test_parse_add_and_init() {
        let args = Args::try_parse_from(["debts", "add", "Alex", "1000"]).unwrap();
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.name(), "Alex");
                assert_eq!(add.total(), Amount::from(1000));
            }
            other => panic!("unexpected command {other:?}"),
        }
        let args =
            Args::try_parse_from(["debts", "init", "--api-url", "http://localhost/debts"])
                .unwrap();
        match args.command() {
            Command::Init(init) => assert_eq!(init.api_url(), "http://localhost/debts"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verify_id_is_optional() {
        let args = Args::try_parse_from(["debts", "verify"]).unwrap();
        assert!(matches!(args.command(), Command::Verify(v) if v.id().is_none()));
    }
}
