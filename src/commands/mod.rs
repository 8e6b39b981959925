//! Command handlers for the debts CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod init;
mod show;
mod transition;
mod verify;

use crate::api::{self, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::sync::SyncController;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use add::add;
pub use init::init;
pub use show::{list, show};
pub use transition::{increase, pay};
pub use verify::verify;

/// The output type for a command. This allows the command to return a consistent notification
/// message, optionally a rendered table, and optionally structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Text meant for stdout, such as a table.
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<String>,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            display: None,
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            display: None,
            structure: None,
        }
    }

    /// Attach text to be written to stdout.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the text meant for stdout.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the display text to stdout, the message to `info!` and the structured data (if it
    /// exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(display) = self.display() {
            println!("{display}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Loads the configuration from `debts_home`, or uses `api_url` directly when one is given.
///
/// # Errors
/// - `Config` if the home directory has no valid `config.json` or `api_url` is not a valid URL.
pub async fn open_config(debts_home: &Path, api_url: Option<&str>) -> Result<Config> {
    Config::open(debts_home, api_url)
        .await
        .pub_result(ErrorType::Config)
}

/// Builds a controller over the store that `config` and `mode` point at.
fn controller(config: &Config, mode: Mode) -> Result<SyncController> {
    let store = api::store(config, mode).pub_result(ErrorType::Config)?;
    Ok(SyncController::new(store))
}
