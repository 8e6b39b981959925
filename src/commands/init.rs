use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` pointing at the debt store.
///
/// # Arguments
/// - `debts_home` - The directory that will be the root of data directory, e.g. `$HOME/debts`
/// - `api_url` - The collection URL of the debt store, e.g. `https://example.com/api/debts`
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operations fail.
pub async fn init(debts_home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(debts_home, api_url)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the debts directory, using the store at {}",
        config.api_url()
    )
    .into())
}
