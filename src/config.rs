//! Configuration file handling for the debts client.
//!
//! The configuration file is stored at `$DEBTS_HOME/config.json` and holds the URL of the remote
//! debt store and an optional request timeout.

use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "debts";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$DEBTS_HOME` and from there it loads `$DEBTS_HOME/config.json`, or directly from a
/// store URL when no configuration directory is used.
#[derive(Debug, Clone)]
pub struct Config {
    root: Option<PathBuf>,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the data directory and an initial `config.json` file pointing at `api_url`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/debts`
    /// - `api_url` - The collection URL of the debt store, e.g. `https://example.com/api/debts`
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not an http(s) URL or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Res<Self> {
        let api_url = parse_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the debts home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(root.join(CONFIG_JSON)).await?;

        Ok(Self {
            root: Some(root),
            config_file,
            api_url,
        })
    }

    /// This will
    /// - validate that `debts_home` and its config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(debts_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = debts_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The debts home directory is missing, run 'debts init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)
            .with_context(|| format!("Bad api_url in {}", config_path.display()))?;

        Ok(Self {
            root: Some(root),
            config_file,
            api_url,
        })
    }

    /// Loads the configuration from `debts_home`, unless `api_url` is given, in which case the
    /// home directory is not needed and the URL is used with default settings.
    pub async fn open(debts_home: &Path, api_url: Option<&str>) -> Res<Self> {
        match api_url {
            Some(url) => Ok(Self::from_url(parse_api_url(url)?)),
            None => Self::load(debts_home).await,
        }
    }

    /// A configuration that points at `api_url` and has no directory behind it.
    pub fn from_url(api_url: Url) -> Self {
        Self {
            root: None,
            config_file: ConfigFile {
                api_url: api_url.to_string(),
                ..ConfigFile::default()
            },
            api_url,
        }
    }

    /// The home directory, if this configuration was loaded from one.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|r| r.join(CONFIG_JSON))
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The request timeout. `None` leaves the HTTP client's default, which is to wait.
    pub fn timeout(&self) -> Option<Duration> {
        self.config_file.timeout_secs.map(Duration::from_secs)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "debts",
///   "config_version": 1,
///   "api_url": "https://example.com/api/debts",
///   "timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "debts"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Collection URL of the remote debt store
    api_url: String,

    /// Request timeout in seconds, no timeout if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            timeout_secs: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

/// Parses the store URL, which must be an absolute `http` or `https` URL.
fn parse_api_url(s: &str) -> Res<Url> {
    let url = Url::parse(s.trim()).with_context(|| format!("Invalid store URL '{s}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("The store URL must use http or https, got '{other}'"),
    }
}
