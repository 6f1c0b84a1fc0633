use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cyteview_feed::{Credentials, FeedConfig, RetryPolicy, RetrySpacing};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Persistent CLI configuration, stored as TOML.
///
/// Every field has a default, so a partial (or absent) file is fine.
/// Credentials may live here for unattended use or come from the
/// `--username`/`--password` flags and their environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the acquisition service.
    pub base_url: Option<String>,

    /// Username presented at login.
    pub username: Option<String>,

    /// Password presented at login.
    pub password: Option<String>,

    /// Seconds between polling cycles.
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Retry tuning for transient failures within one cycle.
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the initial attempt of a cycle.
    pub max_retries: u32,

    /// Base delay between attempts, in seconds.
    pub delay_secs: u64,

    /// `fixed` or `linear` spacing of the delays.
    pub spacing: Spacing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    #[default]
    Fixed,
    Linear,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            poll_interval_secs: 3,
            request_timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_secs: 1,
            spacing: Spacing::Fixed,
        }
    }
}

impl AppConfig {
    /// Load the configuration from `path`, or from the default location
    /// when no path is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// The configuration file path in effect: the explicit one if given,
    /// otherwise `<config dir>/cyteview/config.toml`.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = path {
            return Ok(path.to_path_buf());
        }
        dirs::config_dir()
            .map(|dir| dir.join("cyteview").join("config.toml"))
            .ok_or_else(|| {
                AppError::Config("no config directory on this platform, pass --config".to_string())
            })
    }

    /// Render the configuration as TOML with the password masked.
    pub fn show(&self) -> Result<String> {
        let mut masked = self.clone();
        if masked.password.is_some() {
            masked.password = Some("*****".to_string());
        }
        Ok(toml::to_string_pretty(&masked)?)
    }

    /// Fold command line overrides into the loaded file values.
    pub fn apply_overrides(
        &mut self,
        url: Option<String>,
        username: Option<String>,
        password: Option<String>,
        interval: Option<u64>,
    ) {
        if let Some(url) = url {
            self.base_url = Some(url);
        }
        if let Some(username) = username {
            self.username = Some(username);
        }
        if let Some(password) = password {
            self.password = Some(password);
        }
        if let Some(interval) = interval {
            self.poll_interval_secs = interval;
        }
    }

    /// Build the feed configuration this CLI drives the poller with.
    pub fn feed_config(&self) -> Result<FeedConfig> {
        let base_url = self.base_url.as_deref().filter(|u| !u.trim().is_empty());
        let Some(base_url) = base_url else {
            return Err(AppError::Config(
                "no base URL configured, set `base_url` in the config file or pass --url"
                    .to_string(),
            ));
        };
        let spacing = match self.retry.spacing {
            Spacing::Fixed => RetrySpacing::Fixed,
            Spacing::Linear => RetrySpacing::Linear,
        };
        Ok(FeedConfig::parse(base_url)?
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_retry(RetryPolicy::new(
                self.retry.max_retries,
                Duration::from_secs(self.retry.delay_secs),
                spacing,
            )))
    }

    /// Credentials for login, required by `run` and `login`.
    pub fn credentials(&self) -> Result<Credentials> {
        let username = self.username.as_deref().filter(|u| !u.trim().is_empty());
        let password = self.password.as_deref().filter(|p| !p.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
            _ => Err(AppError::Config(
                "username and password are required, set them in the config file or pass \
                 --username/--password"
                    .to_string(),
            )),
        }
    }
}
