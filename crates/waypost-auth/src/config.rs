//! Gateway configuration.
//!
//! The only external inputs this core needs are the identity endpoint's base
//! URL and a directory for the persisted session. `from_env` resolves both
//! from the process environment at startup; embedders with their own
//! configuration layer construct the value directly.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;

/// Environment variable naming the identity endpoint base URL.
pub const ENV_BASE_URL: &str = "WAYPOST_API_BASE_URL";

/// Environment variable overriding the session storage directory.
pub const ENV_DATA_DIR: &str = "WAYPOST_DATA_DIR";

/// Application name used for the default storage directory.
const APP_NAME: &str = "waypost";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL the auth endpoints hang off, without a trailing slash.
    pub base_url: String,
    /// Directory holding the persisted session.
    pub data_dir: PathBuf,
}

impl AuthConfig {
    pub fn new(base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            data_dir: data_dir.into(),
        }
    }

    /// Resolve configuration from the process environment, loading a `.env`
    /// file first if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var_os(ENV_DATA_DIR),
        )
    }

    fn from_vars(base_url: Option<String>, data_dir: Option<OsString>) -> Result<Self> {
        let base_url = base_url.ok_or_else(|| anyhow::anyhow!("{ENV_BASE_URL} is not set"))?;

        let data_dir = match data_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self::new(base_url, data_dir))
    }

    /// Absolute URL for an endpoint path such as `/auth/login`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
    Ok(data_dir.join(APP_NAME))
}
