//! Configuration management for shinebridge
//!
//! This module assembles the runtime configuration from CLI arguments and
//! environment variables, applies defaults, and validates the result before
//! anything touches the network.

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{Result, ShinebridgeError};

/// Main configuration structure for shinebridge
///
/// Holds everything the bridge needs: vendor credentials, the vendor API
/// base URL, the poll cadence, the local listen address, and the session
/// file location. The poll interval is fixed for the process lifetime; it
/// is not runtime-reconfigurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vendor account identifier (login email); the session persistence key
    pub account: String,

    /// Plaintext vendor password, encrypted client-side at login time
    pub password: String,

    /// Base URL of the vendor API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Listen address for the local read endpoint
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path of the persisted session-token file
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_api_base() -> String {
    "https://shine-api.felicitysolar.com".to_string()
}

fn default_poll_interval_ms() -> u64 {
    30_000
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_session_file() -> String {
    "data/shine_tokens.json".to_string()
}

impl Config {
    /// Build a configuration from parsed CLI arguments, filling in defaults
    /// for anything the caller did not override.
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            account: cli.account,
            password: cli.password,
            api_base: cli.api_base.unwrap_or_else(default_api_base),
            poll_interval_ms: cli.poll_interval_ms.unwrap_or_else(default_poll_interval_ms),
            listen: cli.listen.unwrap_or_else(default_listen),
            session_file: cli.session_file.unwrap_or_else(default_session_file),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ShinebridgeError::Config`] if the account or password is
    /// empty, the API base is not an http(s) URL, or the poll interval is
    /// zero.
    pub fn validate(&self) -> Result<()> {
        if self.account.trim().is_empty() {
            return Err(ShinebridgeError::Config("account must not be empty".to_string()).into());
        }
        if self.password.is_empty() {
            return Err(ShinebridgeError::Config("password must not be empty".to_string()).into());
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ShinebridgeError::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            ))
            .into());
        }
        if self.poll_interval_ms == 0 {
            return Err(
                ShinebridgeError::Config("poll_interval_ms must be greater than zero".to_string())
                    .into(),
            );
        }
        if self.listen.trim().is_empty() {
            return Err(ShinebridgeError::Config("listen must not be empty".to_string()).into());
        }
        Ok(())
    }
}
