//! Server configuration
//!
//! Resolution order: defaults, then an optional TOML file, then environment
//! variables, then command-line flags (applied by the binary).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the bind address
pub const ENV_BIND: &str = "REVIEW_GATE_BIND";
/// Environment variable selecting the ledger backend
pub const ENV_LEDGER_BACKEND: &str = "REVIEW_GATE_LEDGER_BACKEND";
/// Environment variable setting the ledger gateway endpoint
pub const ENV_LEDGER_ENDPOINT: &str = "REVIEW_GATE_LEDGER_ENDPOINT";
/// Environment variable setting the ledger request timeout
pub const ENV_LEDGER_TIMEOUT_MS: &str = "REVIEW_GATE_LEDGER_TIMEOUT_MS";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("Invalid config file: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// An environment variable carried an unusable value
    #[error("Invalid value {value:?} for {key}")]
    Env {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// A field failed validation
    #[error("Invalid configuration: {field} - {reason}")]
    Invalid {
        /// Field path
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Ledger backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// In-process ledger; reviews are lost on restart
    #[default]
    Memory,
    /// HTTP gateway in front of the review contract
    Http,
}

impl FromStr for LedgerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown ledger backend: {other}")),
        }
    }
}

impl fmt::Display for LedgerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Ledger collaborator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Which ledger handler to run against
    pub backend: LedgerBackend,
    /// Gateway base URL, required for the HTTP backend
    pub endpoint: Option<String>,
    /// Per-request timeout for the HTTP backend
    pub timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Memory,
            endpoint: None,
            timeout_ms: 10_000,
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub bind_address: String,
    /// Port to listen on
    pub port: u16,
    /// Allow cross-origin requests from any origin (browser front end)
    pub cors_permissive: bool,
    /// Ledger settings
    pub ledger: LedgerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            cors_permissive: true,
            ledger: LedgerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overlaid with `path` if given, then with the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.merge_with_env(std::env::vars())?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Apply recognised environment variables from `vars`
    pub fn merge_with_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let bad_value = || ConfigError::Env {
                key: key.clone(),
                value: value.clone(),
            };
            match key.as_str() {
                ENV_PORT => self.port = value.trim().parse().map_err(|_| bad_value())?,
                ENV_BIND => self.bind_address = value.trim().to_string(),
                ENV_LEDGER_BACKEND => {
                    self.ledger.backend = value.parse().map_err(|_| bad_value())?;
                }
                ENV_LEDGER_ENDPOINT => self.ledger.endpoint = Some(value.trim().to_string()),
                ENV_LEDGER_TIMEOUT_MS => {
                    self.ledger.timeout_ms = value.trim().parse().map_err(|_| bad_value())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::invalid("port", "must be non-zero"));
        }
        self.socket_addr()?;
        if self.ledger.timeout_ms == 0 {
            return Err(ConfigError::invalid("ledger.timeout_ms", "must be non-zero"));
        }
        if self.ledger.backend == LedgerBackend::Http
            && self
                .ledger
                .endpoint
                .as_deref()
                .map_or(true, |e| e.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "ledger.endpoint",
                "required for the http backend",
            ));
        }
        Ok(())
    }

    /// Listener address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::invalid("bind_address", "not an IP address"))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Ledger request timeout
    pub fn ledger_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger.timeout_ms)
    }
}
