//! Connection configuration for daxtab.
//!
//! Handles the structured connection settings, OLE DB connection-string
//! assembly, and loading named connections from TOML files.

use crate::error::{DaxError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure holding named connections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named tabular-engine connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionSettings>,
}

/// Structured connection settings for a tabular engine.
///
/// Mirrors the keys of an MSOLAP connection string. `initial_catalog` and
/// `data_source` are required when assembling a connection string from
/// settings; everything else has a usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Initial Catalog of the server (the model/database name).
    pub initial_catalog: Option<String>,

    /// Data Source of the server (host, or host\instance).
    pub data_source: Option<String>,

    /// User ID for authentication.
    #[serde(default)]
    pub uid: String,

    /// Password for authentication (not recommended to store in config).
    #[serde(default)]
    pub password: String,

    /// Username to impersonate, usually a UPN such as joe@contoso.com.
    pub effective_user_name: Option<String>,

    /// Timeout period (in seconds) for running queries. Enforced by the
    /// driver, not by this crate.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,

    /// Additional key=value pairs appended verbatim to the connection string,
    /// in insertion order.
    #[serde(default)]
    pub extras: Vec<(String, String)>,
}

fn default_timeout() -> u32 {
    30
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            initial_catalog: None,
            data_source: None,
            uid: String::new(),
            password: String::new(),
            effective_user_name: None,
            timeout_secs: default_timeout(),
            extras: Vec::new(),
        }
    }
}

impl ConnectionSettings {
    /// Creates settings with the two required fields set.
    pub fn new(initial_catalog: impl Into<String>, data_source: impl Into<String>) -> Self {
        Self {
            initial_catalog: Some(initial_catalog.into()),
            data_source: Some(data_source.into()),
            ..Self::default()
        }
    }

    /// Sets the authentication credentials.
    pub fn with_credentials(mut self, uid: impl Into<String>, password: impl Into<String>) -> Self {
        self.uid = uid.into();
        self.password = password.into();
        self
    }

    /// Sets the user to impersonate.
    pub fn with_effective_user_name(mut self, upn: impl Into<String>) -> Self {
        self.effective_user_name = Some(upn.into());
        self
    }

    /// Sets the query timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Appends an extra key=value pair to the connection string.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.push((key.into(), value.into()));
        self
    }

    /// Assembles the MSOLAP connection string.
    ///
    /// Key order is fixed for driver compatibility: Provider, Persist Security
    /// Info, Initial Catalog, Data Source, Timeout, UID, Password, then
    /// EffectiveUserName if set, then extras in insertion order. Every pair is
    /// terminated with `;`.
    pub fn to_connection_string(&self) -> Result<String> {
        let initial_catalog = self.initial_catalog.as_deref().ok_or_else(|| {
            DaxError::config(
                "initial_catalog and data_source must be specified if not passing a connection string",
            )
        })?;
        let data_source = self.data_source.as_deref().ok_or_else(|| {
            DaxError::config(
                "initial_catalog and data_source must be specified if not passing a connection string",
            )
        })?;

        let mut conn_str = format!(
            "Provider=MSOLAP;Persist Security Info=True;Initial Catalog={initial_catalog};Data Source={data_source};Timeout={};UID={};Password={};",
            self.timeout_secs, self.uid, self.password
        );
        if let Some(upn) = &self.effective_user_name {
            conn_str.push_str(&format!("EffectiveUserName={upn};"));
        }
        for (key, value) in &self.extras {
            conn_str.push_str(&format!("{key}={value};"));
        }

        Ok(conn_str)
    }

    /// Returns a display-safe string (no password) for logging purposes.
    pub fn display_string(&self) -> String {
        let catalog = self.initial_catalog.as_deref().unwrap_or("unknown");
        let source = self.data_source.as_deref().unwrap_or("unknown");
        format!("{catalog} @ {source}")
    }
}

/// A connection descriptor: either an opaque pre-built connection string, or
/// structured settings assembled into one on demand.
#[derive(Debug, Clone)]
pub enum ConnectionDescriptor {
    /// A pre-built connection string, used verbatim.
    Raw(String),
    /// Structured settings, assembled via [`ConnectionSettings::to_connection_string`].
    Settings(ConnectionSettings),
}

impl ConnectionDescriptor {
    /// Resolves the descriptor to the connection string handed to the driver.
    pub fn connection_string(&self) -> Result<String> {
        match self {
            Self::Raw(s) => Ok(s.clone()),
            Self::Settings(settings) => settings.to_connection_string(),
        }
    }
}

impl From<ConnectionSettings> for ConnectionDescriptor {
    fn from(settings: ConnectionSettings) -> Self {
        Self::Settings(settings)
    }
}

impl From<String> for ConnectionDescriptor {
    fn from(conn_str: String) -> Self {
        Self::Raw(conn_str)
    }
}

impl From<&str> for ConnectionDescriptor {
    fn from(conn_str: &str) -> Self {
        Self::Raw(conn_str.to_string())
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daxtab")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DaxError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DaxError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionSettings> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
