use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Process-wide connection defaults.
pub mod defaults {
    pub const DEFAULT_URL: &str = "http://localhost:8529";
    /// Database whose requests carry no `/_db/<name>` prefix.
    pub const SYSTEM_DATABASE_NAME: &str = "_system";
    pub const DEFAULT_DATABASE_NAME: &str = SYSTEM_DATABASE_NAME;
    pub const DEFAULT_PROTOCOL_VERSION: u32 = 30000;
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    /// Informational server version marker, e.g. 30000 for 3.0.0
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Headers sent with every request; per-call headers are appended
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,

    /// Whole-request timeout handed to the HTTP client
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_url() -> String {
    defaults::DEFAULT_URL.to_string()
}

fn default_database_name() -> String {
    defaults::DEFAULT_DATABASE_NAME.to_string()
}

fn default_protocol_version() -> u32 {
    defaults::DEFAULT_PROTOCOL_VERSION
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Replace zero values with [`defaults`]; a config file may carry
    /// `"url": ""` or `"protocol_version": 0`.
    pub fn or_defaults(mut self) -> Self {
        if self.url.is_empty() {
            self.url = default_url();
        }
        if self.database_name.is_empty() {
            self.database_name = default_database_name();
        }
        if self.protocol_version == 0 {
            self.protocol_version = default_protocol_version();
        }
        self
    }

    /// Username/password pair, only when both are non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            database_name: default_database_name(),
            protocol_version: default_protocol_version(),
            username: None,
            password: None,
            headers: BTreeMap::new(),
            timeout_secs: None,
            insecure_skip_verify: false,
        }
    }
}
