//! Configuration file.
//!
//! ```toml
//! [global]
//! url = "https://admin.example.org/accounts/"
//! login = "sync-bot"
//! password = "secret"
//! temp = "/var/tmp"
//!
//! [users]
//! home = "/home/fedora"
//! shell = "/bin/bash"
//!
//! [host]
//! aliases_template = "/etc/aliases.template"
//! alias_domain = "fedoraproject.org"
//! ```
//!
//! Only `[global]` url, login and password are required.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

use crate::record::AccountSettings;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/fas.toml";

/// Consulted when the requested config file does not exist.
pub const FALLBACK_CONFIG_PATH: &str = "fas.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not open {path}")]
    NotFound { path: PathBuf },

    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Check if neither the requested nor the fallback file exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }

    /// Check if the file was read but is not a usable config.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ConfigError::Parse { .. } | ConfigError::Invalid { .. })
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

#[derive(Clone, Deserialize)]
pub struct GlobalConfig {
    /// Base URL of the account system.
    pub url: String,
    pub login: String,
    pub password: Zeroizing<String>,
    /// Root under which per-run scratch directories are created.
    #[serde(default = "default_temp")]
    pub temp: PathBuf,
}

impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("url", &self.url)
            .field("login", &self.login)
            .field("password", &"***")
            .field("temp", &self.temp)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub home: PathBuf,
    pub shell: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("/home/fedora"),
            shell: "/bin/bash".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub aliases_template: PathBuf,
    pub alias_domain: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            aliases_template: PathBuf::from("/etc/aliases.template"),
            alias_domain: "fedoraproject.org".to_string(),
        }
    }
}

/// Live locations of installed artifacts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub passwd_db: PathBuf,
    pub shadow_db: PathBuf,
    pub group_db: PathBuf,
    pub aliases: PathBuf,
    pub relay_recipients: PathBuf,
    pub authconfig: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            passwd_db: PathBuf::from("/var/db/passwd.db"),
            shadow_db: PathBuf::from("/var/db/shadow.db"),
            group_db: PathBuf::from("/var/db/group.db"),
            aliases: PathBuf::from("/etc/aliases"),
            relay_recipients: PathBuf::from("/etc/postfix/relay_recipients"),
            authconfig: PathBuf::from("/etc/sysconfig/authconfig"),
        }
    }
}

/// External programs invoked by a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub makedb: PathBuf,
    pub authconfig: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            makedb: PathBuf::from("makedb"),
            authconfig: PathBuf::from("/usr/sbin/authconfig"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub global: GlobalConfig,
    #[serde(default)]
    pub users: UsersConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_temp() -> PathBuf {
    PathBuf::from("/var/tmp")
}

impl Config {
    /// Load from `path`, falling back to `./fas.toml` if `path` does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_file(path);
        }
        let fallback = Path::new(FALLBACK_CONFIG_PATH);
        if fallback.exists() {
            warn!(
                "Could not open {}, defaulting to {}",
                path.display(),
                fallback.display()
            );
            return Self::load_file(fallback);
        }
        Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|err| match err {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate config text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.global.url).map_err(|e| ConfigError::Invalid {
            field: "global.url",
            reason: e.to_string(),
        })?;
        if self.users.shell.is_empty() {
            return Err(ConfigError::Invalid {
                field: "users.shell",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.users.home.is_absolute() {
            return Err(ConfigError::Invalid {
                field: "users.home",
                reason: format!("{} is not an absolute path", self.users.home.display()),
            });
        }
        Ok(())
    }

    /// Replace the account system URL, e.g. from the command line.
    pub fn override_url(&mut self, url: &str) -> Result<(), ConfigError> {
        url::Url::parse(url).map_err(|e| ConfigError::Invalid {
            field: "global.url",
            reason: e.to_string(),
        })?;
        self.global.url = url.to_string();
        Ok(())
    }

    pub fn account_settings(&self) -> AccountSettings {
        AccountSettings {
            home_root: self.users.home.clone(),
            shell: self.users.shell.clone(),
        }
    }
}
