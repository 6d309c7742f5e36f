//! Configuration management
//!
//! Connection settings come from the process environment (`ENDPOINT`, `KEY`,
//! `SECRET`, `BUCKET`) and, optionally, from a TOML profile stored at
//! ~/.config/spaces/config.toml. Environment variables take precedence over
//! the file. All four connection settings must resolve before a client is
//! built; the first one missing is named in the error.
//!
//! Bumping `SCHEMA_VERSION` needs a matching step in `ConfigManager::migrate`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Region sent to the SDK. Spaces ignores it but signing requires one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Maximum number of top-level operations in flight
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_VAR: &str = "SPACES_CONFIG_DIR";

/// Names of the environment variables configuration is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKeys {
    pub endpoint: String,
    pub key: String,
    pub secret: String,
    pub bucket: String,
    pub region: String,
    pub concurrency: String,
}

impl Default for EnvKeys {
    fn default() -> Self {
        Self {
            endpoint: "ENDPOINT".to_string(),
            key: "KEY".to_string(),
            secret: "SECRET".to_string(),
            bucket: "BUCKET".to_string(),
            region: "REGION".to_string(),
            concurrency: "CONCURRENCY".to_string(),
        }
    }
}

impl EnvKeys {
    /// Look variables up under a common prefix, e.g. `DO_SPACE_` reads
    /// `DO_SPACE_ENDPOINT`, `DO_SPACE_KEY` and so on.
    pub fn with_prefix(prefix: &str) -> Self {
        let d = Self::default();
        Self {
            endpoint: format!("{prefix}{}", d.endpoint),
            key: format!("{prefix}{}", d.key),
            secret: format!("{prefix}{}", d.secret),
            bucket: format!("{prefix}{}", d.bucket),
            region: format!("{prefix}{}", d.region),
            concurrency: format!("{prefix}{}", d.concurrency),
        }
    }
}

/// Resolved connection settings for one bucket
#[derive(Clone, PartialEq, Eq)]
pub struct SpacesConfig {
    /// Endpoint URL, always with a scheme
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Limiter width, at least 1
    pub concurrency: usize,
}

impl fmt::Debug for SpacesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpacesConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl SpacesConfig {
    /// Build a config from explicit values
    pub fn new(
        endpoint: &str,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket: bucket.into(),
            region: DEFAULT_REGION.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Read settings from the default environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&EnvKeys::default())
    }

    /// Read settings from custom environment variable names
    pub fn from_env_with(keys: &EnvKeys) -> Result<Self> {
        Self::resolve(&Config::default(), keys, |name| std::env::var(name).ok())
    }

    /// Merge environment lookups over a loaded config file.
    ///
    /// `lookup` returns the value of an environment variable; empty values
    /// count as unset.
    pub fn resolve<F>(file: &Config, keys: &EnvKeys, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let storage = file.storage.clone().unwrap_or_default();

        let required = |name: &str, from_file: Option<String>| -> Result<String> {
            env(name)
                .or(from_file.filter(|v| !v.is_empty()))
                .ok_or_else(|| Error::Config(format!("Missing {name} in environment variables.")))
        };

        let endpoint = required(&keys.endpoint, storage.endpoint)?;
        let access_key = required(&keys.key, storage.access_key)?;
        let secret_key = required(&keys.secret, storage.secret_key)?;
        let bucket = required(&keys.bucket, storage.bucket)?;

        let region = env(&keys.region)
            .or(storage.region)
            .unwrap_or_else(|| file.defaults.region.clone());

        let concurrency = match env(&keys.concurrency) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "{} must be a positive integer, got '{raw}'",
                        keys.concurrency
                    )));
                }
            },
            None => file.defaults.concurrency,
        };

        Ok(Self {
            endpoint: normalize_endpoint(&endpoint)?,
            access_key,
            secret_key,
            bucket,
            region,
            concurrency: concurrency.max(1),
        })
    }

    /// Same connection, different bucket
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Override the limiter width
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Turn a bare host such as `nyc3.digitaloceanspaces.com` into an https URL
pub fn normalize_endpoint(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Config("Endpoint cannot be empty".into()));
    }

    let candidate = match raw.split_once("://") {
        Some((scheme, rest)) => {
            let rest = rest.trim_end_matches('/');
            if rest.is_empty() {
                return Err(Error::Config(format!("Endpoint has no host: {raw}")));
            }
            format!("{scheme}://{rest}")
        }
        None => format!("https://{}", raw.trim_end_matches('/')),
    };

    let url = url::Url::parse(&candidate)?;
    if url.host_str().is_none() {
        return Err(Error::Config(format!("Endpoint has no host: {raw}")));
    }

    Ok(candidate)
}

/// Main configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Stored connection settings, overridden by the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageProfile>,
}

/// Default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Region used when neither env nor profile set one
    #[serde(default = "default_region")]
    pub region: String,

    /// Limiter width
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            region: default_region(),
            concurrency: default_concurrency(),
        }
    }
}

/// Connection settings persisted in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            storage: None,
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path.
    ///
    /// `SPACES_CONFIG_DIR` replaces the platform config directory.
    pub fn new() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_VAR).filter(|d| !d.is_empty()) {
            return Ok(Self::with_path(PathBuf::from(dir).join("config.toml")));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("spaces").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade spaces.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, mut config: Config) -> Result<Config> {
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
