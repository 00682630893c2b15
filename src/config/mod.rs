use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod manager;

pub use manager::ConfigManager;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub dry_run: bool,
    pub clobber: bool,
    pub prefix: String,
    /// Days without a commit before a branch counts as stale.
    pub stale_age_threshold: i64,
    pub static_branches: Vec<String>,
    pub max_concurrency: usize,
    pub auth: String,
    pub remote: String,
}

impl Default for Config {
    fn default() -> Self {
        defaults::default_config()
    }
}

/// Keys as they may appear in `.groomba.yaml` / `.groomba.json`; every key
/// is optional and falls back to the layer beneath it.
#[derive(Deserialize, Debug, Default)]
pub struct PartialConfig {
    pub dry_run: Option<bool>,
    pub clobber: Option<bool>,
    pub prefix: Option<String>,
    pub stale_age_threshold: Option<i64>,
    pub static_branches: Option<Vec<String>>,
    pub max_concurrency: Option<usize>,
    pub auth: Option<String>,
    pub remote: Option<String>,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    Env { key: String, value: String },
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Env { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Io(error)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        ConfigError::Yaml(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Json(error)
    }
}

impl Config {
    pub fn load(config_dir: &std::path::Path) -> Result<Self> {
        ConfigManager::load(config_dir)
    }

    pub fn merge(&mut self, partial: PartialConfig) {
        if let Some(dry_run) = partial.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(clobber) = partial.clobber {
            self.clobber = clobber;
        }
        if let Some(prefix) = partial.prefix {
            self.prefix = prefix;
        }
        if let Some(threshold) = partial.stale_age_threshold {
            self.stale_age_threshold = threshold;
        }
        if let Some(branches) = partial.static_branches {
            self.static_branches = branches;
        }
        if let Some(max_concurrency) = partial.max_concurrency {
            self.max_concurrency = max_concurrency;
        }
        if let Some(auth) = partial.auth {
            self.auth = auth;
        }
        if let Some(remote) = partial.remote {
            self.remote = remote;
        }
    }

    /// A worker pool of zero would never drain the batch.
    pub fn normalize(&mut self) {
        if self.max_concurrency == 0 {
            self.max_concurrency = 1;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stale_age_threshold <= 0 {
            return Err(ConfigError::Validation(format!(
                "stale_age_threshold must be positive, got {}",
                self.stale_age_threshold
            )));
        }

        if self.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "prefix cannot be empty".to_string(),
            ));
        }

        if self.prefix.starts_with('/') || self.prefix.starts_with("refs/") {
            return Err(ConfigError::Validation(format!(
                "prefix must be a branch name prefix, got {}",
                self.prefix
            )));
        }

        if self.remote.is_empty() || self.remote.contains('/') {
            return Err(ConfigError::Validation(format!(
                "remote must be a plain remote name, got {:?}",
                self.remote
            )));
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The remote-tracking namespace, e.g. `refs/remotes/origin/`.
    pub fn remote_refs_prefix(&self) -> String {
        format!("refs/remotes/{}/", self.remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.remote_refs_prefix(), "refs/remotes/origin/");
    }

    #[test]
    fn test_merge_only_overrides_present_keys() {
        let mut config = Config::default();
        config.merge(PartialConfig {
            prefix: Some("zzz_".to_string()),
            max_concurrency: Some(10),
            ..Default::default()
        });

        assert_eq!(config.prefix, "zzz_");
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.stale_age_threshold, 14);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_normalize_zero_concurrency() {
        let mut config = Config {
            max_concurrency: 0,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.max_concurrency, 1);
    }

    #[test]
    fn test_validation_errors() {
        let config = Config {
            stale_age_threshold: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            prefix: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            prefix: "refs/heads/stale/".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            remote: "origin/main".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let env_error = ConfigError::Env {
            key: "GROOMBA_DRY_RUN".to_string(),
            value: "maybe".to_string(),
        };
        assert_eq!(
            env_error.to_string(),
            "Invalid value for GROOMBA_DRY_RUN: \"maybe\""
        );

        let validation_error = ConfigError::Validation("Invalid configuration".to_string());
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid configuration"
        );
    }
}
