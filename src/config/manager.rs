use super::defaults::{default_config, CONFIG_FILE_EXTENSIONS, CONFIG_FILE_STEM, ENV_PREFIX};
use super::{Config, ConfigError, PartialConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigManager;

impl ConfigManager {
    /// Defaults, then `.groomba.{yaml,yml,json}` from `config_dir`, then
    /// `GROOMBA_*` environment variables.
    pub fn load(config_dir: &Path) -> Result<Config> {
        Self::load_with_env(config_dir, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(config_dir: &Path, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = default_config();

        if let Some(path) = Self::find_config_file(config_dir) {
            config.merge(Self::load_from_file(&path)?);
        }

        config.merge(Self::partial_from_env(lookup)?);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn find_config_file(config_dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)))
            .find(|path| path.is_file())
    }

    pub fn load_from_file(path: &Path) -> Result<PartialConfig> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(PartialConfig::default());
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Ok(serde_yaml::from_str(&content)?),
        }
    }

    fn partial_from_env<F>(lookup: F) -> Result<PartialConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            lookup(&key).map(|value| (key, value))
        };

        Ok(PartialConfig {
            dry_run: var("DRY_RUN").map(parse_bool).transpose()?,
            clobber: var("CLOBBER").map(parse_bool).transpose()?,
            prefix: var("PREFIX").map(|(_, value)| value),
            stale_age_threshold: var("STALE_AGE_THRESHOLD").map(parse_number).transpose()?,
            static_branches: var("STATIC_BRANCHES").map(|(_, value)| parse_list(&value)),
            max_concurrency: var("MAX_CONCURRENCY").map(parse_number).transpose()?,
            auth: var("AUTH").map(|(_, value)| value),
            remote: var("REMOTE").map(|(_, value)| value),
        })
    }
}

fn parse_bool((key, value): (String, String)) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Env { key, value }),
    }
}

fn parse_number<T: std::str::FromStr>((key, value): (String, String)) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
