// shardfs - Tenant-sharded file storage driver
// Copyright (C) 2025 shardfs Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::DriverConfig;
use crate::validation::Validator;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "SHARDFS_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<DriverConfig> {
        let config = self.read_file(path.as_ref()).await?;
        self.check(&config)?;
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<DriverConfig> {
        let config = parse(content, format)?;
        self.check(&config)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    ///
    /// Overrides are applied before validation, so a file may leave out
    /// settings the environment provides (the private key, typically).
    pub async fn load_with_overrides<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ConfigResult<DriverConfig> {
        let mut config = self.read_file(path.as_ref()).await?;
        self.apply_env_overrides(&mut config)?;
        self.check(&config)?;
        Ok(config)
    }

    /// Build configuration from defaults and the environment alone
    pub fn load_from_env(&self) -> ConfigResult<DriverConfig> {
        let mut config = DriverConfig::default();
        self.apply_env_overrides(&mut config)?;
        self.check(&config)?;
        Ok(config)
    }

    /// Apply `SHARDFS_*` environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut DriverConfig) -> ConfigResult<()> {
        self.apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, keyed by variable name
    pub fn apply_overrides<F>(&self, config: &mut DriverConfig, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            let name = format!("{ENV_PREFIX}{suffix}");
            lookup(&name).map(|value| (name, value))
        };

        if let Some((_, value)) = var("BASE_PATH") {
            config.base_path = value;
        }
        if let Some((_, value)) = var("URL") {
            config.url = value;
        }
        if let Some((_, value)) = var("USER") {
            config.user = value;
        }
        if let Some((_, value)) = var("KEY_ID") {
            config.key_id = value;
        }
        if let Some((_, value)) = var("KEY") {
            config.key = Some(value);
        }
        if let Some((_, value)) = var("KEY64") {
            config.key64 = Some(value);
        }
        if let Some((_, value)) = var("KEY_STORE") {
            config.key_store = Some(PathBuf::from(value));
        }
        if let Some((name, value)) = var("TIMEOUT_SECS") {
            config.timeout_secs = parse_number(&name, &value)?;
        }
        if let Some((name, value)) = var("LIST_PAGE_SIZE") {
            config.list_page_size = parse_number(&name, &value)?;
        }

        // Logging settings
        if let Some((_, value)) = var("LOG_LEVEL") {
            config.logging.level = value;
        }
        if let Some((_, value)) = var("LOG_FORMAT") {
            config.logging.format = value;
        }

        Ok(())
    }

    async fn read_file(&self, path: &Path) -> ConfigResult<DriverConfig> {
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        parse(&content, format)
    }

    fn check(&self, config: &DriverConfig) -> ConfigResult<()> {
        if self.validate {
            config.validate()?;
            debug!("Configuration validated successfully");
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(content: &str, format: ConfigFormat) -> ConfigResult<DriverConfig> {
    let config: DriverConfig = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    debug!("Configuration parsed from {}", format.name());
    Ok(config)
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_var_parsing_error(name, value, "expected a positive integer"))
}
