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
use crate::schema::{DriverConfig, LoggingConfig, MAX_LIST_PAGE_SIZE};

/// Validator for configuration settings
pub trait Validator {
    /// Check the settings, reporting the first problem found
    fn validate(&self) -> ConfigResult<()>;
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

impl Validator for DriverConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.base_path.is_empty() {
            return Err(ConfigError::missing("basePath"));
        }
        if !self.base_path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "basePath",
                format!("must be an absolute path, got {}", self.base_path),
            ));
        }
        if self.base_path.split('/').any(|s| s == "..") {
            return Err(ConfigError::invalid_value(
                "basePath",
                "must not contain '..' segments",
            ));
        }

        if self.url.is_empty() {
            return Err(ConfigError::missing("url"));
        }
        if !is_http_url(&self.url) {
            return Err(ConfigError::invalid_value(
                "url",
                format!("must be an http:// or https:// URL, got {}", self.url),
            ));
        }

        if self.user.is_empty() {
            return Err(ConfigError::missing("user"));
        }
        if self.key_id.is_empty() {
            return Err(ConfigError::missing("keyId"));
        }
        if self.key_source().is_none() {
            return Err(ConfigError::missing("key, key64 or keyStore"));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "timeoutSecs",
                "must be greater than 0",
            ));
        }
        if self.list_page_size == 0 || self.list_page_size > MAX_LIST_PAGE_SIZE {
            return Err(ConfigError::invalid_value(
                "listPageSize",
                format!(
                    "must be between 1 and {MAX_LIST_PAGE_SIZE}, got {}",
                    self.list_page_size
                ),
            ));
        }

        self.logging.validate()
    }
}

impl Validator for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("must be one of: {}", LOG_LEVELS.join(", ")),
            ));
        }
        if !LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.format",
                format!("must be one of: {}", LOG_FORMATS.join(", ")),
            ));
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'))
    })
}
