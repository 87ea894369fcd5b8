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

//! Private key resolution

use crate::error::{ConfigError, ConfigResult};
use crate::schema::DriverConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use tracing::debug;

/// Where the private key comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// `key`: PEM given inline
    Inline,
    /// `key64`: base64 of the PEM
    Base64,
    /// `keyStore`: path to a PEM file
    File,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Inline => f.write_str("key"),
            KeySource::Base64 => f.write_str("key64"),
            KeySource::File => f.write_str("keyStore"),
        }
    }
}

impl DriverConfig {
    /// First configured key source, in precedence order
    pub fn key_source(&self) -> Option<KeySource> {
        if self.key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            Some(KeySource::Inline)
        } else if self.key64.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            Some(KeySource::Base64)
        } else if self.key_store.is_some() {
            Some(KeySource::File)
        } else {
            None
        }
    }

    /// PEM text of the private key
    ///
    /// `key` wins over `key64`, which wins over `keyStore`. The PEM itself
    /// is not parsed here.
    pub fn key_material(&self) -> ConfigResult<String> {
        let source = self
            .key_source()
            .ok_or_else(|| ConfigError::missing("key, key64 or keyStore"))?;
        debug!(source = %source, "resolving private key");

        match source {
            KeySource::Inline => Ok(self.key.clone().unwrap_or_default()),
            KeySource::Base64 => {
                let encoded: String = self
                    .key64
                    .as_deref()
                    .unwrap_or_default()
                    .split_whitespace()
                    .collect();
                let raw = STANDARD.decode(encoded).map_err(|e| {
                    ConfigError::invalid_value("key64", format!("not valid base64: {e}"))
                })?;
                String::from_utf8(raw).map_err(|_| {
                    ConfigError::invalid_value("key64", "decoded key is not UTF-8 text")
                })
            }
            KeySource::File => {
                let path = self.key_store.clone().unwrap_or_default();
                std::fs::read_to_string(&path).map_err(|e| {
                    ConfigError::invalid_value("keyStore", format!("{}: {e}", path.display()))
                })
            }
        }
    }
}
