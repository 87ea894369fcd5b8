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

//! Configuration schema
//!
//! Keys are camelCase in every format:
//!
//! ```toml
//! basePath = "/alice/stor/files"
//! url = "https://us-east.manta.example.com"
//! user = "alice"
//! keyId = "a1:b2:c3"
//! keyStore = "/home/alice/.ssh/id_rsa"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Largest listing page the backend serves
pub const MAX_LIST_PAGE_SIZE: usize = 1024;

/// Settings needed to build a storage driver
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverConfig {
    /// Backend directory under which every tenant subtree lives
    #[serde(default)]
    pub base_path: String,

    /// Object store endpoint
    #[serde(default)]
    pub url: String,

    /// Account login used for signing and for the uploads directory
    #[serde(default)]
    pub user: String,

    /// Fingerprint of the signing key
    #[serde(default)]
    pub key_id: String,

    /// Inline PEM private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// File holding the PEM private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_store: Option<PathBuf>,

    /// Base64-encoded PEM private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key64: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Entries requested per listing page
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            base_path: String::new(),
            url: String::new(),
            user: String::new(),
            key_id: String::new(),
            key: None,
            key_store: None,
            key64: None,
            timeout_secs: default_timeout_secs(),
            list_page_size: default_list_page_size(),
            logging: LoggingConfig::default(),
        }
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("DriverConfig")
            .field("base_path", &self.base_path)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("key_id", &self.key_id)
            .field("key", &redacted(&self.key))
            .field("key_store", &self.key_store)
            .field("key64", &redacted(&self.key64))
            .field("timeout_secs", &self.timeout_secs)
            .field("list_page_size", &self.list_page_size)
            .field("logging", &self.logging)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_list_page_size() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
