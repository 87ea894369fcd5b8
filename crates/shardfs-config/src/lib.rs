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

//! Configuration management for shardfs
//!
//! # Features
//!
//! - Multi-format configuration support (TOML, YAML, JSON)
//! - Environment variable overrides with `SHARDFS_` prefix
//! - Validation with field-level error messages
//! - Private key resolution from inline PEM, base64 or a key file
//!
//! # Example
//!
//! ```no_run
//! use shardfs_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_overrides("shardfs.toml").await?;
//!
//!     println!("Storing under {} at {}", config.base_path, config.url);
//!     let pem = config.key_material()?;
//!     println!("Key is {} bytes", pem.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod key;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use key::KeySource;
pub use loader::{ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use schema::*;
pub use validation::Validator;
