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

//! Structured logging for shardfs
//!
//! Library crates only emit `tracing` events; binaries call one of the
//! initializers here once at startup.
//!
//! ```ignore
//! use shardfs_observability::{init_tracing, LogFormat};
//!
//! init_tracing(LogFormat::Json, None)?;
//! tracing::info!("driver ready");
//! ```

pub mod config;
pub mod initialization;

pub use config::{verbosity_filter, LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
