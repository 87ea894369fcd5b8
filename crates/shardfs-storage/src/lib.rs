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

//! Tenant-sharded file storage over an HTTP object store
//!
//! This crate exposes file-storage operations (create folder, list, read,
//! write, copy, move, delete, start multipart upload) for many tenants on
//! top of a single remote object store namespace.
//!
//! # Architecture
//!
//! - [`PathResolver`] maps a tenant's logical path into the backend
//!   namespace, spreading tenants over a shard prefix and refusing to let a
//!   path escape its tenant's subtree
//! - [`BackendGateway`] is the seam to the remote store; [`MantaGateway`]
//!   talks HTTP, [`mock::MockGateway`] keeps a tree in memory
//! - [`StorageDriver`] runs each operation as a short sequence of gateway
//!   calls and maps backend descriptors to [`Entry`] values
//!
//! ## Core Concepts
//!
//! - **Tenant**: an `(account, app)` pair owning one isolated subtree
//! - **Logical path**: a caller-supplied path relative to the tenant root
//! - **Resolved path**: the absolute backend path a logical path maps to
//!
//! Resolved paths look like
//! `<base>/<shard>/<account>/<app>/<logical>`, where the shard is the first
//! six characters of the account split into three two-character segments.
//!
//! # Consistency
//!
//! The backend is eventually consistent and the driver adds no
//! coordination. Compound operations (`move_object` in particular) are not
//! atomic: a failure after the first mutating step is reported as
//! [`StorageError::PartialMove`] and left for the caller to resolve.
//!
//! # Examples
//!
//! ```no_run
//! use shardfs_storage::{mock::MockGateway, StorageDriver, Tenant};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = Arc::new(MockGateway::new());
//!     let driver = StorageDriver::with_base_path(gateway, "/alice/stor/files");
//!     let tenant = Tenant::new("AB12CD34EF5678", "app1")?;
//!
//!     driver.put_bytes(&tenant, "docs/readme.txt", "hello").await?;
//!     driver.copy_object(&tenant, "docs/readme.txt", "docs/copy.txt").await?;
//!
//!     let entries = driver.list_directory(&tenant, "docs").await?;
//!     assert_eq!(entries.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Every failure is a [`StorageError`] whose [`ErrorKind`] tells callers
//! what happened without matching on backend codes:
//!
//! ```no_run
//! use shardfs_storage::{ErrorKind, StorageError};
//!
//! fn describe(err: &StorageError) -> &'static str {
//!     match err.kind() {
//!         ErrorKind::NotFound => "missing",
//!         ErrorKind::PathRejected => "refused",
//!         ErrorKind::PartialCompoundFailure => "needs cleanup",
//!         _ => "failed",
//!     }
//! }
//! ```

pub mod driver;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod manta;
pub mod mock;
pub mod path;
pub mod signer;

pub use driver::StorageDriver;
pub use entry::{Entry, EntryKind};
pub use error::{ErrorKind, StorageError, StorageResult};
pub use gateway::{
    read_to_bytes, BackendGateway, Descriptor, DescriptorKind, DescriptorStream, ObjectReader,
    ObjectWriter, UploadSession,
};
pub use manta::{MantaConfig, MantaGateway};
pub use path::{sanitize, PathResolver, Tenant};

use shardfs_config::DriverConfig;
use std::sync::Arc;
use tracing::info;

/// Build a driver talking to the configured Manta endpoint
///
/// Resolves the key material, parses the private key and prepares the HTTP
/// client. No request is sent until the first operation.
pub fn connect(config: &DriverConfig) -> StorageResult<StorageDriver<MantaGateway>> {
    let gateway = MantaGateway::connect(&MantaConfig::from_driver_config(config)?)?;
    info!(url = %config.url, base_path = %config.base_path, "storage driver configured");
    Ok(StorageDriver::with_base_path(
        Arc::new(gateway),
        &config.base_path,
    ))
}
