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

//! File-storage operations on top of a [`BackendGateway`]
//!
//! Each operation resolves its paths through the [`PathResolver`] before any
//! backend call, then runs a short, fixed sequence of gateway calls. A failed
//! step short-circuits the rest; nothing is retried and nothing is rolled
//! back. The driver holds no state between calls, so concurrent operations
//! on the same paths are not coordinated.
//!
//! | Operation | Backend steps |
//! |---|---|
//! | `create_directory` | ensure_path |
//! | `list_directory` | list |
//! | `get_object` | open_read |
//! | `put_object` | ensure_path(parent) → open_write |
//! | `copy_object` | ensure_path(parent dst) → link |
//! | `move_object` | ensure_path(parent dst) → link → unlink(src) |
//! | `delete_object` | stat → unlink |
//! | `start_multipart_upload` | create_multipart_upload |
//!
//! # Examples
//!
//! ```rust,no_run
//! use shardfs_storage::{mock::MockGateway, StorageDriver, Tenant};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let driver = StorageDriver::with_base_path(Arc::new(MockGateway::new()), "/base");
//!     let tenant = Tenant::new("AB12CD34EF5678", "app1")?;
//!
//!     driver.put_bytes(&tenant, "notes/todo.txt", "buy milk").await?;
//!     for entry in driver.list_directory(&tenant, "notes").await? {
//!         println!("{} ({})", entry.name, entry.kind);
//!     }
//!     Ok(())
//! }
//! ```

use crate::entry::Entry;
use crate::error::{StorageError, StorageResult};
use crate::gateway::{read_to_bytes, BackendGateway, ObjectReader, ObjectWriter, UploadSession};
use crate::path::{PathResolver, Tenant};
use bytes::Bytes;
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Tenant-scoped file storage driver
///
/// Cheap to clone: clones share the same gateway.
pub struct StorageDriver<G: BackendGateway> {
    gateway: Arc<G>,
    resolver: PathResolver,
}

impl<G: BackendGateway> Clone for StorageDriver<G> {
    fn clone(&self) -> Self {
        StorageDriver {
            gateway: Arc::clone(&self.gateway),
            resolver: self.resolver.clone(),
        }
    }
}

impl<G: BackendGateway> fmt::Debug for StorageDriver<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageDriver")
            .field("base", &self.resolver.base())
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Log a failed step and annotate the error with the operation and path
fn failed<'a>(op: &'static str, path: &'a str) -> impl FnOnce(StorageError) -> StorageError + 'a {
    move |err| {
        error!(op, path, error = %err, "storage operation failed");
        err.during(op, path)
    }
}

impl<G: BackendGateway> StorageDriver<G> {
    /// Create a driver over `gateway`, resolving paths with `resolver`
    pub fn new(gateway: Arc<G>, resolver: PathResolver) -> Self {
        StorageDriver { gateway, resolver }
    }

    /// Create a driver whose tenants live under `base_path`
    pub fn with_base_path(gateway: Arc<G>, base_path: &str) -> Self {
        Self::new(gateway, PathResolver::new(base_path))
    }

    /// The path resolver in use
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The shared gateway
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Resolve a path that must name a node below the tenant root
    fn resolve_node(&self, op: &'static str, tenant: &Tenant, path: &str) -> StorageResult<String> {
        if PathResolver::is_root(path) {
            return Err(StorageError::path_rejected(format!(
                "{op} needs a path below the tenant root, got {path:?}"
            )));
        }
        Ok(self.resolver.resolve(tenant, path))
    }

    /// Create a directory and any missing ancestors.
    ///
    /// Idempotent: creating an existing directory succeeds with the same entry.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, path = %path))]
    pub async fn create_directory(&self, tenant: &Tenant, path: &str) -> StorageResult<Entry> {
        let resolved = self.resolver.resolve(tenant, path);
        debug!(resolved = %resolved, "ensure_path");

        self.gateway
            .ensure_path(&resolved)
            .await
            .map_err(failed("create_directory", &resolved))?;

        info!(resolved = %resolved, "directory created");
        Ok(Entry::folder(path))
    }

    /// List a directory in backend order.
    ///
    /// A tenant root that does not exist yet lists as empty. Any other
    /// missing directory is a `NotFound` error. If the listing fails part
    /// way, the entries received so far are discarded and the error is
    /// returned.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, path = %path))]
    pub async fn list_directory(&self, tenant: &Tenant, path: &str) -> StorageResult<Vec<Entry>> {
        let resolved = self.resolver.resolve(tenant, path);
        let at_root = PathResolver::is_root(path);
        debug!(resolved = %resolved, "list");

        let mut stream = self.gateway.list(&resolved);
        let mut entries = Vec::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(descriptor) => entries.push(Entry::from(&descriptor)),
                Err(err) if err.is_not_found() && at_root && entries.is_empty() => {
                    debug!(resolved = %resolved, "tenant root does not exist yet");
                    return Ok(Vec::new());
                }
                Err(err) => {
                    if !entries.is_empty() {
                        warn!(
                            resolved = %resolved,
                            discarded = entries.len(),
                            "listing ended with an error"
                        );
                    }
                    return Err(failed("list_directory", &resolved)(err));
                }
            }
        }

        debug!(resolved = %resolved, count = entries.len(), "listed");
        Ok(entries)
    }

    /// Open an object for reading, or `None` if it does not exist.
    ///
    /// The caller owns the returned stream.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, path = %path))]
    pub async fn get_object(&self, tenant: &Tenant, path: &str) -> StorageResult<Option<ObjectReader>> {
        let resolved = self.resolver.resolve(tenant, path);
        debug!(resolved = %resolved, "open_read");

        match self.gateway.open_read(&resolved).await {
            Ok(reader) => Ok(Some(reader)),
            Err(err) if err.is_not_found() => {
                debug!(resolved = %resolved, "object absent");
                Ok(None)
            }
            Err(err) => Err(failed("get_object", &resolved)(err)),
        }
    }

    /// Open an object for writing, creating its parent directories first.
    ///
    /// An existing object at `path` is replaced once the writer is closed.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, path = %path))]
    pub async fn put_object(&self, tenant: &Tenant, path: &str) -> StorageResult<Box<dyn ObjectWriter>> {
        let resolved = self.resolve_node("put_object", tenant, path)?;
        let parent = PathResolver::parent(&resolved);
        debug!(resolved = %resolved, parent = %parent, "ensure_path");

        self.gateway
            .ensure_path(parent)
            .await
            .map_err(failed("put_object", parent))?;

        debug!(resolved = %resolved, "open_write");
        self.gateway
            .open_write(&resolved)
            .await
            .map_err(failed("put_object", &resolved))
    }

    /// Copy a single object.
    ///
    /// The destination becomes a link to the source object; an existing
    /// destination object is replaced. Folders cannot be copied: the
    /// backend refuses to link them and the error is returned.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, src = %src, dst = %dst))]
    pub async fn copy_object(&self, tenant: &Tenant, src: &str, dst: &str) -> StorageResult<Entry> {
        let (source, dest) = self.resolve_pair("copy_object", tenant, src, dst)?;
        let parent = PathResolver::parent(&dest);
        debug!(parent = %parent, "ensure_path");

        self.gateway
            .ensure_path(parent)
            .await
            .map_err(failed("copy_object", parent))?;

        debug!(source = %source, dest = %dest, "link");
        self.gateway
            .link(&source, &dest)
            .await
            .map_err(failed("copy_object", &source))?;

        info!(source = %source, dest = %dest, "object copied");
        Ok(Entry::file(dst))
    }

    /// Move a single object: link the destination, then unlink the source.
    ///
    /// If the source cannot be removed after the destination was linked,
    /// both names remain and [`StorageError::PartialMove`] is returned.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, src = %src, dst = %dst))]
    pub async fn move_object(&self, tenant: &Tenant, src: &str, dst: &str) -> StorageResult<Entry> {
        let (source, dest) = self.resolve_pair("move_object", tenant, src, dst)?;
        let parent = PathResolver::parent(&dest);
        debug!(parent = %parent, "ensure_path");

        self.gateway
            .ensure_path(parent)
            .await
            .map_err(failed("move_object", parent))?;

        debug!(source = %source, dest = %dest, "link");
        self.gateway
            .link(&source, &dest)
            .await
            .map_err(failed("move_object", &source))?;

        debug!(source = %source, "unlink");
        if let Err(cause) = self.gateway.unlink(&source).await {
            error!(
                source = %source,
                dest = %dest,
                error = %cause,
                "move left both copies in place"
            );
            return Err(StorageError::PartialMove {
                source_path: source,
                dest_path: dest,
                cause: Box::new(cause),
            });
        }

        info!(source = %source, dest = %dest, "object moved");
        Ok(Entry::file(dst))
    }

    /// Delete a node, reporting what kind of node it was.
    ///
    /// Whether a non-empty folder can be deleted is up to the backend.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, path = %path))]
    pub async fn delete_object(&self, tenant: &Tenant, path: &str) -> StorageResult<Entry> {
        let resolved = self.resolve_node("delete_object", tenant, path)?;
        debug!(resolved = %resolved, "stat");

        let descriptor = self
            .gateway
            .stat(&resolved)
            .await
            .map_err(failed("delete_object", &resolved))?;

        debug!(resolved = %resolved, kind = ?descriptor.kind, "unlink");
        self.gateway
            .unlink(&resolved)
            .await
            .map_err(failed("delete_object", &resolved))?;

        info!(resolved = %resolved, "node deleted");
        Ok(Entry::from(&descriptor).renamed(path))
    }

    /// Open a multipart upload session for `tenant`.
    ///
    /// Every call stages under its own fresh path, so concurrent sessions
    /// never share one.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant))]
    pub async fn start_multipart_upload(&self, tenant: &Tenant) -> StorageResult<UploadSession> {
        let staging = self.resolver.staging_path(&uuid::Uuid::new_v4().to_string());
        debug!(staging = %staging, "create_multipart_upload");

        let session = self
            .gateway
            .create_multipart_upload(&staging, tenant)
            .await
            .map_err(failed("start_multipart_upload", &staging))?;

        info!(session = %session.id, staging = %staging, "multipart upload started");
        Ok(session)
    }

    /// Write a whole object from memory and close it
    pub async fn put_bytes(
        &self,
        tenant: &Tenant,
        path: &str,
        data: impl Into<Bytes>,
    ) -> StorageResult<Entry> {
        let data = data.into();
        let size = data.len() as u64;
        let mut writer = self.put_object(tenant, path).await?;
        writer.write(data).await?;
        writer.close().await?;
        Ok(Entry::file(path).with_size(size))
    }

    /// Read a whole object into memory, or `None` if it does not exist
    pub async fn get_bytes(&self, tenant: &Tenant, path: &str) -> StorageResult<Option<Bytes>> {
        match self.get_object(tenant, path).await? {
            Some(reader) => Ok(Some(read_to_bytes(reader).await?)),
            None => Ok(None),
        }
    }

    fn resolve_pair(
        &self,
        op: &'static str,
        tenant: &Tenant,
        src: &str,
        dst: &str,
    ) -> StorageResult<(String, String)> {
        let source = self.resolve_node(op, tenant, src)?;
        let dest = self.resolve_node(op, tenant, dst)?;
        if source == dest {
            return Err(StorageError::path_rejected(format!(
                "{op}: source and destination are the same path ({source})"
            )));
        }
        Ok((source, dest))
    }
}
