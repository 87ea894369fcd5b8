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

//! Capabilities the driver needs from the remote object store
//!
//! [`BackendGateway`] is the seam between the driver and a concrete backend
//! client. Paths handed to a gateway are always resolved, absolute backend
//! paths produced by [`PathResolver`](crate::PathResolver); gateways never
//! see caller input directly.
//!
//! Implementations:
//! - [`MockGateway`](crate::mock::MockGateway): in-memory tree for tests
//! - [`MantaGateway`](crate::manta::MantaGateway): HTTP client with signed requests

use crate::error::StorageResult;
use crate::path::Tenant;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Lazy, finite, non-restartable sequence of directory entries.
///
/// An `Err` item ends the sequence; a stream that returns `None` without
/// yielding an error ended cleanly.
pub type DescriptorStream = BoxStream<'static, StorageResult<Descriptor>>;

/// Byte stream of an object being read
pub type ObjectReader = BoxStream<'static, StorageResult<Bytes>>;

/// Backend classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    /// A stored object
    Object,
    /// A directory, or any node type the driver does not know
    #[serde(other)]
    Directory,
}

/// A node as described by the backend
///
/// Matches the JSON record the backend emits per line of a directory
/// listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Basename of the node
    pub name: String,
    /// Node type
    #[serde(rename = "type")]
    pub kind: DescriptorKind,
    /// Object size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Object etag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Last modification time as reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
}

impl Descriptor {
    /// Descriptor of an object
    pub fn object(name: impl Into<String>, size: u64) -> Self {
        Descriptor {
            name: name.into(),
            kind: DescriptorKind::Object,
            size: Some(size),
            etag: None,
            mtime: None,
        }
    }

    /// Descriptor of a directory
    pub fn directory(name: impl Into<String>) -> Self {
        Descriptor {
            name: name.into(),
            kind: DescriptorKind::Directory,
            size: None,
            etag: None,
            mtime: None,
        }
    }

    /// Whether the backend classifies this node as an object
    pub fn is_object(&self) -> bool {
        self.kind == DescriptorKind::Object
    }
}

/// An in-progress multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSession {
    /// Opaque backend session identifier
    pub id: String,
    /// Backend path the session will eventually commit to
    pub object_path: String,
}

/// Byte sink for an object being written
///
/// Data is only guaranteed to be stored once [`close`](ObjectWriter::close)
/// returns `Ok`. Dropping a writer without closing it abandons the write.
#[async_trait]
pub trait ObjectWriter: Send {
    /// Append a chunk to the object
    async fn write(&mut self, chunk: Bytes) -> StorageResult<()>;

    /// Finish the object and wait for the backend to accept it
    async fn close(self: Box<Self>) -> StorageResult<()>;
}

/// Operations the driver issues against the remote store
///
/// Every method may suspend on network I/O. Failures carry a classifiable
/// [`ErrorKind`](crate::ErrorKind); gateways report missing paths as
/// [`StorageError::NotFound`](crate::StorageError::NotFound) and everything
/// else as [`StorageError::Backend`](crate::StorageError::Backend) or
/// [`StorageError::Io`](crate::StorageError::Io).
#[async_trait]
pub trait BackendGateway: Send + Sync + Debug {
    /// Create `path` and every missing ancestor as directories (mkdir -p).
    ///
    /// Succeeds when the directory already exists.
    async fn ensure_path(&self, path: &str) -> StorageResult<()>;

    /// Stream the entries of the directory at `path`, in backend order.
    ///
    /// No request is made until the stream is first polled. A missing
    /// directory is reported as a `NotFound` item.
    fn list(&self, path: &str) -> DescriptorStream;

    /// Open the object at `path` for reading
    async fn open_read(&self, path: &str) -> StorageResult<ObjectReader>;

    /// Open the object at `path` for writing, replacing any existing object.
    ///
    /// The parent directory must already exist.
    async fn open_write(&self, path: &str) -> StorageResult<Box<dyn ObjectWriter>>;

    /// Make `dest` a second name for the object at `source`.
    ///
    /// Single-object only: a directory source must fail.
    async fn link(&self, source: &str, dest: &str) -> StorageResult<()>;

    /// Remove the node at `path`
    async fn unlink(&self, path: &str) -> StorageResult<()>;

    /// Describe the node at `path`
    async fn stat(&self, path: &str) -> StorageResult<Descriptor>;

    /// Open a multipart upload session committing to `object_path`, owned by
    /// `owner`
    async fn create_multipart_upload(
        &self,
        object_path: &str,
        owner: &Tenant,
    ) -> StorageResult<UploadSession>;
}

/// Drain an object reader into memory
pub async fn read_to_bytes(reader: ObjectReader) -> StorageResult<Bytes> {
    let buf = reader
        .try_fold(BytesMut::new(), |mut buf, chunk| async move {
            buf.extend_from_slice(&chunk);
            Ok(buf)
        })
        .await?;
    Ok(buf.freeze())
}
