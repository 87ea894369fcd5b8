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

//! In-memory mock gateway for testing
//!
//! Provides a thread-safe, in-memory implementation of
//! [`BackendGateway`](crate::BackendGateway) using `Arc<RwLock<..>>` for
//! concurrent access. The tree follows the remote store's rules: writes and
//! links need an existing parent directory, only objects can be linked, and
//! non-empty directories cannot be unlinked.
//!
//! Faults can be injected per operation and path to exercise the driver's
//! failure handling, and every gateway call is recorded in order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use shardfs_storage::mock::{GatewayOp, MockGateway};
//! use shardfs_storage::BackendGateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = MockGateway::new();
//!     gateway.ensure_path("/base/dir").await?;
//!     gateway.fail_on(GatewayOp::Unlink, "/base/dir", "InternalError").await;
//!
//!     assert!(gateway.unlink("/base/dir").await.is_err());
//!     assert_eq!(gateway.calls().await.len(), 2);
//!     Ok(())
//! }
//! ```

use crate::error::{StorageError, StorageResult};
use crate::gateway::{
    BackendGateway, Descriptor, DescriptorStream, ObjectReader, ObjectWriter, UploadSession,
};
use crate::path::{PathResolver, Tenant};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Largest chunk handed out by a mock reader
const READ_CHUNK: usize = 64 * 1024;

/// Gateway operations, used for fault injection and the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    /// `ensure_path`
    EnsurePath,
    /// `list`
    List,
    /// `open_read`
    OpenRead,
    /// `open_write`
    OpenWrite,
    /// `link`
    Link,
    /// `unlink`
    Unlink,
    /// `stat`
    Stat,
    /// `create_multipart_upload`
    CreateUpload,
}

#[derive(Debug, Clone)]
enum Node {
    Directory,
    Object(Bytes),
}

static ROOT: Node = Node::Directory;

#[derive(Debug, Clone)]
struct Fault {
    code: String,
    /// For listings: number of entries yielded before failing
    after: usize,
}

impl Fault {
    fn error(&self, path: &str) -> StorageError {
        StorageError::http(500, self.code.clone(), format!("injected fault on {path}"))
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    faults: HashMap<(GatewayOp, String), Fault>,
    calls: Vec<(GatewayOp, String)>,
    uploads: Vec<(UploadSession, Tenant)>,
}

impl State {
    /// Record a call and return the injected fault for it, if any
    fn enter(&mut self, op: GatewayOp, path: &str) -> Option<Fault> {
        self.calls.push((op, path.to_string()));
        self.faults.get(&(op, path.to_string())).cloned()
    }

    fn node(&self, path: &str) -> Option<&Node> {
        if path == "/" {
            return Some(&ROOT);
        }
        self.nodes.get(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        matches!(self.node(path), Some(Node::Directory))
    }

    fn children(&self, dir: &str) -> Vec<(String, Node)> {
        let prefix = if dir == "/" { "/".to_string() } else { format!("{dir}/") };
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .map(|(path, node)| (path[prefix.len()..].to_string(), node.clone()))
            .collect()
    }

    /// Check that `path` may hold an object
    fn check_object_target(&self, path: &str) -> StorageResult<()> {
        let parent = PathResolver::parent(path);
        if !self.is_directory(parent) {
            return Err(StorageError::not_found(parent));
        }
        if self.is_directory(path) {
            return Err(StorageError::backend(
                "ParentNotDirectory",
                format!("{path} is a directory"),
            ));
        }
        Ok(())
    }
}

/// In-memory mock gateway for testing
///
/// Cloning is cheap and clones share the same tree, faults and call log.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<RwLock<State>>,
}

impl MockGateway {
    /// Create an empty tree (only `/` exists)
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` call on exactly `path` fail with a backend error
    /// carrying `code`, until [`clear_faults`](Self::clear_faults)
    pub async fn fail_on(&self, op: GatewayOp, path: &str, code: &str) {
        self.state.write().await.faults.insert(
            (op, path.to_string()),
            Fault {
                code: code.to_string(),
                after: 0,
            },
        );
    }

    /// Make listings of `path` yield `after` entries, then fail
    pub async fn fail_list_after(&self, path: &str, after: usize, code: &str) {
        self.state.write().await.faults.insert(
            (GatewayOp::List, path.to_string()),
            Fault {
                code: code.to_string(),
                after,
            },
        );
    }

    /// Remove every injected fault
    pub async fn clear_faults(&self) {
        self.state.write().await.faults.clear();
    }

    /// Every gateway call so far, in order
    pub async fn calls(&self) -> Vec<(GatewayOp, String)> {
        self.state.read().await.calls.clone()
    }

    /// Forget the recorded calls
    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    /// Whether any node exists at `path`
    pub async fn exists(&self, path: &str) -> bool {
        self.state.read().await.node(path).is_some()
    }

    /// Whether a directory exists at `path`
    pub async fn is_directory(&self, path: &str) -> bool {
        self.state.read().await.is_directory(path)
    }

    /// Content of the object at `path`
    pub async fn object(&self, path: &str) -> Option<Bytes> {
        match self.state.read().await.node(path) {
            Some(Node::Object(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Number of nodes, not counting `/`
    pub async fn len(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    /// Whether the tree holds nothing but `/`
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.nodes.is_empty()
    }

    /// Multipart sessions opened so far, with their owners
    pub async fn uploads(&self) -> Vec<(UploadSession, Tenant)> {
        self.state.read().await.uploads.clone()
    }
}

impl fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockGateway").finish()
    }
}

/// Writer that buffers in memory and stores the object on close
struct MockWriter {
    state: Arc<RwLock<State>>,
    path: String,
    buf: BytesMut,
}

#[async_trait]
impl ObjectWriter for MockWriter {
    async fn write(&mut self, chunk: Bytes) -> StorageResult<()> {
        self.buf.extend_from_slice(&chunk);
        Ok(())
    }

    async fn close(self: Box<Self>) -> StorageResult<()> {
        let MockWriter { state, path, buf } = *self;
        let mut state = state.write().await;
        state.check_object_target(&path)?;
        state.nodes.insert(path, Node::Object(buf.freeze()));
        Ok(())
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn ensure_path(&self, path: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::EnsurePath, path) {
            return Err(fault.error(path));
        }

        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            match state.nodes.get(&current) {
                Some(Node::Directory) => {}
                Some(Node::Object(_)) => {
                    return Err(StorageError::backend(
                        "ParentNotDirectory",
                        format!("{current} is an object"),
                    ));
                }
                None => {
                    state.nodes.insert(current.clone(), Node::Directory);
                }
            }
        }
        Ok(())
    }

    fn list(&self, path: &str) -> DescriptorStream {
        let state = Arc::clone(&self.state);
        let path = path.to_string();

        stream::once(async move {
            let mut state = state.write().await;
            let fault = state.enter(GatewayOp::List, &path);

            let mut items: Vec<StorageResult<Descriptor>> = match state.node(&path) {
                None => vec![Err(StorageError::not_found(path.as_str()))],
                Some(Node::Object(_)) => vec![Err(StorageError::backend(
                    "NotADirectory",
                    format!("{path} is an object"),
                ))],
                Some(Node::Directory) => state
                    .children(&path)
                    .into_iter()
                    .map(|(name, node)| {
                        Ok(match node {
                            Node::Directory => Descriptor::directory(name),
                            Node::Object(data) => Descriptor::object(name, data.len() as u64),
                        })
                    })
                    .collect(),
            };

            if let Some(fault) = fault {
                items.truncate(fault.after);
                items.push(Err(fault.error(&path)));
            }
            stream::iter(items)
        })
        .flatten()
        .boxed()
    }

    async fn open_read(&self, path: &str) -> StorageResult<ObjectReader> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::OpenRead, path) {
            return Err(fault.error(path));
        }

        match state.node(path) {
            Some(Node::Object(data)) => {
                let chunks: Vec<StorageResult<Bytes>> = data
                    .chunks(READ_CHUNK)
                    .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                    .collect();
                Ok(stream::iter(chunks).boxed())
            }
            Some(Node::Directory) => Err(StorageError::backend(
                "NotAnObject",
                format!("{path} is a directory"),
            )),
            None => Err(StorageError::not_found(path)),
        }
    }

    async fn open_write(&self, path: &str) -> StorageResult<Box<dyn ObjectWriter>> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::OpenWrite, path) {
            return Err(fault.error(path));
        }
        state.check_object_target(path)?;

        Ok(Box::new(MockWriter {
            state: Arc::clone(&self.state),
            path: path.to_string(),
            buf: BytesMut::new(),
        }))
    }

    async fn link(&self, source: &str, dest: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::Link, source) {
            return Err(fault.error(source));
        }

        let data = match state.node(source) {
            Some(Node::Object(data)) => data.clone(),
            Some(Node::Directory) => {
                return Err(StorageError::backend(
                    "LinkNotObject",
                    format!("{source} is a directory"),
                ))
            }
            None => return Err(StorageError::not_found(source)),
        };
        state.check_object_target(dest)?;
        state.nodes.insert(dest.to_string(), Node::Object(data));
        Ok(())
    }

    async fn unlink(&self, path: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::Unlink, path) {
            return Err(fault.error(path));
        }

        match state.node(path) {
            None => Err(StorageError::not_found(path)),
            Some(Node::Directory) if path == "/" => Err(StorageError::backend(
                "OperationNotAllowedOnRootDirectory",
                "cannot remove /",
            )),
            Some(Node::Directory) if !state.children(path).is_empty() => Err(
                StorageError::backend("DirectoryNotEmpty", format!("{path} is not empty")),
            ),
            Some(_) => {
                state.nodes.remove(path);
                Ok(())
            }
        }
    }

    async fn stat(&self, path: &str) -> StorageResult<Descriptor> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::Stat, path) {
            return Err(fault.error(path));
        }

        let name = PathResolver::basename(path);
        match state.node(path) {
            Some(Node::Directory) => Ok(Descriptor::directory(name)),
            Some(Node::Object(data)) => Ok(Descriptor::object(name, data.len() as u64)),
            None => Err(StorageError::not_found(path)),
        }
    }

    async fn create_multipart_upload(
        &self,
        object_path: &str,
        owner: &Tenant,
    ) -> StorageResult<UploadSession> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.enter(GatewayOp::CreateUpload, object_path) {
            return Err(fault.error(object_path));
        }

        let session = UploadSession {
            id: uuid::Uuid::new_v4().to_string(),
            object_path: object_path.to_string(),
        };
        state.uploads.push((session.clone(), owner.clone()));
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::read_to_bytes;
    use futures::TryStreamExt;

    async fn write(gateway: &MockGateway, path: &str, data: &'static [u8]) {
        let mut writer = gateway.open_write(path).await.unwrap();
        writer.write(Bytes::from_static(data)).await.unwrap();
        writer.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_new() {
        let gateway = MockGateway::new();
        assert!(gateway.is_empty().await);
        assert!(gateway.is_directory("/").await);
    }

    #[tokio::test]
    async fn test_ensure_path_is_idempotent() {
        let gateway = MockGateway::new();
        gateway.ensure_path("/a/b/c").await.unwrap();
        gateway.ensure_path("/a/b/c").await.unwrap();
        assert_eq!(gateway.len().await, 3);
        assert!(gateway.is_directory("/a/b").await);
    }

    #[tokio::test]
    async fn test_ensure_path_through_object_fails() {
        let gateway = MockGateway::new();
        write(&gateway, "/f", b"x").await;
        let err = gateway.ensure_path("/f/sub").await.unwrap_err();
        assert_eq!(err.backend_code(), Some("ParentNotDirectory"));
    }

    #[tokio::test]
    async fn test_write_needs_parent() {
        let gateway = MockGateway::new();
        assert!(gateway.open_write("/missing/f").await.err().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_write_commits_on_close_only() {
        let gateway = MockGateway::new();
        let mut writer = gateway.open_write("/f").await.unwrap();
        writer.write(Bytes::from_static(b"abc")).await.unwrap();
        assert!(!gateway.exists("/f").await);
        writer.close().await.unwrap();
        assert_eq!(gateway.object("/f").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_dropped_writer_stores_nothing() {
        let gateway = MockGateway::new();
        {
            let mut writer = gateway.open_write("/f").await.unwrap();
            writer.write(Bytes::from_static(b"abc")).await.unwrap();
        }
        assert!(!gateway.exists("/f").await);
    }

    #[tokio::test]
    async fn test_read_round_trip() {
        let gateway = MockGateway::new();
        write(&gateway, "/f", b"hello").await;
        let reader = gateway.open_read("/f").await.unwrap();
        assert_eq!(read_to_bytes(reader).await.unwrap(), "hello");
        assert!(gateway.open_read("/nope").await.err().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_list_direct_children_only() {
        let gateway = MockGateway::new();
        gateway.ensure_path("/d/sub/deep").await.unwrap();
        write(&gateway, "/d/a.txt", b"12345").await;
        write(&gateway, "/d/sub/b.txt", b"1").await;
        write(&gateway, "/dx", b"1").await;

        let listed: Vec<Descriptor> = gateway.list("/d").try_collect().await.unwrap();
        assert_eq!(
            listed,
            vec![Descriptor::object("a.txt", 5), Descriptor::directory("sub")]
        );
    }

    #[tokio::test]
    async fn test_list_missing_is_not_found() {
        let gateway = MockGateway::new();
        let result: StorageResult<Vec<Descriptor>> = gateway.list("/nope").try_collect().await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_lazy() {
        let gateway = MockGateway::new();
        let stream = gateway.list("/");
        assert!(gateway.calls().await.is_empty());
        drop(stream);
    }

    #[tokio::test]
    async fn test_list_fault_after_entries() {
        let gateway = MockGateway::new();
        gateway.ensure_path("/d/x").await.unwrap();
        gateway.ensure_path("/d/y").await.unwrap();
        gateway.fail_list_after("/d", 1, "InternalError").await;

        let items: Vec<StorageResult<Descriptor>> = gateway.list("/d").collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_link_object_and_reject_directory() {
        let gateway = MockGateway::new();
        write(&gateway, "/a", b"data").await;
        gateway.ensure_path("/dir").await.unwrap();

        gateway.link("/a", "/b").await.unwrap();
        assert_eq!(gateway.object("/b").await.unwrap(), "data");

        let err = gateway.link("/dir", "/c").await.unwrap_err();
        assert_eq!(err.backend_code(), Some("LinkNotObject"));
        assert!(!gateway.exists("/c").await);
    }

    #[tokio::test]
    async fn test_unlink_rules() {
        let gateway = MockGateway::new();
        gateway.ensure_path("/d").await.unwrap();
        write(&gateway, "/d/f", b"x").await;

        let err = gateway.unlink("/d").await.unwrap_err();
        assert_eq!(err.backend_code(), Some("DirectoryNotEmpty"));

        gateway.unlink("/d/f").await.unwrap();
        gateway.unlink("/d").await.unwrap();
        assert!(gateway.unlink("/d").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_stat() {
        let gateway = MockGateway::new();
        gateway.ensure_path("/d").await.unwrap();
        write(&gateway, "/d/f", b"xyz").await;

        assert_eq!(gateway.stat("/d").await.unwrap(), Descriptor::directory("d"));
        assert_eq!(gateway.stat("/d/f").await.unwrap(), Descriptor::object("f", 3));
        assert!(gateway.stat("/d/g").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fault_injection_and_call_log() {
        let gateway = MockGateway::new();
        gateway.fail_on(GatewayOp::Stat, "/x", "InternalError").await;

        let err = gateway.stat("/x").await.unwrap_err();
        assert_eq!(err.backend_code(), Some("InternalError"));
        assert_eq!(gateway.calls().await, vec![(GatewayOp::Stat, "/x".to_string())]);

        gateway.clear_faults().await;
        gateway.clear_calls().await;
        assert!(gateway.stat("/x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let gateway1 = MockGateway::new();
        let gateway2 = gateway1.clone();
        gateway1.ensure_path("/shared").await.unwrap();
        assert!(gateway2.is_directory("/shared").await);
    }

    #[tokio::test]
    async fn test_concurrent_writes() {
        let gateway = MockGateway::new();
        gateway.ensure_path("/c").await.unwrap();

        let mut handles = Vec::new();
        for task in 0..4 {
            let gateway = gateway.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..10 {
                    let path = format!("/c/t{task}_{i}");
                    let mut writer = gateway.open_write(&path).await.unwrap();
                    writer.write(Bytes::from_static(b"d")).await.unwrap();
                    writer.close().await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(gateway.len().await, 41);
    }

    #[test]
    fn test_debug_impl() {
        let gateway = MockGateway::new();
        assert!(format!("{gateway:?}").contains("MockGateway"));
    }
}
