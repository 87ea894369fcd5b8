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

//! Tenant identity and backend path resolution
//!
//! Every caller path is resolved into the backend namespace as:
//!
//! ```text
//! <base>/<shard>/<account>/<app>/<sanitized logical path>
//! ```
//!
//! The shard prefix is built from the first three two-character groups of
//! the account identifier, so account `AB12CD34EF5678` lives under
//! `AB/12/CD/`. This bounds the fan-out of the first shard levels to one
//! entry per two-character group.
//!
//! Logical paths are normalized lexically and every leading `..` left after
//! normalization is dropped, so a resolved path never leaves the tenant's
//! subtree:
//!
//! ```rust
//! use shardfs_storage::{PathResolver, Tenant};
//!
//! let resolver = PathResolver::new("/acct/stor/tenants");
//! let tenant = Tenant::new("AB12CD34EF5678", "app1").unwrap();
//!
//! assert_eq!(
//!     resolver.resolve(&tenant, "../../../etc/passwd"),
//!     "/acct/stor/tenants/AB/12/CD/AB12CD34EF5678/app1/etc/passwd"
//! );
//! ```

use crate::error::{StorageError, StorageResult};
use std::fmt;

/// Number of two-character groups taken from the account id
const SHARD_DEPTH: usize = 3;

/// Width of each shard group
const SHARD_WIDTH: usize = 2;

/// Directory under the base path holding multipart staging objects
const STAGING_DIR: &str = ".uploads";

/// The (account, application) pair that scopes a subtree of the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tenant {
    account: String,
    app: String,
}

impl Tenant {
    /// Create a tenant identity
    ///
    /// Identifiers become path segments, so they must be non-empty and must
    /// not contain separators or be a dot segment.
    pub fn new(account: impl Into<String>, app: impl Into<String>) -> StorageResult<Self> {
        let account = account.into();
        let app = app.into();
        validate_identifier("account", &account)?;
        validate_identifier("application", &app)?;
        let tenant = Tenant { account, app };
        if let Some(group) = tenant.shard_groups().into_iter().find(|g| g == "." || g == "..") {
            return Err(StorageError::path_rejected(format!(
                "account identifier {:?} would produce a '{group}' shard segment",
                tenant.account
            )));
        }
        Ok(tenant)
    }

    /// Account identifier
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Application identifier
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Shard prefix derived from the account identifier
    ///
    /// Short identifiers are used as-is: `AB1` shards as `AB/1`.
    pub fn shard(&self) -> String {
        self.shard_groups().join("/")
    }

    fn shard_groups(&self) -> Vec<String> {
        let chars: Vec<char> = self.account.chars().take(SHARD_DEPTH * SHARD_WIDTH).collect();
        chars
            .chunks(SHARD_WIDTH)
            .map(|group| group.iter().collect::<String>())
            .collect()
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.app)
    }
}

fn validate_identifier(what: &str, id: &str) -> StorageResult<()> {
    if id.is_empty() {
        return Err(StorageError::path_rejected(format!(
            "{what} identifier cannot be empty"
        )));
    }
    if id == "." || id == ".." {
        return Err(StorageError::path_rejected(format!(
            "{what} identifier cannot be '{id}'"
        )));
    }
    if id.contains(['/', '\\', '\0']) {
        return Err(StorageError::path_rejected(format!(
            "{what} identifier contains a path separator: {id:?}"
        )));
    }
    Ok(())
}

/// Normalize a logical path and drop everything that would climb above its
/// root.
///
/// Both `/` and `\` separate segments. Empty and `.` segments vanish, `..`
/// cancels the preceding segment, and a `..` with nothing left to cancel is
/// discarded. The result has no leading, trailing or repeated separators and
/// is empty for the root.
///
/// ```rust
/// use shardfs_storage::path::sanitize;
///
/// assert_eq!(sanitize("a/./b/../c/"), "a/c");
/// assert_eq!(sanitize("../../x/../../y"), "y");
/// assert_eq!(sanitize("..\\..\\x"), "x");
/// assert_eq!(sanitize(""), "");
/// ```
pub fn sanitize(logical: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in logical.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    segments.join("/")
}

/// Resolves tenant-relative logical paths into the backend namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    base: String,
}

impl PathResolver {
    /// Create a resolver rooted at `base_path`
    ///
    /// The base is normalized to a leading `/` with no trailing `/`.
    pub fn new(base_path: impl AsRef<str>) -> Self {
        let trimmed: Vec<&str> = base_path
            .as_ref()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        PathResolver {
            base: format!("/{}", trimmed.join("/")),
        }
    }

    /// Normalized base path
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolved path of the tenant's root directory
    pub fn tenant_root(&self, tenant: &Tenant) -> String {
        join([
            self.base.as_str(),
            tenant.shard().as_str(),
            tenant.account(),
            tenant.app(),
        ])
    }

    /// Resolve a logical path for `tenant`
    ///
    /// Pure and infallible: an empty or root path resolves to the tenant
    /// root itself.
    pub fn resolve(&self, tenant: &Tenant, logical: &str) -> String {
        let root = self.tenant_root(tenant);
        let relative = sanitize(logical);
        join([root.as_str(), relative.as_str()])
    }

    /// Whether `logical` denotes the tenant root after sanitizing
    pub fn is_root(logical: &str) -> bool {
        sanitize(logical).is_empty()
    }

    /// Whether a resolved path lies inside the tenant's subtree
    pub fn is_within(&self, tenant: &Tenant, resolved: &str) -> bool {
        let root = self.tenant_root(tenant);
        let inside = resolved == root
            || resolved
                .strip_prefix(root.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
        inside && !resolved.split('/').any(|s| s == "..")
    }

    /// Staging path handed to the backend when opening a multipart upload
    pub fn staging_path(&self, session: &str) -> String {
        join([self.base.as_str(), STAGING_DIR, session])
    }

    /// Parent directory of a resolved path
    ///
    /// ```rust
    /// use shardfs_storage::PathResolver;
    ///
    /// assert_eq!(PathResolver::parent("/a/b/c.txt"), "/a/b");
    /// assert_eq!(PathResolver::parent("/a"), "/");
    /// ```
    pub fn parent(resolved: &str) -> &str {
        match resolved.trim_end_matches('/').rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &resolved[..idx],
        }
    }

    /// Last segment of a path
    pub fn basename(path: &str) -> &str {
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// Join path pieces with `/`, skipping empty pieces and collapsing
/// separators at the seams.
fn join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts {
        for segment in part.split('/').filter(|s| !s.is_empty()) {
            out.push('/');
            out.push_str(segment);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
