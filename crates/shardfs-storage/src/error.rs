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

//! Storage error types and utilities

use shardfs_config::ConfigError;
use std::io;
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Classification of a [`StorageError`], independent of any annotation
/// added by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path does not exist in the backend
    NotFound,
    /// The path or tenant identifier was refused before reaching the backend
    PathRejected,
    /// Any other failure reported by the backend
    Backend,
    /// A move linked the destination but could not remove the source
    PartialCompoundFailure,
    /// Key material or configuration could not be used to build a gateway
    Configuration,
    /// Local I/O or transport failure
    Io,
    /// Anything else
    Other,
}

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Path not found in the backend
    #[error("not found: {0}")]
    NotFound(String),

    /// Path or tenant identifier refused by the driver
    #[error("path rejected: {0}")]
    PathRejected(String),

    /// Failure reported by the backend service
    #[error("backend error{}: {code}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Backend {
        /// HTTP status, when the failure came from a response
        status: Option<u16>,
        /// Backend error code (e.g. `DirectoryNotEmpty`)
        code: String,
        /// Human readable message from the backend
        message: String,
    },

    /// `link` succeeded but `unlink` of the source failed: both copies exist
    #[error("move partially applied: {dest_path} was created but {source_path} could not be removed: {cause}")]
    PartialMove {
        /// Resolved source path, still present
        source_path: String,
        /// Resolved destination path, now present
        dest_path: String,
        /// The unlink failure
        cause: Box<StorageError>,
    },

    /// Private key could not be parsed or used
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Configuration could not be turned into a driver
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A failed driver operation, annotated with the resolved path
    #[error("{op} {path}: {source}")]
    Operation {
        /// Driver operation name
        op: &'static str,
        /// Resolved backend path the operation was working on
        path: String,
        /// Underlying failure
        #[source]
        source: Box<StorageError>,
    },

    /// Transparent error delegation for wrapped error types
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorageError {
    /// Create a NotFound error for the given path
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        StorageError::NotFound(path.into())
    }

    /// Create a PathRejected error with context
    pub fn path_rejected<S: Into<String>>(msg: S) -> Self {
        StorageError::PathRejected(msg.into())
    }

    /// Create a Backend error with no HTTP status attached
    pub fn backend<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        StorageError::Backend {
            status: None,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a Backend error from an HTTP response
    pub fn http<C: Into<String>, M: Into<String>>(status: u16, code: C, message: M) -> Self {
        StorageError::Backend {
            status: Some(status),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidKeyMaterial error with context
    pub fn invalid_key_material<S: Into<String>>(msg: S) -> Self {
        StorageError::InvalidKeyMaterial(msg.into())
    }

    /// Create a generic error from any error type that can convert to anyhow::Error
    pub fn other<E: Into<anyhow::Error>>(error: E) -> Self {
        StorageError::Other(error.into())
    }

    /// Annotate this error with the operation and resolved path.
    ///
    /// Already annotated errors and partial moves carry their own paths and
    /// are returned unchanged.
    pub fn during(self, op: &'static str, path: impl Into<String>) -> Self {
        match self {
            StorageError::Operation { .. } | StorageError::PartialMove { .. } => self,
            other => StorageError::Operation {
                op,
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Classification of this error, looking through annotations
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::PathRejected(_) => ErrorKind::PathRejected,
            StorageError::Backend { .. } => ErrorKind::Backend,
            StorageError::PartialMove { .. } => ErrorKind::PartialCompoundFailure,
            StorageError::InvalidKeyMaterial(_) | StorageError::Config(_) => {
                ErrorKind::Configuration
            }
            StorageError::Io(_) => ErrorKind::Io,
            StorageError::Operation { source, .. } => source.kind(),
            StorageError::Other(_) => ErrorKind::Other,
        }
    }

    /// The innermost error, with every annotation removed
    pub fn root(&self) -> &StorageError {
        match self {
            StorageError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Backend error code, if this is (or wraps) a backend error
    pub fn backend_code(&self) -> Option<&str> {
        match self.root() {
            StorageError::Backend { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a PathRejected error
    pub fn is_path_rejected(&self) -> bool {
        self.kind() == ErrorKind::PathRejected
    }

    /// Check if this is a partially applied compound operation
    pub fn is_partial(&self) -> bool {
        self.kind() == ErrorKind::PartialCompoundFailure
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorageError::Io(io::Error::new(io::ErrorKind::TimedOut, err))
        } else {
            StorageError::Io(io::Error::other(err))
        }
    }
}
