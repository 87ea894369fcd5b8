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

//! Domain-facing directory entries

use crate::gateway::{Descriptor, DescriptorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a filesystem node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A stored object
    File,
    /// A directory
    Folder,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Folder => f.write_str("folder"),
        }
    }
}

/// A node as reported to callers
///
/// `size` is only present for files whose size the backend reported;
/// folders never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Node name (a logical path for single-node results, a basename in listings)
    pub name: String,
    /// File or folder
    pub kind: EntryKind,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Entry {
    /// Create a folder entry
    pub fn folder(name: impl Into<String>) -> Self {
        Entry {
            name: name.into(),
            kind: EntryKind::Folder,
            size: None,
        }
    }

    /// Create a file entry with no known size
    pub fn file(name: impl Into<String>) -> Self {
        Entry {
            name: name.into(),
            kind: EntryKind::File,
            size: None,
        }
    }

    /// Attach a size to a file entry
    pub fn with_size(mut self, size: u64) -> Self {
        if self.kind == EntryKind::File {
            self.size = Some(size);
        }
        self
    }

    /// Same entry under another name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this entry is a folder
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

impl From<&Descriptor> for Entry {
    fn from(descriptor: &Descriptor) -> Self {
        match descriptor.kind {
            DescriptorKind::Object => Entry {
                name: descriptor.name.clone(),
                kind: EntryKind::File,
                size: descriptor.size,
            },
            DescriptorKind::Directory => Entry::folder(descriptor.name.clone()),
        }
    }
}

impl From<Descriptor> for Entry {
    fn from(descriptor: Descriptor) -> Self {
        Entry::from(&descriptor)
    }
}
