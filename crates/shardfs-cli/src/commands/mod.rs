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

// Command modules for the shardfs CLI
pub mod cp;
pub mod get;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rm;
pub mod upload;

pub use cp::CpCmd;
pub use get::GetCmd;
pub use ls::LsCmd;
pub use mkdir::MkdirCmd;
pub use mv::MvCmd;
pub use put::PutCmd;
pub use rm::RmCmd;
pub use upload::UploadCmd;

use crate::output;
use anyhow::Result;
use shardfs_storage::{BackendGateway, Entry, StorageDriver, Tenant};

/// Everything a command needs: a driver, the tenant it acts for, and how
/// to print results
pub struct Session<G: BackendGateway> {
    pub driver: StorageDriver<G>,
    pub tenant: Tenant,
    pub json: bool,
}

impl<G: BackendGateway> Session<G> {
    pub fn new(driver: StorageDriver<G>, tenant: Tenant, json: bool) -> Self {
        Session {
            driver,
            tenant,
            json,
        }
    }

    /// Report a single-entry result
    pub(crate) fn report(&self, verb: &str, entry: &Entry) -> Result<()> {
        if self.json {
            return output::json(entry);
        }
        let what = if entry.is_folder() { "folder" } else { "file" };
        output::success(&format!("{verb} {what} {}", entry.name));
        Ok(())
    }
}
