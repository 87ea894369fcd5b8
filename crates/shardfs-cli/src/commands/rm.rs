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

use super::Session;
use anyhow::{Context, Result};
use clap::Args;
use shardfs_storage::BackendGateway;

/// Delete a file or an empty folder
#[derive(Args, Debug)]
pub struct RmCmd {
    /// Path to delete
    pub path: String,
}

impl RmCmd {
    pub async fn execute<G: BackendGateway>(&self, session: &Session<G>) -> Result<()> {
        let entry = session
            .driver
            .delete_object(&session.tenant, &self.path)
            .await
            .with_context(|| format!("cannot delete {}", self.path))?;
        session.report("deleted", &entry)
    }
}
