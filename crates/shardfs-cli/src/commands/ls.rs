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
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use shardfs_storage::BackendGateway;

/// List a folder
#[derive(Args, Debug)]
pub struct LsCmd {
    /// Folder to list (the tenant root when omitted)
    #[arg(default_value = "/")]
    pub path: String,
}

impl LsCmd {
    pub async fn execute<G: BackendGateway>(&self, session: &Session<G>) -> Result<()> {
        let entries = session
            .driver
            .list_directory(&session.tenant, &self.path)
            .await
            .with_context(|| format!("cannot list {}", self.path))?;

        if session.json {
            return output::json(&entries);
        }
        if entries.is_empty() {
            output::info(&format!("{} is empty", self.path));
        }
        for entry in &entries {
            output::entry(entry);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::session;

    #[tokio::test]
    async fn test_ls_fresh_tenant_root() {
        let (session, _) = session();
        LsCmd {
            path: "/".to_string(),
        }
        .execute(&session)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_ls_missing_folder_fails() {
        let (session, _) = session();
        let err = LsCmd {
            path: "nope".to_string(),
        }
        .execute(&session)
        .await
        .unwrap_err();
        assert!(err.to_string().contains("cannot list nope"));
    }
}
