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
use shardfs_storage::{BackendGateway, StorageError};

/// Move (rename) a single file
#[derive(Args, Debug)]
pub struct MvCmd {
    /// File to move
    pub src: String,

    /// Destination path
    pub dst: String,
}

impl MvCmd {
    pub async fn execute<G: BackendGateway>(&self, session: &Session<G>) -> Result<()> {
        let result = session
            .driver
            .move_object(&session.tenant, &self.src, &self.dst)
            .await;

        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                if let StorageError::PartialMove {
                    source_path,
                    dest_path,
                    ..
                } = &err
                {
                    output::warning(&format!(
                        "{dest_path} was created but {source_path} is still present; remove one of them"
                    ));
                }
                return Err(err)
                    .with_context(|| format!("cannot move {} to {}", self.src, self.dst));
            }
        };
        session.report("moved to", &entry)
    }
}
