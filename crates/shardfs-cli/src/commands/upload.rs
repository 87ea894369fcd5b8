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

/// Start a multipart upload session
#[derive(Args, Debug)]
pub struct UploadCmd {}

impl UploadCmd {
    pub async fn execute<G: BackendGateway>(&self, session: &Session<G>) -> Result<()> {
        let upload = session
            .driver
            .start_multipart_upload(&session.tenant)
            .await
            .context("cannot start multipart upload")?;

        if session.json {
            return output::json(&upload);
        }
        output::success("multipart upload started");
        output::detail("Session", &upload.id);
        output::detail("Staging path", &upload.object_path);
        Ok(())
    }
}
