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
use anyhow::{anyhow, Context, Result};
use clap::Args;
use futures::TryStreamExt;
use serde_json::json;
use shardfs_storage::{BackendGateway, ObjectReader};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Download a file
#[derive(Args, Debug)]
pub struct GetCmd {
    /// File to download
    pub path: String,

    /// Write to this local file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GetCmd {
    pub async fn execute<G: BackendGateway>(&self, session: &Session<G>) -> Result<()> {
        let reader = session
            .driver
            .get_object(&session.tenant, &self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path))?
            .ok_or_else(|| anyhow!("{}: no such file", self.path))?;

        match &self.output {
            Some(target) => {
                let mut file = File::create(target)
                    .await
                    .with_context(|| format!("cannot create {}", target.display()))?;
                let bytes = copy_to(reader, &mut file).await?;
                file.sync_all().await?;

                if session.json {
                    return output::json(&json!({
                        "path": self.path,
                        "output": target,
                        "bytes": bytes,
                    }));
                }
                output::success(&format!(
                    "downloaded {} to {} ({})",
                    self.path,
                    target.display(),
                    output::human_size(bytes)
                ));
            }
            None => {
                let mut stdout = tokio::io::stdout();
                copy_to(reader, &mut stdout).await?;
            }
        }
        Ok(())
    }
}

/// Drain `reader` into `writer`, returning the byte count
async fn copy_to<W: AsyncWrite + Unpin>(mut reader: ObjectReader, writer: &mut W) -> Result<u64> {
    let mut total = 0u64;
    while let Some(chunk) = reader.try_next().await? {
        writer.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::session;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_to_file() {
        let (session, _) = session();
        session
            .driver
            .put_bytes(&session.tenant, "docs/readme.txt", "hello shardfs")
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("readme.txt");
        GetCmd {
            path: "docs/readme.txt".to_string(),
            output: Some(target.clone()),
        }
        .execute(&session)
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(target).unwrap(), "hello shardfs");
    }

    #[tokio::test]
    async fn test_get_missing_file() {
        let (session, _) = session();
        let err = GetCmd {
            path: "absent.txt".to_string(),
            output: None,
        }
        .execute(&session)
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "absent.txt: no such file");
    }
}
