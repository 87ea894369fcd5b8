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
use bytes::Bytes;
use clap::Args;
use shardfs_storage::{BackendGateway, Entry};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Read size for uploads
const CHUNK_SIZE: usize = 256 * 1024;

/// Upload a file, replacing any existing one
#[derive(Args, Debug)]
pub struct PutCmd {
    /// Destination path
    pub path: String,

    /// Local file to upload (stdin when omitted)
    pub file: Option<PathBuf>,
}

impl PutCmd {
    pub async fn execute<G: BackendGateway>(&self, session: &Session<G>) -> Result<()> {
        let mut input: Box<dyn AsyncRead + Unpin + Send> = match &self.file {
            Some(file) => Box::new(
                File::open(file)
                    .await
                    .with_context(|| format!("cannot open {}", file.display()))?,
            ),
            None => Box::new(tokio::io::stdin()),
        };

        let mut writer = session
            .driver
            .put_object(&session.tenant, &self.path)
            .await
            .with_context(|| format!("cannot write {}", self.path))?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = input.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            writer.write(Bytes::copy_from_slice(&buf[..n])).await?;
            total += n as u64;
        }
        writer
            .close()
            .await
            .with_context(|| format!("upload of {} was not accepted", self.path))?;
        debug!(path = %self.path, bytes = total, "upload complete");

        session.report("uploaded", &Entry::file(self.path.as_str()).with_size(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{resolved, session};
    use std::io::Write;

    #[tokio::test]
    async fn test_put_from_file() {
        let (session, gateway) = session();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let payload = vec![7u8; CHUNK_SIZE + 10];
        file.write_all(&payload).unwrap();

        PutCmd {
            path: "blobs/big.bin".to_string(),
            file: Some(file.path().to_path_buf()),
        }
        .execute(&session)
        .await
        .unwrap();

        let stored = gateway
            .object(&resolved(&session, "blobs/big.bin"))
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_put_missing_local_file() {
        let (session, gateway) = session();
        let err = PutCmd {
            path: "x.txt".to_string(),
            file: Some(PathBuf::from("/nonexistent/x.txt")),
        }
        .execute(&session)
        .await
        .unwrap_err();

        assert!(err.to_string().starts_with("cannot open"));
        assert!(gateway.calls().await.is_empty());
    }
}
