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

//! HTTP signature authentication
//!
//! Every request carries a `date` header and an `authorization` header
//! signing it with the account's RSA key:
//!
//! ```text
//! Signature keyId="/<user>/keys/<fingerprint>",algorithm="rsa-sha256",headers="date",signature="<base64>"
//! ```

use crate::error::{StorageError, StorageResult};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey};
use std::fmt;

/// Signs request dates with an RSA private key
pub struct RequestSigner {
    key_id: String,
    key: EncodingKey,
}

impl RequestSigner {
    /// Build a signer from PEM key material.
    ///
    /// The key is exercised once so that unusable material is rejected here
    /// rather than on the first request.
    pub fn from_pem(user: &str, key_id: &str, pem: &str) -> StorageResult<Self> {
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| StorageError::invalid_key_material(format!("cannot parse private key: {e}")))?;
        let signer = RequestSigner {
            key_id: format!("/{user}/keys/{key_id}"),
            key,
        };
        signer.sign(b"date: probe")?;
        Ok(signer)
    }

    /// Key identifier sent with every signature
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// RSA-SHA256 signature of `message`, standard base64
    pub fn sign(&self, message: &[u8]) -> StorageResult<String> {
        let signature = jsonwebtoken::crypto::sign(message, &self.key, Algorithm::RS256)
            .map_err(|e| StorageError::invalid_key_material(format!("signing failed: {e}")))?;
        let raw = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| StorageError::invalid_key_material(format!("malformed signature: {e}")))?;
        Ok(STANDARD.encode(raw))
    }

    /// `authorization` header value for a request sent with `date`
    pub fn authorization(&self, date: &str) -> StorageResult<String> {
        let signature = self.sign(format!("date: {date}").as_bytes())?;
        Ok(format!(
            "Signature keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"date\",signature=\"{}\"",
            self.key_id, signature
        ))
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// RFC 7231 date, as sent in the `date` header
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
