// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Byte transfer from the bucket to a local file.

use std::fs::File;
use std::path::Path;

use reqwest::blocking::Client;

use crate::error::TransferError;

/// Fetches a URL into a file.
pub trait Transfer {
    /// Download `url` into `dest`, creating or truncating it. Returns the
    /// number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError>;
}

/// [`Transfer`] over blocking HTTP. Redirects are followed.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transfer for HttpTransfer {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        tracing::debug!("GET {} -> {}", url, dest.display());
        let mut response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status.as_u16()));
        }

        let mut file = File::create(dest)?;
        let bytes = response.copy_to(&mut file)?;

        // Data must be on disk before the caller renames over the old copy
        file.sync_all()?;
        Ok(bytes)
    }
}
