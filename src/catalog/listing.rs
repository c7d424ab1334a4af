// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bucket listing client.
//!
//! Fetches an S3 `ListBucketResult` document and extracts the `(Key, ETag)`
//! pair of every `Contents` record that looks like a VirtualBox box.
//!
//! # Example
//!
//! ```no_run
//! use bento_mirror::catalog::listing::{BucketClient, ListingSource};
//! use bento_mirror::config::Config;
//!
//! let config = Config::default();
//! let client = BucketClient::new(&config.bucket_url, config.http_client()?);
//! for record in client.fetch_listing()? {
//!     println!("{} {}", record.key, record.fingerprint);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ListingError;

/// Only keys under this prefix are considered.
pub const BOX_PREFIX: &str = "vagrant/virtualbox/";

/// Only keys with this suffix are considered.
pub const BOX_SUFFIX: &str = ".box";

/// One `(key, fingerprint)` pair from the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub key: String,
    pub fingerprint: String,
}

impl ListingRecord {
    pub fn new(key: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

/// Anything that can produce the raw bucket listing.
pub trait ListingSource {
    fn fetch_listing(&self) -> Result<Vec<ListingRecord>, ListingError>;
}

#[derive(Debug, Deserialize)]
struct ListBucketResult {
    #[serde(rename = "Contents", default)]
    contents: Vec<Contents>,
}

#[derive(Debug, Deserialize)]
struct Contents {
    #[serde(rename = "Key")]
    key: Option<String>,
    #[serde(rename = "ETag")]
    etag: Option<String>,
}

/// Parse a listing document into box records.
///
/// Records without a key or fingerprint, and keys outside
/// [`BOX_PREFIX`]/[`BOX_SUFFIX`], are dropped.
pub fn parse_listing(body: &str) -> Result<Vec<ListingRecord>, ListingError> {
    let document: ListBucketResult = quick_xml::de::from_str(body)?;

    let records = document
        .contents
        .into_iter()
        .filter_map(|contents| match (contents.key, contents.etag) {
            (Some(key), Some(etag)) => Some(ListingRecord::new(key, etag)),
            (key, _) => {
                tracing::debug!("Skipping incomplete listing record (key: {:?})", key);
                None
            }
        })
        .filter(|record| record.key.starts_with(BOX_PREFIX) && record.key.ends_with(BOX_SUFFIX))
        .collect();

    Ok(records)
}

/// Blocking HTTP client for a public bucket.
#[derive(Debug, Clone)]
pub struct BucketClient {
    /// Bucket endpoint, without trailing slash.
    base_url: String,
    client: Client,
}

impl BucketClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ListingSource for BucketClient {
    /// Issues a single GET against the bucket root. Truncated listings are
    /// not followed.
    fn fetch_listing(&self) -> Result<Vec<ListingRecord>, ListingError> {
        let url = format!("{}/", self.base_url);
        let request_error = |source| ListingError::Request {
            url: url.clone(),
            source,
        };

        tracing::debug!("Fetching bucket listing from {}", url);
        let response = self.client.get(&url).send().map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(request_error)?;
        let records = parse_listing(&body)?;
        tracing::info!("Bucket listing has {} box records", records.len());
        Ok(records)
    }
}
