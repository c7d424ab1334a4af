// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Box synchronization for bento-mirror
//!
//! This module keeps local copies of selected boxes in step with the bucket:
//! - Freshness is decided from a sidecar fingerprint file, without any request
//! - Downloads land in a hidden temp file and are renamed into place
//! - Failed transfers are reported and leave the previous copy untouched
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │ DownloadManager │────▶│ SyncTarget      │ (one per entry)
//! │ (sequential)    │     │ box + sidecar   │
//! └─────────────────┘     └────────┬────────┘
//!                                  │
//!                                  ▼
//!                         ┌─────────────────┐
//!                         │ Transfer        │
//!                         │ (HttpTransfer)  │
//!                         └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use bento_mirror::catalog::{BucketClient, Catalog};
//! use bento_mirror::config::Config;
//! use bento_mirror::download::{DownloadManager, HttpTransfer};
//!
//! let config = Config::default();
//! let client = config.http_client()?;
//!
//! let catalog = Catalog::fetch(&BucketClient::new(&config.bucket_url, client.clone()))?;
//! let selected = catalog.select(&config.boxes)?;
//!
//! let manager = DownloadManager::new(HttpTransfer::new(client), &config.bucket_url, &config.destination);
//! let summary = manager.run(&selected)?;
//! println!("{}", summary);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod manager;
pub mod target;
pub mod transfer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use manager::DownloadManager;
pub use target::SyncTarget;
pub use transfer::{HttpTransfer, Transfer};
pub use types::{SyncEvent, SyncOutcome, SyncSummary};
