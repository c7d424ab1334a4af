// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! bento-mirror - keep local copies of the latest Vagrant boxes
//!
//! Lists a public S3 bucket, picks the best box per OS and bitness for a set
//! of version requirements, and mirrors each pick to local disk:
//!
//! **Listing** -> **Catalog** -> **Selection** -> **Sync**
//!
//! # Core Modules
//!
//! - [`version`] - Dotted versions and requirement clauses (`~>`, `>=`, ...)
//! - [`catalog`] - Bucket listing, catalog entries and best-match selection
//! - [`download`] - Fingerprint-checked, crash-safe box downloads
//! - [`config`] - Bucket URL, destination and box registry
//! - [`error`] - Error types and CLI error formatting

pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod version;

// Re-export commonly used types
pub use catalog::{Bitness, BucketClient, Catalog, CatalogEntry, ListingRecord, ListingSource};
pub use config::{load_config, BoxSpec, Config};
pub use download::{
    DownloadManager, HttpTransfer, SyncEvent, SyncOutcome, SyncSummary, SyncTarget, Transfer,
};
pub use error::{format_error, EntryError, ListingError, SyncError, TransferError, VersionError};
pub use version::{Version, VersionRequirement};
