// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for bento-mirror.
//!
//! Each concern has its own enum. Only some of them are fatal to a run:
//!
//! - [`VersionError`] - bad requirement string, aborts selection
//! - [`EntryError`] - unrecognized artifact name, the record is skipped
//! - [`ListingError`] - the bucket listing could not be fetched or parsed, aborts the run
//! - [`TransferError`] - one download failed, reported and the run continues
//! - [`SyncError`] - local filesystem failure while replacing an artifact, aborts the run
//!
//! [`format_error`] renders a fatal error with causes and fixes for the CLI.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from parsing versions and requirements.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("malformed version {0:?}")]
    MalformedVersion(String),

    #[error("malformed version constraint {clause:?} in {constraint:?}")]
    MalformedConstraint { constraint: String, clause: String },
}

/// A listing key that does not follow the artifact naming pattern.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("unrecognized artifact name {0:?}")]
    UnrecognizedArtifactName(String),
}

/// Errors from the listing collaborator.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("failed to request bucket listing from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bucket listing at {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse bucket listing: {0}")]
    Parse(#[from] quick_xml::DeError),
}

/// Errors from the transfer collaborator. These are never fatal.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("failed to write download: {0}")]
    Io(#[from] io::Error),
}

/// Fatal errors from synchronizing a target.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to replace {path:?}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("filesystem error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> SyncError {
        let path = path.into();
        move |source| SyncError::Io { path, source }
    }
}

/// Formats an error message with title, causes and fixes.
///
/// # Example
///
/// ```
/// use bento_mirror::error::format_error;
///
/// let error = format_error(
///     "Failed to fetch the bucket listing",
///     &["Bucket URL is wrong", "Network is down"],
///     &["Check bucket_url in ~/.bento-mirror/config.json"],
/// );
/// assert!(error.contains("Possible causes:"));
/// ```
pub fn format_error(title: &str, causes: &[&str], fixes: &[&str]) -> String {
    let mut output = format!("[✗] {}\n", title);

    if !causes.is_empty() {
        output.push_str("\nPossible causes:\n");
        for cause in causes {
            output.push_str(&format!("  - {}\n", cause));
        }
    }

    if !fixes.is_empty() {
        output.push_str("\nTry these fixes:\n");
        for (i, fix) in fixes.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, fix));
        }
    }

    output.push_str("\nRe-run with RUST_LOG=debug for details.");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        let error = format_error("Test Error", &["Cause 1", "Cause 2"], &["Fix 1", "Fix 2"]);

        assert!(error.starts_with("[✗] Test Error"));
        assert!(error.contains("  - Cause 1"));
        assert!(error.contains("  - Cause 2"));
        assert!(error.contains("  1. Fix 1"));
        assert!(error.contains("  2. Fix 2"));
        assert!(error.ends_with("RUST_LOG=debug for details."));
    }

    #[test]
    fn test_empty_causes_and_fixes() {
        let error = format_error("Empty test", &[], &[]);
        assert!(error.contains("[✗] Empty test"));
        assert!(!error.contains("Possible causes:"));
        assert!(!error.contains("Try these fixes:"));
    }

    #[test]
    fn test_error_messages() {
        let err = VersionError::MalformedConstraint {
            constraint: "~> x".into(),
            clause: "~> x".into(),
        };
        assert_eq!(err.to_string(), "malformed version constraint \"~> x\" in \"~> x\"");
        assert_eq!(TransferError::Status(404).to_string(), "server returned HTTP 404");
    }
}
