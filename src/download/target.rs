// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Crash-safe synchronization of one selected box.
//!
//! A box at `<destination>/<key>` has a sidecar `<destination>/<key>.fingerprint`
//! holding the fingerprint of the copy on disk. A target is fresh when both
//! files exist and the sidecar matches the catalog fingerprint exactly.
//!
//! Stale targets are downloaded to a hidden `.tmp.<name>` file in the same
//! directory and renamed over the box, so the box path never holds a partial
//! file. The sidecar is written only after the rename succeeds.
//!
//! ```text
//! stale --fresh?--> done
//!   └──> downloading --ok--> replacing --ok--> fingerprint written --> done
//!            └──fail--> cleanup --> done (Failed)
//!                          replacing --fail--> cleanup --> SyncError::Replace
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use super::transfer::Transfer;
use super::types::SyncOutcome;
use crate::catalog::CatalogEntry;
use crate::error::SyncError;

/// Extension appended to the box path for the sidecar file.
pub const FINGERPRINT_SUFFIX: &str = ".fingerprint";

/// Prefix of the in-progress download next to the box.
pub const TEMP_PREFIX: &str = ".tmp.";

/// A selected catalog entry and the local files it owns.
#[derive(Debug)]
pub struct SyncTarget {
    entry: CatalogEntry,
    url: String,
    path: PathBuf,
    fingerprint_path: PathBuf,
    /// Computed on first use and reused for the lifetime of the target
    fresh: OnceCell<bool>,
}

impl SyncTarget {
    /// Target for `entry`, downloaded from `base_url` into `destination`.
    pub fn new(entry: CatalogEntry, base_url: &str, destination: &Path) -> Self {
        let url = entry.url(base_url);
        let path = destination.join(entry.remote_path());

        let mut sidecar = path.clone().into_os_string();
        sidecar.push(FINGERPRINT_SUFFIX);

        Self {
            entry,
            url,
            path,
            fingerprint_path: PathBuf::from(sidecar),
            fresh: OnceCell::new(),
        }
    }

    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Final location of the box.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fingerprint_path(&self) -> &Path {
        &self.fingerprint_path
    }

    /// Hidden download path in the box's directory, so the final rename never
    /// crosses a filesystem boundary.
    pub fn temp_path(&self) -> PathBuf {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        dir.join(format!("{}{}", TEMP_PREFIX, self.entry.filename()))
    }

    /// True iff the box exists and its sidecar holds exactly the entry's
    /// fingerprint. Checked once per target.
    pub fn is_fresh(&self) -> bool {
        *self.fresh.get_or_init(|| {
            self.path.is_file()
                && fs::read_to_string(&self.fingerprint_path)
                    .map(|recorded| recorded == self.entry.fingerprint())
                    .unwrap_or(false)
        })
    }

    /// Bring the local copy up to date.
    ///
    /// Transfer failures are reported as [`SyncOutcome::Failed`]: the partial
    /// download and the sidecar are removed and the old box is left alone.
    ///
    /// # Errors
    ///
    /// [`SyncError::Replace`] if the downloaded file cannot be renamed over the
    /// box, [`SyncError::Io`] for other local filesystem failures.
    pub fn run(&self, transfer: &dyn Transfer) -> Result<SyncOutcome, SyncError> {
        if self.is_fresh() {
            tracing::debug!("{} is up to date", self.entry);
            return Ok(SyncOutcome::UpToDate);
        }

        self.ensure_directory()?;

        let temp_path = self.temp_path();
        tracing::info!("Downloading {} from {}", self.entry, self.url);

        match transfer.fetch(&self.url, &temp_path) {
            Ok(bytes) => {
                if let Err(source) = fs::rename(&temp_path, &self.path) {
                    discard(&temp_path);
                    return Err(SyncError::Replace {
                        path: self.path.clone(),
                        source,
                    });
                }
                self.save_fingerprint()?;
                tracing::info!("Replaced {} ({} bytes)", self.path.display(), bytes);
                Ok(SyncOutcome::Downloaded { bytes })
            }
            Err(e) => {
                tracing::debug!("Failed to download {}: {}", self.entry, e);
                discard(&temp_path);
                // Force a re-check on the next run
                discard(&self.fingerprint_path);
                Ok(SyncOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn ensure_directory(&self) -> Result<(), SyncError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(SyncError::io(dir))
            }
            _ => Ok(()),
        }
    }

    fn save_fingerprint(&self) -> Result<(), SyncError> {
        self.ensure_directory()?;
        fs::write(&self.fingerprint_path, self.entry.fingerprint())
            .map_err(SyncError::io(&self.fingerprint_path))
    }
}

/// Remove `path` if present. Failures are logged, not raised.
fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}
