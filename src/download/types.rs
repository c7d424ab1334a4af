// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Result types for box synchronization.

use std::fmt;
use std::path::Path;

use crate::catalog::CatalogEntry;

/// Result of synchronizing one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local copy already matches the remote fingerprint
    UpToDate,
    /// Box was downloaded and replaced
    Downloaded { bytes: u64 },
    /// Transfer failed; the old copy (if any) was left in place
    Failed { reason: String },
    /// Dry run, nothing was checked or transferred
    Skipped,
}

impl SyncOutcome {
    /// Returns true if the transfer failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Progress notifications emitted during a synchronization pass.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    /// About to process `entry`, stored locally at `path`
    Started {
        entry: &'a CatalogEntry,
        path: &'a Path,
    },
    /// Finished processing `entry`
    Finished {
        entry: &'a CatalogEntry,
        outcome: &'a SyncOutcome,
    },
}

/// Counts of outcomes over a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub up_to_date: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Bytes written by successful transfers
    pub bytes: u64,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::UpToDate => self.up_to_date += 1,
            SyncOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            SyncOutcome::Failed { .. } => self.failed += 1,
            SyncOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.up_to_date + self.downloaded + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} boxes: {} downloaded, {} up to date, {} failed",
            self.total(),
            self.downloaded,
            self.up_to_date,
            self.failed
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}
