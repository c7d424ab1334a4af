// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Sequential synchronization pass over selected boxes.

use std::path::PathBuf;

use super::target::SyncTarget;
use super::transfer::Transfer;
use super::types::{SyncEvent, SyncOutcome, SyncSummary};
use crate::catalog::CatalogEntry;
use crate::error::SyncError;

/// Synchronizes selected entries one at a time, in the order given.
///
/// A failed transfer is recorded and the pass moves on. Local filesystem
/// errors abort the pass.
#[derive(Debug)]
pub struct DownloadManager<T> {
    transfer: T,
    base_url: String,
    destination: PathBuf,
    dry_run: bool,
}

impl<T: Transfer> DownloadManager<T> {
    pub fn new(transfer: T, base_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            transfer,
            base_url: base_url.into(),
            destination: destination.into(),
            dry_run: false,
        }
    }

    /// List only: report every entry as skipped without touching disk.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn target(&self, entry: &CatalogEntry) -> SyncTarget {
        SyncTarget::new(entry.clone(), &self.base_url, &self.destination)
    }

    pub fn run(&self, entries: &[CatalogEntry]) -> Result<SyncSummary, SyncError> {
        self.run_with_progress(entries, |_| {})
    }

    /// Run the pass, calling `on_event` before and after each entry.
    pub fn run_with_progress<F>(
        &self,
        entries: &[CatalogEntry],
        mut on_event: F,
    ) -> Result<SyncSummary, SyncError>
    where
        F: FnMut(SyncEvent<'_>),
    {
        let mut summary = SyncSummary::default();

        for entry in entries {
            let target = self.target(entry);
            on_event(SyncEvent::Started {
                entry: target.entry(),
                path: target.path(),
            });

            let outcome = if self.dry_run {
                SyncOutcome::Skipped
            } else {
                target.run(&self.transfer)?
            };

            summary.record(&outcome);
            on_event(SyncEvent::Finished {
                entry: target.entry(),
                outcome: &outcome,
            });
        }

        tracing::info!("Sync pass finished: {}", summary);
        Ok(summary)
    }
}
