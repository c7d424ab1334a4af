// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory transfer double for unit tests.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;

use super::transfer::Transfer;
use crate::error::TransferError;

#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeMode {
    /// Write the body and succeed
    Succeed(&'static str),
    /// Fail with HTTP 404 before writing anything
    Fail,
    /// Write a partial body, then fail with HTTP 500
    FailAfterWriting(&'static str),
}

#[derive(Debug)]
pub(crate) struct FakeTransfer {
    mode: FakeMode,
    calls: Cell<usize>,
    urls: RefCell<Vec<String>>,
}

impl FakeTransfer {
    pub(crate) fn new(mode: FakeMode) -> Self {
        Self {
            mode,
            calls: Cell::new(0),
            urls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
}

impl Transfer for FakeTransfer {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        self.calls.set(self.calls.get() + 1);
        self.urls.borrow_mut().push(url.to_string());

        match self.mode {
            FakeMode::Succeed(body) => {
                fs::write(dest, body)?;
                Ok(body.len() as u64)
            }
            FakeMode::Fail => Err(TransferError::Status(404)),
            FakeMode::FailAfterWriting(body) => {
                fs::write(dest, body)?;
                Err(TransferError::Status(500))
            }
        }
    }
}
