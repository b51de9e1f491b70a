// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory print list.
//
// Rows are addressed by index, matching the visual list. The store itself does
// not know whether a run is active; the coordinator refuses structural changes
// (clear, remove-unselected) while the driver is not idle so that indices stay
// valid for the whole run.

use std::path::PathBuf;

use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{ItemStatus, PrintableItem, is_pdf_path};
use tracing::{debug, info};

/// Ordered list of documents waiting to be printed.
#[derive(Debug, Clone, Default)]
pub struct QueueStore {
    items: Vec<PrintableItem>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one PDF, selected and pending.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<usize> {
        let item = PrintableItem::new(path)?;
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Append every PDF in `paths`, silently skipping everything else.
    ///
    /// Returns how many rows were added.
    pub fn add_many<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.into();
            if !is_pdf_path(&path) {
                debug!(path = %path.display(), "ignoring non-PDF file");
                continue;
            }
            if self.add(path).is_ok() {
                added += 1;
            }
        }
        info!(added, total = self.items.len(), "files added to print list");
        added
    }

    /// Remove every row. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        info!(removed, "print list cleared");
        removed
    }

    /// Remove rows whose checkbox is off. Returns how many were removed.
    pub fn remove_unselected(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.selected);
        let removed = before - self.items.len();
        info!(removed, remaining = self.items.len(), "deselected rows removed");
        removed
    }

    /// Tick or untick one row.
    pub fn toggle(&mut self, index: usize, selected: bool) -> Result<()> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(BatchPrintError::IndexOutOfRange { index, len })?;
        item.selected = selected;
        Ok(())
    }

    pub fn items(&self) -> &[PrintableItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&PrintableItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    // -- Driver-only mutation -------------------------------------------------

    pub(crate) fn set_status(&mut self, index: usize, status: ItemStatus) {
        if let Some(item) = self.items.get_mut(index) {
            item.status = status;
        }
    }

    /// Record a finished attempt: untick the row and set its final status.
    pub(crate) fn complete(&mut self, index: usize, status: ItemStatus) {
        if let Some(item) = self.items.get_mut(index) {
            item.selected = false;
            item.status = status;
        }
    }
}
