// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the batch printer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BatchPrintError, Result};

/// File extension accepted by the queue (compared case-insensitively).
pub const PDF_EXTENSION: &str = "pdf";

/// Whether `path` names a PDF by extension (`.pdf`, `.PDF`, `.Pdf`, ...).
///
/// A file named just `.pdf` is a dotfile with no extension, so it is rejected.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

/// Unique identifier for one print run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a queued document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Added to the list, not attempted yet.
    Pending,
    /// Handed to a job thread, waiting for the spooler.
    Printing,
    /// Spooler reported the submission finished.
    Printed,
    /// Load, submission, or spooler signalling failed.
    Failed,
}

impl ItemStatus {
    /// Text shown in the status column of the list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "",
            Self::Printing => "Printing...",
            Self::Printed => "Printed",
            Self::Failed => "Failed",
        }
    }

    /// Whether an attempt has finished for this item.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Printed | Self::Failed)
    }
}

/// One row of the print list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintableItem {
    pub path: PathBuf,
    pub selected: bool,
    pub status: ItemStatus,
}

impl PrintableItem {
    /// A freshly added row: selected, pending.
    ///
    /// Rejects anything that is not a `.pdf` path.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() || !is_pdf_path(&path) {
            return Err(BatchPrintError::NotAPdf(path.display().to_string()));
        }
        Ok(Self {
            path,
            selected: true,
            status: ItemStatus::Pending,
        })
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of printing a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    /// The reason is for logs only; the row just says "Failed".
    Failure { reason: String },
}

impl Outcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Status the row takes once this outcome is known.
    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Success => ItemStatus::Printed,
            Self::Failure { .. } => ItemStatus::Failed,
        }
    }
}

/// Opaque printer settings blob produced by the configuration dialog
/// (paper size, duplex, tray, ...). The core never looks inside it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMode(Vec<u8>);

impl DeviceMode {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeviceMode({} bytes)", self.0.len())
    }
}

/// Printer plus the device mode chosen for one run.
///
/// Immutable once built; shared with job threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintConfiguration {
    printer: String,
    device_mode: Arc<DeviceMode>,
}

impl PrintConfiguration {
    pub fn new(printer: impl Into<String>, device_mode: DeviceMode) -> Self {
        Self {
            printer: printer.into(),
            device_mode: Arc::new(device_mode),
        }
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    pub fn device_mode(&self) -> &DeviceMode {
        &self.device_mode
    }
}

/// What happened during one run, reported when the run returns to idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub printer: String,
    pub printed: usize,
    pub failed: usize,
    /// Unselected rows passed over by the cursor.
    pub skipped: usize,
    /// True when a stop request ended the run before the end of the list.
    pub stopped_early: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// User-visible informational messages that are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Print was pressed with nothing ticked.
    NoFilesSelected,
    /// The configuration dialog was dismissed; nothing was printed.
    ConfigurationCancelled,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoFilesSelected => {
                "There are no files selected to print.\nPlease drag n' drop some files into the list box above."
            }
            Self::ConfigurationCancelled => "Printing was cancelled. No files were printed.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf_path(Path::new("x.pdf")));
        assert!(is_pdf_path(Path::new("Z.PDF")));
        assert!(is_pdf_path(Path::new("/docs/Report.Pdf")));
        assert!(!is_pdf_path(Path::new("y.txt")));
        assert!(!is_pdf_path(Path::new("pdf")));
        assert!(!is_pdf_path(Path::new("archive.pdf.zip")));
    }

    #[test]
    fn bare_dot_pdf_name_is_not_a_pdf() {
        assert!(!is_pdf_path(Path::new(".pdf")));
        assert!(!is_pdf_path(Path::new("/docs/.PDF")));
        assert!(is_pdf_path(Path::new("/docs/..pdf")));
        assert!(PrintableItem::new(".pdf").is_err());
    }

    #[test]
    fn new_item_is_selected_and_pending() {
        let item = PrintableItem::new("/tmp/a.pdf").expect("pdf accepted");
        assert!(item.selected);
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.display_name(), "a.pdf");
    }

    #[test]
    fn new_item_rejects_non_pdf_and_empty() {
        assert!(matches!(
            PrintableItem::new("notes.txt"),
            Err(BatchPrintError::NotAPdf(_))
        ));
        assert!(matches!(
            PrintableItem::new(""),
            Err(BatchPrintError::NotAPdf(_))
        ));
    }

    #[test]
    fn outcome_maps_to_terminal_status() {
        assert_eq!(Outcome::Success.status(), ItemStatus::Printed);
        assert_eq!(Outcome::failure("jam").status(), ItemStatus::Failed);
        assert!(Outcome::Success.status().is_terminal());
        assert!(!ItemStatus::Printing.is_terminal());
    }

    #[test]
    fn status_labels_match_row_text() {
        assert_eq!(ItemStatus::Pending.label(), "");
        assert_eq!(ItemStatus::Printing.label(), "Printing...");
        assert_eq!(ItemStatus::Printed.label(), "Printed");
        assert_eq!(ItemStatus::Failed.label(), "Failed");
    }

    #[test]
    fn device_mode_debug_hides_contents() {
        let dm = DeviceMode::new(vec![1, 2, 3]);
        assert_eq!(format!("{dm:?}"), "DeviceMode(3 bytes)");
    }
}
