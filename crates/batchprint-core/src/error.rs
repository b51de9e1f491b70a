// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for batchprint.

use thiserror::Error;

/// Top-level error type for all batchprint operations.
#[derive(Debug, Error)]
pub enum BatchPrintError {
    // -- Queue errors --
    #[error("not a PDF file: {0}")]
    NotAPdf(String),

    #[error("a print run is already active")]
    RunActive,

    #[error("no files selected to print")]
    NoSelection,

    #[error("row {index} out of range (queue has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    // -- Printer errors --
    #[error("no printer selected")]
    NoPrinterSelected,

    #[error("printer not installed: {0}")]
    PrinterNotFound(String),

    #[error("print spooler error: {0}")]
    Spooler(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Coordinator --
    #[error("queue service has stopped")]
    ServiceStopped,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BatchPrintError>;
