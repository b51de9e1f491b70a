// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open a queued file with `lopdf` and check it is a printable
// document before handing it to the spooler.

use std::path::{Path, PathBuf};

use batchprint_core::error::BatchPrintError;
use lopdf::Document;
use tracing::{debug, info, instrument};

/// A PDF that parsed successfully and has at least one page.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    /// Source path, if opened from a file.
    source_path: Option<PathBuf>,
    page_count: usize,
    /// `/Title` from the info dictionary, when present.
    title: Option<String>,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BatchPrintError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            BatchPrintError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        let mut pdf = Self::inspect(&document)?;
        pdf.source_path = Some(path_ref.to_path_buf());
        Ok(pdf)
    }

    /// Load a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, BatchPrintError> {
        let document = Document::load_mem(data).map_err(|err| {
            BatchPrintError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        Self::inspect(&document)
    }

    fn inspect(document: &Document) -> Result<Self, BatchPrintError> {
        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(BatchPrintError::PdfError("document has no pages".into()));
        }

        let title = read_title(document);
        debug!(pages = page_count, title = ?title, "PDF loaded");

        Ok(Self {
            source_path: None,
            page_count,
            title,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Return the source path if the document was created via [`PdfDocument::open`].
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Name for the spooler's job list: the document title, else the file name.
    pub fn job_title(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.trim().to_string();
        }
        self.source_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".into())
    }
}

/// Read `/Info /Title` if it is a plain literal string.
fn read_title(document: &Document) -> Option<String> {
    let info_id = document.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = document.get_dictionary(info_id).ok()?;
    let raw = info.get(b"Title").ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(raw).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    #[test]
    fn open_counts_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("three.pdf");
        fixtures::write_blank_pdf(&path, 3).expect("write fixture");

        let pdf = PdfDocument::open(&path).expect("open");
        assert_eq!(pdf.page_count(), 3);
        assert_eq!(pdf.source_path(), Some(path.as_path()));
        assert_eq!(pdf.job_title(), "three.pdf");
    }

    #[test]
    fn from_bytes_reads_title() {
        let bytes = fixtures::blank_pdf_with_title(1, "Quarterly Report").expect("fixture");
        let pdf = PdfDocument::from_bytes(&bytes).expect("load");
        assert_eq!(pdf.title(), Some("Quarterly Report"));
        assert_eq!(pdf.job_title(), "Quarterly Report");
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        let result = PdfDocument::from_bytes(b"this is not a pdf");
        assert!(matches!(result, Err(BatchPrintError::PdfError(_))));
    }

    #[test]
    fn missing_file_is_a_pdf_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = PdfDocument::open(dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(BatchPrintError::PdfError(_))));
    }

    #[test]
    fn zero_pages_is_rejected() {
        let bytes = fixtures::blank_pdf(0).expect("fixture");
        let result = PdfDocument::from_bytes(&bytes);
        assert!(matches!(result, Err(BatchPrintError::PdfError(_))));
    }
}
