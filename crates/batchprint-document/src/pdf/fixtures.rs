// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small generated PDFs for tests.

use std::path::Path;

use batchprint_core::error::BatchPrintError;
use lopdf::{Document, Object, Stream, dictionary};

/// A PDF with `pages` empty A4 pages.
pub fn blank_pdf(pages: usize) -> Result<Vec<u8>, BatchPrintError> {
    build(pages, None)
}

/// A PDF with `pages` empty pages and an `/Info /Title`.
pub fn blank_pdf_with_title(pages: usize, title: &str) -> Result<Vec<u8>, BatchPrintError> {
    build(pages, Some(title))
}

/// Write [`blank_pdf`] to `path`.
pub fn write_blank_pdf(path: impl AsRef<Path>, pages: usize) -> Result<(), BatchPrintError> {
    let bytes = blank_pdf(pages)?;
    std::fs::write(path.as_ref(), bytes)?;
    Ok(())
}

fn build(pages: usize, title: Option<&str>) -> Result<Vec<u8>, BatchPrintError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| BatchPrintError::PdfError(format!("failed to serialise fixture: {err}")))?;
    Ok(output)
}
