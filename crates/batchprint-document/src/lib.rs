// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// batchprint-document — PDF handling for the batch printer.
//
// Opening a document before it is submitted catches missing, truncated, and
// non-PDF files so they fail their row instead of reaching the spooler.

pub mod pdf;

pub use pdf::reader::PdfDocument;
