// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — loading and inspecting documents before they are printed.

pub mod reader;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use reader::PdfDocument;
