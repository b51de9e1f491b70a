// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Prints one document and waits for the spooler to finish with it.
//
// Runs on a dedicated job thread. Every failure (unreadable PDF, rejected
// submission, spooler error, dropped completion signal) becomes
// `Outcome::Failure`; nothing here is fatal to the queue.

use std::path::Path;
use std::sync::Arc;

use batchprint_bridge::{CompletionSignal, PrintRequest, PrintSpooler};
use batchprint_core::types::{Outcome, PrintConfiguration};
use batchprint_document::PdfDocument;
use tracing::{debug, instrument, warn};

/// Prints a single document synchronously.
pub trait JobRunner: Send + Sync {
    /// Blocks until the document has been spooled or has failed.
    fn run(&self, path: &Path, config: &PrintConfiguration) -> Outcome;
}

/// [`JobRunner`] that validates the PDF and submits it to a [`PrintSpooler`].
pub struct PrintJobRunner<S: ?Sized> {
    spooler: Arc<S>,
}

impl<S: ?Sized> PrintJobRunner<S> {
    pub fn new(spooler: Arc<S>) -> Self {
        Self { spooler }
    }
}

impl<S> JobRunner for PrintJobRunner<S>
where
    S: PrintSpooler + Send + Sync + ?Sized,
{
    #[instrument(skip(self, config), fields(path = %path.display(), printer = config.printer()))]
    fn run(&self, path: &Path, config: &PrintConfiguration) -> Outcome {
        let document = match PdfDocument::open(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "document could not be loaded");
                return Outcome::failure(e.to_string());
            }
        };

        let request = PrintRequest {
            path: path.to_path_buf(),
            job_title: document.job_title(),
            page_count: document.page_count(),
        };

        let (signal, waiter) = CompletionSignal::channel();
        if let Err(e) = self.spooler.submit(&request, config, signal) {
            warn!(error = %e, "spooler rejected the document");
            return Outcome::failure(e.to_string());
        }

        debug!("waiting for spooler completion");
        match waiter.wait() {
            Ok(()) => Outcome::Success,
            Err(e) => {
                warn!(error = %e, "spooler reported failure");
                Outcome::failure(e.to_string())
            }
        }
    }
}
