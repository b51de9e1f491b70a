// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error messages for the modal dialogs.
//
// Errors never reach the user as Debug output; every variant maps to a short
// heading and a suggestion.

use crate::error::BatchPrintError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational; nothing went wrong, the action just did not apply.
    Info,
    /// User must do something (pick a printer, wait for the run).
    ActionRequired,
    /// Cannot be fixed by the user from inside the app.
    Permanent,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (dialog title / heading).
    pub message: String,
    /// What the user should try (dialog body).
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: impl Into<String>, suggestion: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity,
        }
    }
}

/// Convert a `BatchPrintError` into a `HumanError`.
pub fn humanize_error(err: &BatchPrintError) -> HumanError {
    match err {
        BatchPrintError::NotAPdf(path) => HumanError::new(
            "Only PDF files can be added.",
            format!("Save the document as a PDF first. ({path})"),
            Severity::Info,
        ),

        BatchPrintError::RunActive => HumanError::new(
            "Printing is still in progress.",
            "Wait for the list to finish, or press Stop and wait for the current file.",
            Severity::ActionRequired,
        ),

        BatchPrintError::NoSelection => HumanError::new(
            "There are no files selected to print.",
            "Please drag n' drop some files into the list box above.",
            Severity::Info,
        ),

        BatchPrintError::IndexOutOfRange { .. } => HumanError::new(
            "That file is no longer in the list.",
            "The list changed. Try again.",
            Severity::Info,
        ),

        BatchPrintError::NoPrinterSelected => HumanError::new(
            "No printer selected.",
            "Please choose a printer from the list, then try again.",
            Severity::ActionRequired,
        ),

        BatchPrintError::PrinterNotFound(name) => HumanError::new(
            "That printer isn't installed.",
            format!("Check that \"{name}\" is still set up on this computer, or pick another printer."),
            Severity::ActionRequired,
        ),

        BatchPrintError::Spooler(detail) => HumanError::new(
            "The print system reported a problem.",
            format!("Check that the printing service is running. ({detail})"),
            Severity::Permanent,
        ),

        BatchPrintError::PdfError(detail) => HumanError::new(
            "This PDF couldn't be opened.",
            format!("The file may be damaged or password-protected. ({detail})"),
            Severity::Permanent,
        ),

        BatchPrintError::Bridge(detail) => HumanError::new(
            "Something went wrong talking to the system.",
            format!("Try again. ({detail})"),
            Severity::Permanent,
        ),

        BatchPrintError::PlatformUnavailable => HumanError::new(
            "Printing isn't supported on this system yet.",
            "Printing needs CUPS (Linux, macOS, BSD).",
            Severity::Permanent,
        ),

        BatchPrintError::ServiceStopped => HumanError::new(
            "The print queue stopped unexpectedly.",
            "Restart the application.",
            Severity::Permanent,
        ),

        BatchPrintError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file could not be found.",
                "It may have been moved or deleted. Remove it from the list and add it again.",
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "Permission denied.",
                "You don't have access to that file.",
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "A file operation failed.",
                format!("{io_err}"),
                Severity::Permanent,
            ),
        },

        BatchPrintError::Serialization(_) => HumanError::new(
            "Settings could not be saved.",
            "Your settings file may be damaged. It will be reset to defaults on next start.",
            Severity::Permanent,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_selection_uses_list_box_wording() {
        let h = humanize_error(&BatchPrintError::NoSelection);
        assert_eq!(h.severity, Severity::Info);
        assert!(h.suggestion.contains("list box"));
    }

    #[test]
    fn run_active_is_action_required() {
        let h = humanize_error(&BatchPrintError::RunActive);
        assert_eq!(h.severity, Severity::ActionRequired);
    }

    #[test]
    fn missing_printer_names_the_printer() {
        let h = humanize_error(&BatchPrintError::PrinterNotFound("Laser_2".into()));
        assert!(h.suggestion.contains("Laser_2"));
    }

    #[test]
    fn io_not_found_is_action_required() {
        let err = BatchPrintError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
