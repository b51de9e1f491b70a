// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native modal dialogs (rfd).

use batchprint_bridge::{ConfigurationDialog, DialogOutcome};
use batchprint_core::error::Result;
use batchprint_core::human_errors::{HumanError, Severity};
use batchprint_core::types::{DeviceMode, Notice};
use rfd::{AsyncMessageDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

const APP_TITLE: &str = "Batch Print";

/// Shows the printer's saved options and asks whether to print with them.
///
/// Runs on the blocking pool, so the synchronous dialog is used.
pub struct NativeConfigurationDialog;

impl ConfigurationDialog for NativeConfigurationDialog {
    fn configure(&self, printer: &str, defaults: &DeviceMode) -> Result<DialogOutcome> {
        let answer = MessageDialog::new()
            .set_title(format!("{APP_TITLE}: {printer}"))
            .set_description(describe_options(printer, defaults))
            .set_buttons(MessageButtons::OkCancel)
            .set_level(MessageLevel::Info)
            .show();

        Ok(match answer {
            MessageDialogResult::Ok | MessageDialogResult::Yes => {
                DialogOutcome::Accepted(defaults.clone())
            }
            _ => DialogOutcome::Cancelled,
        })
    }
}

fn describe_options(printer: &str, defaults: &DeviceMode) -> String {
    let options = String::from_utf8_lossy(defaults.as_bytes());
    let options = options.trim();
    if options.is_empty() {
        format!("Print the selected files on \"{printer}\" with its default settings?")
    } else {
        format!("Print the selected files on \"{printer}\" with these settings?\n\n{options}")
    }
}

/// Yes/No confirmation. Returns true on Yes.
pub async fn confirm(question: &str) -> bool {
    let answer = AsyncMessageDialog::new()
        .set_title(APP_TITLE)
        .set_description(question)
        .set_buttons(MessageButtons::YesNo)
        .set_level(MessageLevel::Warning)
        .show()
        .await;
    matches!(answer, MessageDialogResult::Yes)
}

pub async fn show_notice(notice: Notice) {
    AsyncMessageDialog::new()
        .set_title(APP_TITLE)
        .set_description(notice.message())
        .set_buttons(MessageButtons::Ok)
        .set_level(MessageLevel::Info)
        .show()
        .await;
}

pub async fn show_error(err: HumanError) {
    let level = match err.severity {
        Severity::Info => MessageLevel::Info,
        Severity::ActionRequired => MessageLevel::Warning,
        Severity::Permanent => MessageLevel::Error,
    };
    AsyncMessageDialog::new()
        .set_title(APP_TITLE)
        .set_description(format!("{}\n\n{}", err.message, err.suggestion))
        .set_buttons(MessageButtons::Ok)
        .set_level(level)
        .show()
        .await;
}
