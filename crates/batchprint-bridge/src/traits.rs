// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the OS printing subsystem.
//
// The queue never talks to the OS directly. It enumerates printers, borrows a
// printer's default device mode, shows the configuration dialog, and submits
// documents through these traits.

use std::path::PathBuf;

use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{DeviceMode, PrintConfiguration};
use tokio::sync::oneshot;

/// Everything the platform provides except the dialog, which belongs to the UI.
pub trait PlatformBridge: PrinterCatalog + DeviceModeSource + PrintSpooler + Send + Sync {
    /// Human-readable backend name (e.g. "CUPS", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// Installed printers.
pub trait PrinterCatalog {
    /// Names of every installed printer, in the order the OS reports them.
    fn installed_printers(&self) -> Result<Vec<String>>;

    /// The system default printer, if one is set.
    fn default_printer(&self) -> Result<Option<String>>;
}

/// Borrowed handle to a printer's default device mode.
///
/// Every handle obtained from [`DeviceModeSource::acquire_device_mode`] must be
/// passed back to [`DeviceModeSource::release_device_mode`] exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceModeHandle {
    pub id: u64,
    pub printer: String,
    pub defaults: DeviceMode,
}

/// Source of printer device modes.
pub trait DeviceModeSource {
    fn acquire_device_mode(&self, printer: &str) -> Result<DeviceModeHandle>;

    fn release_device_mode(&self, handle: DeviceModeHandle);
}

/// Result of showing the printer configuration dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// User pressed OK; carries the device mode to print with.
    Accepted(DeviceMode),
    Cancelled,
}

/// Modal printer configuration dialog.
///
/// Blocks until the user closes it. Implementations live with the UI.
pub trait ConfigurationDialog: Send + Sync {
    fn configure(&self, printer: &str, defaults: &DeviceMode) -> Result<DialogOutcome>;
}

/// One document to hand to the spooler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    pub path: PathBuf,
    /// Name shown in the OS job list.
    pub job_title: String,
    pub page_count: usize,
}

/// Submits documents to the OS print spooler.
pub trait PrintSpooler {
    /// Hand `request` to the spooler and return without waiting.
    ///
    /// The spooler fires `done` when the submission has finished (or failed).
    /// An `Err` here means nothing was submitted and `done` will never fire.
    fn submit(
        &self,
        request: &PrintRequest,
        config: &PrintConfiguration,
        done: CompletionSignal,
    ) -> Result<()>;
}

/// Sender half of the spooler's "job finished" notification.
#[derive(Debug)]
pub struct CompletionSignal {
    tx: oneshot::Sender<Result<()>>,
}

/// Receiver half; the job thread parks on it.
#[derive(Debug)]
pub struct CompletionWaiter {
    rx: oneshot::Receiver<Result<()>>,
}

impl CompletionSignal {
    pub fn channel() -> (CompletionSignal, CompletionWaiter) {
        let (tx, rx) = oneshot::channel();
        (CompletionSignal { tx }, CompletionWaiter { rx })
    }

    /// Report the spooler result. A waiter that already went away is ignored.
    pub fn finish(self, result: Result<()>) {
        let _ = self.tx.send(result);
    }
}

impl CompletionWaiter {
    /// Block the current thread until the signal fires.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn wait(self) -> Result<()> {
        match self.rx.blocking_recv() {
            Ok(result) => result,
            Err(_) => Err(BatchPrintError::Spooler(
                "spooler dropped the completion signal".into(),
            )),
        }
    }
}
