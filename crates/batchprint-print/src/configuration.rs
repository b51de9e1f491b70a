// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-run printer configuration.
//
// The printer's default device mode is borrowed from the platform, shown in
// the configuration dialog, and handed back once the dialog closes. The
// lease guard returns it on every path: accepted, cancelled, or error.

use batchprint_bridge::{
    ConfigurationDialog, DeviceModeHandle, DeviceModeSource, DialogOutcome, PrinterCatalog,
};
use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{DeviceMode, PrintConfiguration};
use tracing::{info, instrument};

/// A borrowed device mode, released on drop.
pub struct DeviceModeLease<'a, S: DeviceModeSource + ?Sized> {
    source: &'a S,
    handle: Option<DeviceModeHandle>,
}

impl<'a, S: DeviceModeSource + ?Sized> DeviceModeLease<'a, S> {
    pub fn acquire(source: &'a S, printer: &str) -> Result<Self> {
        let handle = source.acquire_device_mode(printer)?;
        Ok(Self {
            source,
            handle: Some(handle),
        })
    }

    pub fn defaults(&self) -> Option<&DeviceMode> {
        self.handle.as_ref().map(|h| &h.defaults)
    }
}

impl<S: DeviceModeSource + ?Sized> Drop for DeviceModeLease<'_, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.source.release_device_mode(handle);
        }
    }
}

/// Resolve the configuration for one run.
///
/// Returns `Ok(None)` when the user cancels the dialog.
#[instrument(skip(platform, dialog))]
pub fn resolve_configuration<P>(
    platform: &P,
    dialog: &dyn ConfigurationDialog,
    printer: &str,
) -> Result<Option<PrintConfiguration>>
where
    P: PrinterCatalog + DeviceModeSource + ?Sized,
{
    let printer = printer.trim();
    if printer.is_empty() {
        return Err(BatchPrintError::NoPrinterSelected);
    }
    if !platform.installed_printers()?.iter().any(|p| p == printer) {
        return Err(BatchPrintError::PrinterNotFound(printer.to_string()));
    }

    let lease = DeviceModeLease::acquire(platform, printer)?;
    let defaults = lease
        .defaults()
        .cloned()
        .ok_or_else(|| BatchPrintError::Bridge("device mode lease is empty".into()))?;

    match dialog.configure(printer, &defaults)? {
        DialogOutcome::Accepted(device_mode) => {
            info!(printer, bytes = device_mode.len(), "printer configuration accepted");
            Ok(Some(PrintConfiguration::new(printer, device_mode)))
        }
        DialogOutcome::Cancelled => {
            info!(printer, "printer configuration cancelled");
            Ok(None)
        }
    }
}
