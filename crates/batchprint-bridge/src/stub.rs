// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for platforms without a supported spooler backend.
//
// Every operation returns `PlatformUnavailable`; the UI still starts, shows an
// empty printer list, and explains why nothing can be printed.

use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::PrintConfiguration;

use crate::traits::*;

/// No-op bridge returned where CUPS is unavailable.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl PrinterCatalog for StubBridge {
    fn installed_printers(&self) -> Result<Vec<String>> {
        tracing::warn!("PrinterCatalog::installed_printers called on stub bridge");
        Err(BatchPrintError::PlatformUnavailable)
    }

    fn default_printer(&self) -> Result<Option<String>> {
        Err(BatchPrintError::PlatformUnavailable)
    }
}

impl DeviceModeSource for StubBridge {
    fn acquire_device_mode(&self, _printer: &str) -> Result<DeviceModeHandle> {
        tracing::warn!("DeviceModeSource::acquire_device_mode called on stub bridge");
        Err(BatchPrintError::PlatformUnavailable)
    }

    fn release_device_mode(&self, _handle: DeviceModeHandle) {}
}

impl PrintSpooler for StubBridge {
    fn submit(
        &self,
        _request: &PrintRequest,
        _config: &PrintConfiguration,
        _done: CompletionSignal,
    ) -> Result<()> {
        tracing::warn!("PrintSpooler::submit called on stub bridge");
        Err(BatchPrintError::PlatformUnavailable)
    }
}
