// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// batchprint-bridge — OS printing subsystem abstractions.
//
// Defines the capability traits the queue uses (printer catalog, device-mode
// leases, spooler submission) and picks the backend for the target platform.

use std::sync::Arc;

use batchprint_core::SpoolerConfig;

pub mod traits;

#[cfg(unix)]
pub mod cups;

#[cfg(not(unix))]
pub mod stub;

pub use traits::*;

/// Returns the bridge implementation for the target operating system.
pub fn platform_bridge(programs: &SpoolerConfig) -> Arc<dyn PlatformBridge> {
    #[cfg(unix)]
    {
        Arc::new(cups::CupsBridge::new(programs.clone()))
    }
    #[cfg(not(unix))]
    {
        let _ = programs;
        Arc::new(stub::StubBridge)
    }
}
