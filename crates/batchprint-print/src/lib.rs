// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// batchprint-print — the sequential print queue.
//
// `QueueStore` holds the rows, `QueueDriver` walks them one at a time,
// `PrintJobRunner` prints a single document on its own thread, and
// `QueueService` owns all of it behind a cloneable `QueueHandle`.

pub mod configuration;
pub mod driver;
pub mod runner;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use configuration::{DeviceModeLease, resolve_configuration};
pub use driver::{Controls, DriverState, Effect, QueueDriver};
pub use runner::{JobRunner, PrintJobRunner};
pub use service::{QueueEvent, QueueHandle, QueueService, QueueSnapshot, StartOutcome};
pub use store::QueueStore;
