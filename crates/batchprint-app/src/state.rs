// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — a mirror of the coordinator's list and driver
// state, kept current from the `QueueEvent` stream.

use batchprint_core::types::{PrintableItem, RunSummary};
use batchprint_print::{Controls, DriverState, QueueEvent, QueueSnapshot};

use crate::services::app_services::AppServices;

/// Shared state accessible to all components via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Rows of the print list, in display order.
    pub items: Vec<PrintableItem>,
    pub driver: DriverState,
    /// Installed printers for the printer list.
    pub printers: Vec<String>,
    pub selected_printer: Option<String>,
    /// Outcome of the most recent run, shown under the list.
    pub last_run: Option<RunSummary>,
    /// A Print click is waiting on the configuration dialog.
    pub start_pending: bool,
}

impl AppState {
    /// Create initial state from the backend services.
    pub fn new(svc: &AppServices) -> Self {
        let printers = svc.installed_printers();
        let selected_printer = svc.initial_printer(&printers);
        Self {
            items: Vec::new(),
            driver: DriverState::Idle,
            printers,
            selected_printer,
            last_run: None,
            start_pending: false,
        }
    }

    pub fn controls(&self) -> Controls {
        let mut controls = Controls::for_state(self.driver);
        if self.start_pending {
            controls.print_enabled = false;
            controls.remove_deselected_enabled = false;
            controls.clear_enabled = false;
        }
        controls
    }

    /// Replace the mirror after lagging behind the event stream.
    pub fn resync(&mut self, snapshot: QueueSnapshot) {
        self.items = snapshot.items;
        self.driver = snapshot.state;
    }

    /// Fold one coordinator event into the mirror.
    ///
    /// Notices are not state; the caller shows them.
    pub fn apply(&mut self, event: &QueueEvent) {
        match event {
            QueueEvent::ItemsChanged(items) => self.items = items.clone(),
            QueueEvent::ItemStatus { index, status } => {
                if let Some(item) = self.items.get_mut(*index) {
                    item.status = *status;
                    if status.is_terminal() {
                        item.selected = false;
                    }
                }
            }
            QueueEvent::StateChanged(state) => self.driver = *state,
            QueueEvent::RunStarted { .. } => self.last_run = None,
            QueueEvent::RunFinished(summary) => self.last_run = Some(summary.clone()),
            QueueEvent::Notice(_) => {}
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            driver: DriverState::Idle,
            printers: Vec::new(),
            selected_printer: None,
            last_run: None,
            start_pending: false,
        }
    }
}
