// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequential print-queue state machine.
//
//   Idle ──start──▶ Running(0) ──skip / job done──▶ Running(i+1) ──end──▶ Idle
//                      │
//                    stop
//                      ▼
//               StopRequested(i) ──in-flight job done──▶ Idle
//
// The driver performs no I/O. Each call returns the effects the caller must
// carry out (launch a job thread, publish a status change, report the run
// summary), which keeps every transition testable without threads.

use std::path::PathBuf;

use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{ItemStatus, Outcome, PrintConfiguration, RunId, RunSummary};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::store::QueueStore;

/// Where the driver is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    /// `cursor` is the row being printed (or about to be evaluated).
    Running { cursor: usize },
    /// Stop was pressed while row `cursor` was printing.
    StopRequested { cursor: usize },
}

impl DriverState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn cursor(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Running { cursor } | Self::StopRequested { cursor } => Some(*cursor),
        }
    }
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A run began with this configuration.
    RunStarted { run_id: RunId, printer: String },
    /// Print row `index` on a background thread and report back with
    /// [`QueueDriver::job_finished`].
    Launch {
        run_id: RunId,
        index: usize,
        path: PathBuf,
        config: PrintConfiguration,
    },
    /// Row `index` changed status.
    Status { index: usize, status: ItemStatus },
    /// The run is over and the driver is idle again.
    Finished(RunSummary),
}

/// Bookkeeping for the active run.
#[derive(Debug)]
struct ActiveRun {
    run_id: RunId,
    config: PrintConfiguration,
    started_at: DateTime<Utc>,
    in_flight: Option<usize>,
    printed: usize,
    failed: usize,
    skipped: usize,
}

/// Walks the print list one selected row at a time.
#[derive(Debug)]
pub struct QueueDriver {
    state: DriverState,
    run: Option<ActiveRun>,
}

impl Default for QueueDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.run.as_ref().map(|run| run.run_id)
    }

    /// Row currently handed to a job thread.
    pub fn in_flight(&self) -> Option<usize> {
        self.run.as_ref().and_then(|run| run.in_flight)
    }

    /// Error unless the driver is idle. Guards structural list changes.
    pub fn ensure_idle(&self) -> Result<()> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(BatchPrintError::RunActive)
        }
    }

    /// Whether a run could start now. Checked before showing the
    /// configuration dialog so the dialog only appears when there is work.
    pub fn can_start(&self, store: &QueueStore) -> Result<()> {
        self.ensure_idle()?;
        if store.selected_count() == 0 {
            return Err(BatchPrintError::NoSelection);
        }
        Ok(())
    }

    /// Begin a run at row 0 with a configuration resolved for this run.
    pub fn start(&mut self, store: &mut QueueStore, config: PrintConfiguration) -> Result<Vec<Effect>> {
        self.can_start(store)?;

        let run_id = RunId::new();
        info!(
            run_id = %run_id,
            printer = config.printer(),
            selected = store.selected_count(),
            total = store.len(),
            "print run starting"
        );

        let mut effects = vec![Effect::RunStarted {
            run_id,
            printer: config.printer().to_string(),
        }];
        self.run = Some(ActiveRun {
            run_id,
            config,
            started_at: Utc::now(),
            in_flight: None,
            printed: 0,
            failed: 0,
            skipped: 0,
        });
        self.state = DriverState::Running { cursor: 0 };
        self.advance(store, &mut effects);
        Ok(effects)
    }

    /// Record the outcome of the in-flight job and move on.
    ///
    /// Reports for another run or another row are ignored.
    pub fn job_finished(
        &mut self,
        store: &mut QueueStore,
        run_id: RunId,
        index: usize,
        outcome: &Outcome,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        let Some(run) = self.run.as_mut() else {
            warn!(run_id = %run_id, index, "job finished with no active run");
            return effects;
        };
        if run.run_id != run_id || run.in_flight != Some(index) {
            warn!(
                run_id = %run_id,
                index,
                in_flight = ?run.in_flight,
                "ignoring completion for a job that is not in flight"
            );
            return effects;
        }

        run.in_flight = None;
        let status = outcome.status();
        match outcome {
            Outcome::Success => {
                run.printed += 1;
                info!(run_id = %run_id, index, "document printed");
            }
            Outcome::Failure { reason } => {
                run.failed += 1;
                tracing::error!(run_id = %run_id, index, reason = %reason, "document failed to print");
            }
        }
        store.complete(index, status);
        effects.push(Effect::Status { index, status });

        match self.state {
            DriverState::Running { cursor } => {
                self.state = DriverState::Running { cursor: cursor + 1 };
                self.advance(store, &mut effects);
            }
            DriverState::StopRequested { cursor } => {
                let remaining = store.items().iter().skip(cursor + 1).any(|i| i.selected);
                self.finish(remaining, &mut effects);
            }
            DriverState::Idle => {}
        }
        effects
    }

    /// Ask the run to stop after the in-flight job. No-op unless running.
    ///
    /// Returns whether the request changed anything.
    pub fn request_stop(&mut self) -> bool {
        match self.state {
            DriverState::Running { cursor } => {
                info!(cursor, "stop requested; waiting for the current document");
                self.state = DriverState::StopRequested { cursor };
                true
            }
            DriverState::StopRequested { .. } | DriverState::Idle => false,
        }
    }

    /// Move the cursor to the next selected row and launch it, or finish.
    fn advance(&mut self, store: &mut QueueStore, effects: &mut Vec<Effect>) {
        loop {
            let cursor = match self.state {
                DriverState::Running { cursor } => cursor,
                DriverState::StopRequested { .. } => {
                    self.finish(true, effects);
                    return;
                }
                DriverState::Idle => return,
            };

            let Some(item) = store.get(cursor) else {
                self.finish(false, effects);
                return;
            };

            let Some(run) = self.run.as_mut() else {
                self.state = DriverState::Idle;
                return;
            };

            if !item.selected {
                debug!(index = cursor, "skipping unselected row");
                run.skipped += 1;
                self.state = DriverState::Running { cursor: cursor + 1 };
                continue;
            }

            let path = item.path.clone();
            run.in_flight = Some(cursor);
            store.set_status(cursor, ItemStatus::Printing);
            effects.push(Effect::Status {
                index: cursor,
                status: ItemStatus::Printing,
            });
            effects.push(Effect::Launch {
                run_id: run.run_id,
                index: cursor,
                path,
                config: run.config.clone(),
            });
            return;
        }
    }

    fn finish(&mut self, stopped_early: bool, effects: &mut Vec<Effect>) {
        self.state = DriverState::Idle;
        let Some(run) = self.run.take() else {
            return;
        };

        let summary = RunSummary {
            run_id: run.run_id,
            printer: run.config.printer().to_string(),
            printed: run.printed,
            failed: run.failed,
            skipped: run.skipped,
            stopped_early,
            started_at: run.started_at,
            finished_at: Utc::now(),
        };
        info!(
            run_id = %summary.run_id,
            printed = summary.printed,
            failed = summary.failed,
            skipped = summary.skipped,
            stopped_early,
            "print run finished"
        );
        effects.push(Effect::Finished(summary));
        // Configuration (and its device mode) is dropped with `run` here.
    }
}

// ---------------------------------------------------------------------------
// Button states
// ---------------------------------------------------------------------------

/// Enablement and captions of the window's buttons for a driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub print_enabled: bool,
    pub print_label: &'static str,
    pub stop_enabled: bool,
    pub stop_label: &'static str,
    pub remove_deselected_enabled: bool,
    pub clear_enabled: bool,
}

impl Controls {
    pub fn for_state(state: DriverState) -> Self {
        match state {
            DriverState::Idle => Self {
                print_enabled: true,
                print_label: "Print...",
                stop_enabled: false,
                stop_label: "Stop",
                remove_deselected_enabled: true,
                clear_enabled: true,
            },
            DriverState::Running { .. } => Self {
                print_enabled: false,
                print_label: "Printing...",
                stop_enabled: true,
                stop_label: "Stop",
                remove_deselected_enabled: false,
                clear_enabled: false,
            },
            DriverState::StopRequested { .. } => Self {
                print_enabled: false,
                print_label: "Printing...",
                stop_enabled: false,
                stop_label: "Stopping",
                remove_deselected_enabled: false,
                clear_enabled: false,
            },
        }
    }
}
