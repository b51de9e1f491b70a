// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue coordinator.
//
// A single tokio task owns the print list and the driver. The UI talks to it
// through a cloneable `QueueHandle`; job threads report back through a second
// channel. Nothing else ever touches the list, so the driver's cursor cannot
// be invalidated under it.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use batchprint_bridge::{ConfigurationDialog, PlatformBridge};
use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{
    ItemStatus, Notice, Outcome, PrintConfiguration, PrintableItem, RunId, RunSummary,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::configuration::resolve_configuration;
use crate::driver::{DriverState, Effect, QueueDriver};
use crate::runner::{JobRunner, PrintJobRunner};
use crate::store::QueueStore;

/// Capacity of the event broadcast; slow subscribers lag and resync from
/// `ItemsChanged`.
const EVENT_CAPACITY: usize = 256;

/// Something the UI should reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// Rows were added, removed, or re-ticked.
    ItemsChanged(Vec<PrintableItem>),
    ItemStatus { index: usize, status: ItemStatus },
    StateChanged(DriverState),
    RunStarted { run_id: RunId, printer: String },
    RunFinished(RunSummary),
    Notice(Notice),
}

/// Point-in-time copy of the list and driver state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSnapshot {
    pub items: Vec<PrintableItem>,
    pub state: DriverState,
}

/// What pressing Print did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(RunId),
    /// Nothing ticked; `Notice::NoFilesSelected` was published.
    NothingSelected,
    /// Configuration dialog dismissed; nothing was touched.
    Cancelled,
}

enum Command {
    AddPaths {
        paths: Vec<PathBuf>,
        reply: oneshot::Sender<usize>,
    },
    Toggle {
        index: usize,
        selected: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    Clear {
        reply: oneshot::Sender<Result<usize>>,
    },
    RemoveUnselected {
        reply: oneshot::Sender<Result<usize>>,
    },
    StartRun {
        printer: String,
        reply: oneshot::Sender<Result<StartOutcome>>,
    },
    RequestStop {
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<QueueSnapshot>,
    },
}

/// Sent by a job thread when its document is done.
struct JobFinished {
    run_id: RunId,
    index: usize,
    outcome: Outcome,
}

/// Cloneable front end to the coordinator task.
#[derive(Clone)]
pub struct QueueHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<QueueEvent>,
}

impl QueueHandle {
    /// Add dropped or picked files; non-PDFs are ignored.
    pub async fn add_paths(&self, paths: Vec<PathBuf>) -> Result<usize> {
        self.request(|reply| Command::AddPaths { paths, reply }).await
    }

    pub async fn toggle(&self, index: usize, selected: bool) -> Result<()> {
        self.request(|reply| Command::Toggle {
            index,
            selected,
            reply,
        })
        .await?
    }

    /// Remove every row. Refused while a run is active.
    pub async fn clear(&self) -> Result<usize> {
        self.request(|reply| Command::Clear { reply }).await?
    }

    /// Remove unticked rows. Refused while a run is active.
    pub async fn remove_unselected(&self) -> Result<usize> {
        self.request(|reply| Command::RemoveUnselected { reply }).await?
    }

    /// Resolve the printer configuration and start printing ticked rows.
    pub async fn start_run(&self, printer: impl Into<String>) -> Result<StartOutcome> {
        let printer = printer.into();
        self.request(|reply| Command::StartRun { printer, reply })
            .await?
    }

    /// Stop after the current document. Returns whether a run was stopping.
    pub async fn request_stop(&self) -> Result<bool> {
        self.request(|reply| Command::RequestStop { reply }).await
    }

    pub async fn snapshot(&self) -> Result<QueueSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .map_err(|_| BatchPrintError::ServiceStopped)?;
        rx.await.map_err(|_| BatchPrintError::ServiceStopped)
    }
}

/// The coordinator task's state.
pub struct QueueService {
    store: QueueStore,
    driver: QueueDriver,
    platform: Arc<dyn PlatformBridge>,
    dialog: Arc<dyn ConfigurationDialog>,
    runner: Arc<dyn JobRunner>,
    events: broadcast::Sender<QueueEvent>,
    completions_tx: mpsc::UnboundedSender<JobFinished>,
}

impl QueueService {
    /// Spawn the coordinator with the spooler-backed job runner.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        platform: Arc<dyn PlatformBridge>,
        dialog: Arc<dyn ConfigurationDialog>,
    ) -> QueueHandle {
        let runner: Arc<dyn JobRunner> = Arc::new(PrintJobRunner::new(Arc::clone(&platform)));
        Self::spawn_with_runner(platform, dialog, runner)
    }

    /// Spawn the coordinator with a custom job runner.
    pub fn spawn_with_runner(
        platform: Arc<dyn PlatformBridge>,
        dialog: Arc<dyn ConfigurationDialog>,
        runner: Arc<dyn JobRunner>,
    ) -> QueueHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let service = Self {
            store: QueueStore::new(),
            driver: QueueDriver::new(),
            platform,
            dialog,
            runner,
            events: events.clone(),
            completions_tx,
        };
        tokio::spawn(service.run(commands_rx, completions_rx));

        QueueHandle {
            commands: commands_tx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<JobFinished>,
    ) {
        info!(platform = self.platform.platform_name(), "queue service started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(done) = completions.recv() => self.handle_completion(done),
            }
        }
        if let Some(index) = self.driver.in_flight() {
            warn!(index, "queue service stopping with a document still printing");
        }
        info!("queue service stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::AddPaths { paths, reply } => {
                let added = self.store.add_many(paths);
                if added > 0 {
                    self.publish_items();
                }
                let _ = reply.send(added);
            }
            Command::Toggle {
                index,
                selected,
                reply,
            } => {
                let result = self.store.toggle(index, selected);
                if result.is_ok() {
                    self.publish_items();
                }
                let _ = reply.send(result);
            }
            Command::Clear { reply } => {
                let result = self.driver.ensure_idle().map(|()| self.store.clear());
                if result.is_ok() {
                    self.publish_items();
                }
                let _ = reply.send(result);
            }
            Command::RemoveUnselected { reply } => {
                let result = self
                    .driver
                    .ensure_idle()
                    .map(|()| self.store.remove_unselected());
                if result.is_ok() {
                    self.publish_items();
                }
                let _ = reply.send(result);
            }
            Command::StartRun { printer, reply } => {
                let result = self.start_run(printer).await;
                let _ = reply.send(result);
            }
            Command::RequestStop { reply } => {
                let changed = self.driver.request_stop();
                if changed {
                    self.publish(QueueEvent::StateChanged(self.driver.state()));
                }
                let _ = reply.send(changed);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(QueueSnapshot {
                    items: self.store.items().to_vec(),
                    state: self.driver.state(),
                });
            }
        }
    }

    async fn start_run(&mut self, printer: String) -> Result<StartOutcome> {
        match self.driver.can_start(&self.store) {
            Ok(()) => {}
            Err(BatchPrintError::NoSelection) => {
                info!("print pressed with no files selected");
                self.publish(QueueEvent::Notice(Notice::NoFilesSelected));
                return Ok(StartOutcome::NothingSelected);
            }
            Err(e) => return Err(e),
        }

        let Some(config) = self.resolve(printer).await? else {
            self.publish(QueueEvent::Notice(Notice::ConfigurationCancelled));
            return Ok(StartOutcome::Cancelled);
        };

        let effects = self.driver.start(&mut self.store, config)?;
        let run_id = self.driver.run_id().ok_or(BatchPrintError::NoSelection)?;
        self.apply(effects);
        Ok(StartOutcome::Started(run_id))
    }

    /// Show the configuration dialog off the coordinator task.
    async fn resolve(&self, printer: String) -> Result<Option<PrintConfiguration>> {
        let platform = Arc::clone(&self.platform);
        let dialog = Arc::clone(&self.dialog);
        tokio::task::spawn_blocking(move || {
            resolve_configuration(&*platform, &*dialog, &printer)
        })
        .await
        .map_err(|e| BatchPrintError::Bridge(format!("configuration dialog task: {e}")))?
    }

    fn handle_completion(&mut self, done: JobFinished) {
        let effects =
            self.driver
                .job_finished(&mut self.store, done.run_id, done.index, &done.outcome);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let before = self.driver.state();
        for effect in effects {
            match effect {
                Effect::RunStarted { run_id, printer } => {
                    self.publish(QueueEvent::RunStarted { run_id, printer });
                }
                Effect::Status { index, status } => {
                    self.publish(QueueEvent::ItemStatus { index, status });
                }
                Effect::Launch {
                    run_id,
                    index,
                    path,
                    config,
                } => self.launch(run_id, index, path, config),
                Effect::Finished(summary) => {
                    self.publish(QueueEvent::RunFinished(summary));
                }
            }
        }
        debug!(state = ?self.driver.state(), previous = ?before, "effects applied");
        self.publish(QueueEvent::StateChanged(self.driver.state()));
    }

    /// Print one document on its own thread.
    fn launch(&self, run_id: RunId, index: usize, path: PathBuf, config: PrintConfiguration) {
        let runner = Arc::clone(&self.runner);
        let completions = self.completions_tx.clone();
        let fallback = self.completions_tx.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("print-job-{index}"))
            .spawn(move || {
                let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    runner.run(&path, &config)
                }))
                .unwrap_or_else(|_| Outcome::failure("print job panicked"));
                // Configuration is released before the coordinator can finish the run.
                drop(config);
                let _ = completions.send(JobFinished {
                    run_id,
                    index,
                    outcome,
                });
            });

        if let Err(e) = spawned {
            error!(index, error = %e, "could not start print job thread");
            let _ = fallback.send(JobFinished {
                run_id,
                index,
                outcome: Outcome::failure(format!("could not start print job: {e}")),
            });
        }
    }

    fn publish_items(&self) {
        self.publish(QueueEvent::ItemsChanged(self.store.items().to_vec()));
    }

    fn publish(&self, event: QueueEvent) {
        // No subscribers is fine (e.g. before the UI mounts).
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlatform, GatedRunner, ScriptedDialog};
    use std::time::Duration;

    fn gated_service(dialog: ScriptedDialog) -> (QueueHandle, crate::testing::Gate, Arc<ScriptedDialog>) {
        let platform: Arc<dyn PlatformBridge> = Arc::new(FakePlatform::with_printers(&["Laser"]));
        let dialog = Arc::new(dialog);
        let (runner, gate) = GatedRunner::new();
        let handle = QueueService::spawn_with_runner(
            platform,
            Arc::clone(&dialog) as Arc<dyn ConfigurationDialog>,
            Arc::new(runner),
        );
        (handle, gate, dialog)
    }

    async fn wait_for_finish(events: &mut broadcast::Receiver<QueueEvent>) -> RunSummary {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(QueueEvent::RunFinished(summary)) = events.recv().await {
                    return summary;
                }
            }
        })
        .await
        .expect("run should finish")
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn prints_selected_rows_and_skips_the_rest() {
        let (queue, gate, _) = gated_service(ScriptedDialog::accept(b"media=A4"));
        let mut events = queue.subscribe();

        queue.add_paths(paths(&["a.pdf", "b.pdf", "c.pdf"])).await.expect("add");
        queue.toggle(1, false).await.expect("untick b");

        let outcome = queue.start_run("Laser").await.expect("start");
        assert!(matches!(outcome, StartOutcome::Started(_)));

        assert_eq!(gate.next_started(), PathBuf::from("a.pdf"));
        gate.finish(Outcome::Success);
        assert_eq!(gate.next_started(), PathBuf::from("c.pdf"));
        gate.finish(Outcome::failure("toner"));

        let summary = wait_for_finish(&mut events).await;
        assert_eq!((summary.printed, summary.failed, summary.skipped), (1, 1, 1));

        let snap = queue.snapshot().await.expect("snapshot");
        assert!(snap.state.is_idle());
        let statuses: Vec<_> = snap.items.iter().map(|i| (i.selected, i.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (false, ItemStatus::Printed),
                (false, ItemStatus::Pending),
                (false, ItemStatus::Failed),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_mid_flight_finishes_current_and_halts() {
        let (queue, gate, _) = gated_service(ScriptedDialog::accept(b""));
        let mut events = queue.subscribe();

        queue.add_paths(paths(&["a.pdf", "b.pdf", "c.pdf"])).await.expect("add");
        queue.toggle(1, false).await.expect("untick b");
        queue.start_run("Laser").await.expect("start");
        assert_eq!(gate.next_started(), PathBuf::from("a.pdf"));

        assert!(queue.request_stop().await.expect("stop"));
        let snap = queue.snapshot().await.expect("snapshot");
        assert_eq!(snap.state, DriverState::StopRequested { cursor: 0 });

        gate.finish(Outcome::Success);
        let summary = wait_for_finish(&mut events).await;
        assert!(summary.stopped_early);
        gate.assert_idle();

        let snap = queue.snapshot().await.expect("snapshot");
        assert!(snap.state.is_idle());
        assert_eq!(snap.items[0].status, ItemStatus::Printed);
        assert_eq!((snap.items[2].selected, snap.items[2].status), (true, ItemStatus::Pending));

        // Stop after the run has ended changes nothing.
        assert!(!queue.request_stop().await.expect("stop again"));
        assert!(queue.snapshot().await.expect("snapshot").state.is_idle());
    }

    #[tokio::test]
    async fn nothing_selected_notices_once_and_skips_dialog() {
        let (queue, gate, dialog) = gated_service(ScriptedDialog::accept(b""));
        let mut events = queue.subscribe();

        queue.add_paths(paths(&["a.pdf"])).await.expect("add");
        queue.toggle(0, false).await.expect("untick");
        let before = queue.snapshot().await.expect("snapshot");

        let outcome = queue.start_run("Laser").await.expect("start");
        assert_eq!(outcome, StartOutcome::NothingSelected);
        assert_eq!(dialog.shown(), 0);

        let after = queue.snapshot().await.expect("snapshot");
        assert_eq!(before, after);

        let mut notices = 0;
        while let Ok(event) = events.try_recv() {
            if event == QueueEvent::Notice(Notice::NoFilesSelected) {
                notices += 1;
            }
        }
        assert_eq!(notices, 1);
        gate.assert_idle();
    }

    #[tokio::test]
    async fn cancelled_dialog_touches_nothing() {
        let (queue, gate, dialog) = gated_service(ScriptedDialog::cancel());
        queue.add_paths(paths(&["a.pdf", "b.pdf"])).await.expect("add");
        let before = queue.snapshot().await.expect("snapshot");

        let outcome = queue.start_run("Laser").await.expect("start");
        assert_eq!(outcome, StartOutcome::Cancelled);
        assert_eq!(dialog.shown(), 1);
        assert_eq!(queue.snapshot().await.expect("snapshot"), before);
        gate.assert_idle();
    }

    #[tokio::test]
    async fn unknown_printer_is_an_error() {
        let (queue, _gate, dialog) = gated_service(ScriptedDialog::accept(b""));
        queue.add_paths(paths(&["a.pdf"])).await.expect("add");

        let err = queue.start_run("Inkjet").await.expect_err("unknown printer");
        assert!(matches!(err, BatchPrintError::PrinterNotFound(_)));
        assert_eq!(dialog.shown(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn structural_changes_refused_while_running() {
        let (queue, gate, _) = gated_service(ScriptedDialog::accept(b""));
        let mut events = queue.subscribe();
        queue.add_paths(paths(&["a.pdf", "b.pdf"])).await.expect("add");
        queue.start_run("Laser").await.expect("start");
        gate.next_started();

        assert!(matches!(queue.clear().await, Err(BatchPrintError::RunActive)));
        assert!(matches!(
            queue.remove_unselected().await,
            Err(BatchPrintError::RunActive)
        ));
        assert!(matches!(
            queue.start_run("Laser").await,
            Err(BatchPrintError::RunActive)
        ));
        // Ticking is still allowed mid-run.
        queue.toggle(1, false).await.expect("untick b mid-run");

        gate.finish(Outcome::Success);
        let summary = wait_for_finish(&mut events).await;
        assert_eq!((summary.printed, summary.skipped), (1, 1));

        assert_eq!(queue.remove_unselected().await.expect("idle again"), 2);
        assert!(queue.snapshot().await.expect("snapshot").items.is_empty());
    }

    #[tokio::test]
    async fn add_paths_ignores_non_pdfs() {
        let (queue, _gate, _) = gated_service(ScriptedDialog::cancel());
        let added = queue
            .add_paths(paths(&["x.pdf", "y.txt", "Z.PDF"]))
            .await
            .expect("add");
        assert_eq!(added, 2);

        let names: Vec<_> = queue
            .snapshot()
            .await
            .expect("snapshot")
            .items
            .iter()
            .map(|i| i.path.clone())
            .collect();
        assert_eq!(names, paths(&["x.pdf", "Z.PDF"]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn printing_events_arrive_in_index_order() {
        let (queue, gate, _) = gated_service(ScriptedDialog::accept(b""));
        let mut events = queue.subscribe();
        queue.add_paths(paths(&["a.pdf", "b.pdf", "c.pdf"])).await.expect("add");
        queue.start_run("Laser").await.expect("start");

        for _ in 0..3 {
            gate.next_started();
            gate.finish(Outcome::Success);
        }

        let mut printing = Vec::new();
        let mut in_flight = 0usize;
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await {
                    Ok(QueueEvent::ItemStatus { index, status }) => {
                        if status == ItemStatus::Printing {
                            in_flight += 1;
                            assert_eq!(in_flight, 1, "two documents printing at once");
                            printing.push(index);
                        } else if status.is_terminal() {
                            in_flight -= 1;
                        }
                    }
                    Ok(QueueEvent::RunFinished(_)) => break,
                    _ => {}
                }
            }
        })
        .await
        .expect("run should finish");

        assert_eq!(printing, vec![0, 1, 2]);
    }

    struct PanickingRunner;

    impl JobRunner for PanickingRunner {
        fn run(&self, _path: &std::path::Path, _config: &PrintConfiguration) -> Outcome {
            panic!("renderer crashed");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_job_fails_its_row_and_the_run_continues() {
        let platform: Arc<dyn PlatformBridge> = Arc::new(FakePlatform::with_printers(&["Laser"]));
        let queue = QueueService::spawn_with_runner(
            platform,
            Arc::new(ScriptedDialog::accept(b"")),
            Arc::new(PanickingRunner),
        );
        let mut events = queue.subscribe();

        queue.add_paths(paths(&["a.pdf", "b.pdf"])).await.expect("add");
        queue.start_run("Laser").await.expect("start");

        let summary = wait_for_finish(&mut events).await;
        assert_eq!((summary.printed, summary.failed), (0, 2));
        assert!(!summary.stopped_early);

        let snap = queue.snapshot().await.expect("snapshot");
        assert!(snap.state.is_idle());
        assert!(snap.items.iter().all(|i| i.status == ItemStatus::Failed && !i.selected));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn default_runner_prints_real_files_and_fails_missing_ones() {
        use batchprint_document::pdf::fixtures;

        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("ok.pdf");
        fixtures::write_blank_pdf(&good, 1).expect("fixture");
        let missing = dir.path().join("missing.pdf");

        let platform = Arc::new(FakePlatform::with_printers(&["Laser"]));
        let queue = QueueService::spawn(
            Arc::clone(&platform) as Arc<dyn PlatformBridge>,
            Arc::new(ScriptedDialog::accept(b"media=A4")),
        );
        let mut events = queue.subscribe();

        queue.add_paths(vec![good.clone(), missing]).await.expect("add");
        let outcome = queue.start_run("Laser").await.expect("start");
        assert!(matches!(outcome, StartOutcome::Started(_)));

        let summary = wait_for_finish(&mut events).await;
        assert_eq!((summary.printed, summary.failed), (1, 1));

        let snap = queue.snapshot().await.expect("snapshot");
        let statuses: Vec<_> = snap.items.iter().map(|i| i.status).collect();
        assert_eq!(statuses, vec![ItemStatus::Printed, ItemStatus::Failed]);

        let submitted = platform.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].path, good);
        assert_eq!(platform.acquired(), platform.released());
    }

    #[tokio::test]
    async fn handle_reports_stopped_service() {
        let (commands, rx) = mpsc::unbounded_channel();
        drop(rx);
        let (events, _) = broadcast::channel(1);
        let handle = QueueHandle { commands, events };
        assert!(matches!(
            handle.snapshot().await,
            Err(BatchPrintError::ServiceStopped)
        ));
    }
}
