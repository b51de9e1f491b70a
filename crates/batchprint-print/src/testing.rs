// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory platform, dialog, and runner doubles for the queue tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};
use std::time::Duration;

use batchprint_bridge::*;
use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{DeviceMode, Outcome, PrintConfiguration};

use crate::runner::JobRunner;

/// How the fake spooler treats a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoolBehaviour {
    /// Signal success from another thread.
    Complete,
    /// Accept, then signal a spooler error.
    FailAfterSpooling,
    /// Refuse the submission outright.
    Reject,
    /// Accept and never signal.
    DropSignal,
}

pub struct FakePlatform {
    printers: Vec<String>,
    next_lease: AtomicU64,
    acquired: AtomicUsize,
    released: AtomicUsize,
    submitted: Mutex<Vec<PrintRequest>>,
    behaviour: Mutex<SpoolBehaviour>,
}

impl FakePlatform {
    pub fn with_printers(printers: &[&str]) -> Self {
        Self {
            printers: printers.iter().map(|p| p.to_string()).collect(),
            next_lease: AtomicU64::new(1),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            behaviour: Mutex::new(SpoolBehaviour::Complete),
        }
    }

    pub fn set_behaviour(&self, behaviour: SpoolBehaviour) {
        *self.behaviour.lock().expect("behaviour lock") = behaviour;
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<PrintRequest> {
        self.submitted.lock().expect("submitted lock").clone()
    }
}

impl PlatformBridge for FakePlatform {
    fn platform_name(&self) -> &str {
        "fake"
    }
}

impl PrinterCatalog for FakePlatform {
    fn installed_printers(&self) -> Result<Vec<String>> {
        Ok(self.printers.clone())
    }

    fn default_printer(&self) -> Result<Option<String>> {
        Ok(self.printers.first().cloned())
    }
}

impl DeviceModeSource for FakePlatform {
    fn acquire_device_mode(&self, printer: &str) -> Result<DeviceModeHandle> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(DeviceModeHandle {
            id: self.next_lease.fetch_add(1, Ordering::SeqCst),
            printer: printer.to_string(),
            defaults: DeviceMode::new(b"media=A4".to_vec()),
        })
    }

    fn release_device_mode(&self, _handle: DeviceModeHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl PrintSpooler for FakePlatform {
    fn submit(
        &self,
        request: &PrintRequest,
        _config: &PrintConfiguration,
        done: CompletionSignal,
    ) -> Result<()> {
        let behaviour = *self.behaviour.lock().expect("behaviour lock");
        if behaviour == SpoolBehaviour::Reject {
            return Err(BatchPrintError::Spooler("printer offline".into()));
        }
        self.submitted
            .lock()
            .expect("submitted lock")
            .push(request.clone());

        match behaviour {
            SpoolBehaviour::Complete => {
                std::thread::spawn(move || done.finish(Ok(())));
            }
            SpoolBehaviour::FailAfterSpooling => {
                std::thread::spawn(move || {
                    done.finish(Err(BatchPrintError::Spooler("paper jam".into())))
                });
            }
            SpoolBehaviour::DropSignal => drop(done),
            SpoolBehaviour::Reject => {}
        }
        Ok(())
    }
}

/// Dialog that gives a fixed answer and counts how often it was shown.
pub struct ScriptedDialog {
    answer: std::result::Result<DialogOutcome, String>,
    shown: AtomicUsize,
}

impl ScriptedDialog {
    pub fn accept(device_mode: &[u8]) -> Self {
        Self {
            answer: Ok(DialogOutcome::Accepted(DeviceMode::new(device_mode.to_vec()))),
            shown: AtomicUsize::new(0),
        }
    }

    pub fn cancel() -> Self {
        Self {
            answer: Ok(DialogOutcome::Cancelled),
            shown: AtomicUsize::new(0),
        }
    }

    pub fn fail() -> Self {
        Self {
            answer: Err("window system gone".into()),
            shown: AtomicUsize::new(0),
        }
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

impl ConfigurationDialog for ScriptedDialog {
    fn configure(&self, _printer: &str, _defaults: &DeviceMode) -> Result<DialogOutcome> {
        self.shown.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(outcome) => Ok(outcome.clone()),
            Err(msg) => Err(BatchPrintError::Bridge(msg.clone())),
        }
    }
}

/// Runner that reports each path it starts and blocks until the test
/// releases it with an outcome.
pub struct GatedRunner {
    started: Mutex<mpsc::Sender<PathBuf>>,
    release: Mutex<mpsc::Receiver<Outcome>>,
}

/// Test-side controls for a [`GatedRunner`].
pub struct Gate {
    started: mpsc::Receiver<PathBuf>,
    release: mpsc::Sender<Outcome>,
}

impl GatedRunner {
    pub fn new() -> (Self, Gate) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        (
            Self {
                started: Mutex::new(started_tx),
                release: Mutex::new(release_rx),
            },
            Gate {
                started: started_rx,
                release: release_tx,
            },
        )
    }
}

impl JobRunner for GatedRunner {
    fn run(&self, path: &Path, _config: &PrintConfiguration) -> Outcome {
        let _ = self
            .started
            .lock()
            .expect("started lock")
            .send(path.to_path_buf());
        self.release
            .lock()
            .expect("release lock")
            .recv()
            .unwrap_or_else(|_| Outcome::failure("gate closed"))
    }
}

impl Gate {
    /// Wait for the next job thread to start and return its path.
    pub fn next_started(&self) -> PathBuf {
        self.started
            .recv_timeout(Duration::from_secs(5))
            .expect("a job should have started")
    }

    /// Assert no job starts within a short window.
    pub fn assert_idle(&self) {
        assert!(
            self.started.recv_timeout(Duration::from_millis(200)).is_err(),
            "no job should have started"
        );
    }

    pub fn finish(&self, outcome: Outcome) {
        self.release.send(outcome).expect("runner alive");
    }
}
