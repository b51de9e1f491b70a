// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS bridge for Linux, macOS, and the BSDs.
//
// Drives the CUPS command-line tools:
//   lpstat -e / -p    installed printers
//   lpstat -d         system default printer
//   lpoptions -p X    saved options for X, used as the device mode blob
//   lp -d X -- file   submit; the job has been spooled once `lp` exits

use std::collections::HashSet;
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use batchprint_core::SpoolerConfig;
use batchprint_core::error::{BatchPrintError, Result};
use batchprint_core::types::{DeviceMode, PrintConfiguration};
use tracing::{debug, info, instrument, warn};

use crate::traits::*;

/// Option keys from `lpoptions` that describe the queue, not the job.
const NON_JOB_OPTION_PREFIXES: &[&str] = &["printer-", "marker-", "device-uri"];

/// Bridge backed by the CUPS command-line tools.
pub struct CupsBridge {
    programs: SpoolerConfig,
    next_lease: AtomicU64,
    /// Device-mode leases handed out and not yet released.
    outstanding: Mutex<HashSet<u64>>,
}

impl CupsBridge {
    pub fn new(programs: SpoolerConfig) -> Self {
        Self {
            programs,
            next_lease: AtomicU64::new(1),
            outstanding: Mutex::new(HashSet::new()),
        }
    }

    /// Number of leases not yet released.
    pub fn outstanding_leases(&self) -> usize {
        self.outstanding.lock().map(|set| set.len()).unwrap_or(0)
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        debug!(program, ?args, "running CUPS tool");
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BatchPrintError::Spooler(format!("{program}: {e}")))
    }

    fn run_checked(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self.run(program, args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BatchPrintError::Spooler(format!(
                "{program} {}: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl PlatformBridge for CupsBridge {
    fn platform_name(&self) -> &str {
        "CUPS"
    }
}

impl PrinterCatalog for CupsBridge {
    #[instrument(skip(self))]
    fn installed_printers(&self) -> Result<Vec<String>> {
        // `-e` is CUPS 2.x; older releases only have `-p`.
        let printers = match self.run_checked(&self.programs.lpstat_program, &["-e"]) {
            Ok(stdout) => parse_destinations(&stdout),
            Err(e) => {
                debug!(error = %e, "lpstat -e failed, falling back to lpstat -p");
                let stdout = self.run_checked(&self.programs.lpstat_program, &["-p"])?;
                parse_printer_lines(&stdout)
            }
        };
        info!(count = printers.len(), "enumerated installed printers");
        Ok(printers)
    }

    fn default_printer(&self) -> Result<Option<String>> {
        let output = self.run(&self.programs.lpstat_program, &["-d"])?;
        // Exits non-zero on some systems when no default is set.
        Ok(parse_default_destination(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }
}

impl DeviceModeSource for CupsBridge {
    #[instrument(skip(self))]
    fn acquire_device_mode(&self, printer: &str) -> Result<DeviceModeHandle> {
        let stdout = self
            .run_checked(&self.programs.lpoptions_program, &["-p", printer])
            .map_err(|e| match e {
                BatchPrintError::Spooler(detail) if detail.contains("Unknown") => {
                    BatchPrintError::PrinterNotFound(printer.to_string())
                }
                other => other,
            })?;

        let id = self.next_lease.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut set) = self.outstanding.lock() {
            set.insert(id);
        }
        debug!(lease = id, bytes = stdout.trim().len(), "device mode acquired");

        Ok(DeviceModeHandle {
            id,
            printer: printer.to_string(),
            defaults: DeviceMode::new(stdout.trim().as_bytes().to_vec()),
        })
    }

    fn release_device_mode(&self, handle: DeviceModeHandle) {
        let removed = self
            .outstanding
            .lock()
            .map(|mut set| set.remove(&handle.id))
            .unwrap_or(false);
        if removed {
            debug!(lease = handle.id, printer = %handle.printer, "device mode released");
        } else {
            warn!(lease = handle.id, "device mode released twice or never acquired");
        }
    }
}

impl PrintSpooler for CupsBridge {
    #[instrument(skip_all, fields(path = %request.path.display(), printer = config.printer()))]
    fn submit(
        &self,
        request: &PrintRequest,
        config: &PrintConfiguration,
        done: CompletionSignal,
    ) -> Result<()> {
        let args = lp_arguments(request, config);
        let child = Command::new(&self.programs.lp_program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BatchPrintError::Spooler(format!("{}: {e}", self.programs.lp_program)))?;

        info!(pages = request.page_count, title = %request.job_title, "submitted to CUPS");

        std::thread::Builder::new()
            .name("lp-wait".into())
            .spawn(move || {
                let result = match child.wait_with_output() {
                    Ok(output) if output.status.success() => {
                        let stdout = String::from_utf8_lossy(&output.stdout);
                        info!(response = %stdout.trim(), "lp finished");
                        Ok(())
                    }
                    Ok(output) => Err(BatchPrintError::Spooler(format!(
                        "lp exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ))),
                    Err(e) => Err(BatchPrintError::Spooler(format!("waiting for lp: {e}"))),
                };
                done.finish(result);
            })
            .map_err(|e| BatchPrintError::Spooler(format!("spawn lp waiter: {e}")))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// `lpstat -e`: one destination per line.
fn parse_destinations(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_whitespace().next().unwrap_or(line).to_string())
        .collect()
}

/// `lpstat -p`: "printer NAME is idle.  enabled since ...".
fn parse_printer_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("printer "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// `lpstat -d`: "system default destination: NAME".
fn parse_default_destination(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("system default destination:"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Split `lpoptions` output into `key=value` pairs, honouring single quotes.
fn parse_options(blob: &str) -> Vec<(String, String)> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in blob.chars() {
        match ch {
            '\'' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .filter_map(|token| {
            let (key, value) = token.split_once('=')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Options from the device mode that `lp -o` should receive.
fn job_options(device_mode: &DeviceMode) -> Vec<(String, String)> {
    let blob = String::from_utf8_lossy(device_mode.as_bytes());
    parse_options(&blob)
        .into_iter()
        .filter(|(key, _)| {
            !NON_JOB_OPTION_PREFIXES
                .iter()
                .any(|prefix| key.starts_with(prefix))
        })
        .collect()
}

fn lp_arguments(request: &PrintRequest, config: &PrintConfiguration) -> Vec<String> {
    let mut args = vec![
        "-d".to_string(),
        config.printer().to_string(),
        "-t".to_string(),
        request.job_title.clone(),
    ];
    for (key, value) in job_options(config.device_mode()) {
        args.push("-o".into());
        args.push(format!("{key}={value}"));
    }
    args.push("--".into());
    args.push(request.path.display().to_string());
    args
}
