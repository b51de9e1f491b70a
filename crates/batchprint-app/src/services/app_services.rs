// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the queue handle, the platform bridge, and
// the persisted config, and gives the Dioxus UI async-friendly calls.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use batchprint_bridge::{PlatformBridge, platform_bridge};
use batchprint_core::AppConfig;
use batchprint_core::error::Result;
use batchprint_print::{QueueHandle, QueueService, StartOutcome};
use tracing::{info, warn};

use super::dialogs::NativeConfigurationDialog;

const CONFIG_FILE: &str = "config.json";

/// Shared application services, reachable from every component.
///
/// Cheap to clone; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    queue: QueueHandle,
    bridge: Arc<dyn PlatformBridge>,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl AppServices {
    /// Start the queue coordinator. Must run inside the tokio runtime.
    pub fn init(config: AppConfig, data_dir: PathBuf) -> Self {
        let bridge = platform_bridge(&config.spooler);
        info!(
            platform = bridge.platform_name(),
            path = %data_dir.display(),
            "initialising app services"
        );
        let queue = QueueService::spawn(Arc::clone(&bridge), Arc::new(NativeConfigurationDialog));

        Self {
            queue,
            bridge,
            data_dir,
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn queue(&self) -> &QueueHandle {
        &self.queue
    }

    // -- Printers ------------------------------------------------------------

    /// Installed printer names, or an empty list if the catalog fails.
    pub fn installed_printers(&self) -> Vec<String> {
        self.bridge.installed_printers().unwrap_or_else(|e| {
            warn!(error = %e, "could not list printers");
            Vec::new()
        })
    }

    /// Printer to preselect: the remembered one if still installed, else the
    /// system default, else the first installed printer.
    pub fn initial_printer(&self, installed: &[String]) -> Option<String> {
        let remembered = self.config().default_printer;
        let system = self.bridge.default_printer().unwrap_or_else(|e| {
            warn!(error = %e, "could not read the system default printer");
            None
        });
        pick_initial_printer(installed, remembered.as_deref(), system.as_deref())
    }

    // -- Printing ------------------------------------------------------------

    /// Start a run and remember the printer if it actually started.
    pub async fn print(&self, printer: String) -> Result<StartOutcome> {
        let outcome = self.queue.start_run(printer.clone()).await?;
        if matches!(outcome, StartOutcome::Started(_)) {
            self.remember_printer(&printer);
        }
        Ok(outcome)
    }

    fn remember_printer(&self, printer: &str) {
        let mut config = self.config();
        if config.default_printer.as_deref() == Some(printer) {
            return;
        }
        config.default_printer = Some(printer.to_string());
        if let Err(e) = self.save_config(&config) {
            warn!(error = %e, "could not remember the printer");
        }
    }

    // -- Config Persistence --------------------------------------------------

    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        config.save(config_path(&self.data_dir))
    }
}

/// Load `config.json` from the data directory, if present and valid.
///
/// Called before logging is set up, so it does not log.
pub fn load_config(data_dir: &Path) -> Option<AppConfig> {
    AppConfig::load(config_path(data_dir))
}

fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

fn pick_initial_printer(
    installed: &[String],
    remembered: Option<&str>,
    system: Option<&str>,
) -> Option<String> {
    [remembered, system]
        .into_iter()
        .flatten()
        .find(|name| installed.iter().any(|p| p == name))
        .map(str::to_string)
        .or_else(|| installed.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed() -> Vec<String> {
        vec!["Laser".into(), "Inkjet".into()]
    }

    #[test]
    fn remembered_printer_wins() {
        let pick = pick_initial_printer(&installed(), Some("Inkjet"), Some("Laser"));
        assert_eq!(pick.as_deref(), Some("Inkjet"));
    }

    #[test]
    fn uninstalled_remembered_printer_falls_back_to_system_default() {
        let pick = pick_initial_printer(&installed(), Some("Gone"), Some("Laser"));
        assert_eq!(pick.as_deref(), Some("Laser"));
    }

    #[test]
    fn nothing_known_selects_first_installed() {
        let pick = pick_initial_printer(&installed(), None, None);
        assert_eq!(pick.as_deref(), Some("Laser"));

        let pick = pick_initial_printer(&installed(), Some("Gone"), Some("AlsoGone"));
        assert_eq!(pick.as_deref(), Some("Laser"));
    }

    #[test]
    fn single_printer_is_preselected() {
        let only = vec!["Inkjet".to_string()];
        assert_eq!(pick_initial_printer(&only, None, None).as_deref(), Some("Inkjet"));
    }

    #[test]
    fn no_installed_printers_selects_nothing() {
        assert_eq!(pick_initial_printer(&[], Some("Laser"), Some("Laser")), None);
    }
}
