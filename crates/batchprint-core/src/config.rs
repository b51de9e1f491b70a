// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Printer preselected in the printer list (last one used).
    pub default_printer: Option<String>,
    /// Ask Yes/No before Clear and Remove Deselected.
    pub confirm_destructive_actions: bool,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// External commands used by the CUPS spooler backend.
    pub spooler: SpoolerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_printer: None,
            confirm_destructive_actions: true,
            log_level: "info".into(),
            spooler: SpoolerConfig::default(),
        }
    }
}

/// Program names for the CUPS command-line tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolerConfig {
    /// Submits a job (`lp -d <printer> -- <file>`).
    pub lp_program: String,
    /// Lists printers and the system default.
    pub lpstat_program: String,
    /// Reads a printer's saved options.
    pub lpoptions_program: String,
}

impl Default for SpoolerConfig {
    fn default() -> Self {
        Self {
            lp_program: "lp".into(),
            lpstat_program: "lpstat".into(),
            lpoptions_program: "lpoptions".into(),
        }
    }
}

impl AppConfig {
    /// Read the config file, or `None` if it is missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let data = std::fs::read_to_string(path.as_ref()).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Write the config file as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
