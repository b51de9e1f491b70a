// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "batchprint";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .join(APP_DIR);
    // Runs before logging is up; a failure surfaces when the config is saved.
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// XDG data home, then `~/.local/share`, then `/tmp`.
fn base_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(xdg) = xdg_data_home.filter(|p| !p.as_os_str().is_empty()) {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".local").join("share");
    }
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = base_dir(Some("/xdg".into()), Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/xdg"));
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        let dir = base_dir(Some(PathBuf::new()), Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/home/ada/.local/share"));
    }

    #[test]
    fn nothing_set_uses_tmp() {
        assert_eq!(base_dir(None, None), PathBuf::from("/tmp"));
    }
}
