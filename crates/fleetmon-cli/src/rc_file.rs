//! Loads poll targets from the operator's shell rc file.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use fleetmon_core::{parse_targets, ServerTarget};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("rc file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("failed to read rc file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    // File exists but holds no ssh aliases; reported separately from a
    // missing file.
    #[error("no ssh aliases found in {0}")]
    NoTargets(PathBuf),

    #[error("could not determine home directory")]
    NoHomeDir,
}

pub fn default_rc_path() -> Result<PathBuf, DiscoveryError> {
    dirs::home_dir()
        .map(|home| home.join(".zshrc"))
        .ok_or(DiscoveryError::NoHomeDir)
}

/// Read `path` and extract every ssh alias as a target.
pub fn load_targets(path: &Path) -> Result<Vec<ServerTarget>, DiscoveryError> {
    if !path.exists() {
        return Err(DiscoveryError::ConfigNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| DiscoveryError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let targets = parse_targets(&text);
    if targets.is_empty() {
        return Err(DiscoveryError::NoTargets(path.to_path_buf()));
    }
    info!(targets = targets.len(), path = %path.display(), "discovered poll targets");
    Ok(targets)
}
