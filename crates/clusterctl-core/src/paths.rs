use std::path::{Path, PathBuf};

use crate::error::{ClusterctlError, Result};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CLUSTERCTL_DIR: &str = ".clusterctl";
pub const CONFIG_FILE: &str = ".clusterctl/config.yaml";
pub const DATABASE_FILE: &str = ".clusterctl/clusterctl.db";

/// Audit table written by `SqliteDatabase::log_action`.
pub const ACTIONS_TABLE: &str = "mz_cluster_strategy_actions";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn clusterctl_dir(root: &Path) -> PathBuf {
    root.join(CLUSTERCTL_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn default_database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Resolve a configured path against the project root. Absolute paths are
/// returned unchanged.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Turn a `--database` value or `DATABASE_URL` into a SQLite file path.
///
/// Accepts a bare path, `sqlite://path`, `sqlite:path`, `file://path` and
/// `file:path`. Any other `scheme://` value names a server this tool cannot
/// reach and is rejected rather than created as a local file.
pub fn database_path_from_url(value: &str) -> Result<PathBuf> {
    let path = match ["sqlite://", "sqlite:", "file://", "file:"]
        .iter()
        .find_map(|scheme| value.strip_prefix(scheme))
    {
        // urls may carry connection options
        Some(rest) => rest.split_once('?').map_or(rest, |(path, _)| path),
        None => value,
    };

    if path.trim().is_empty() || path.contains("://") {
        return Err(ClusterctlError::UnsupportedDatabaseUrl(value.to_string()));
    }
    Ok(PathBuf::from(path))
}
