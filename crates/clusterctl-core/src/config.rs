use crate::error::Result;
use crate::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project configuration stored in `.clusterctl/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding the target and its audit table. Relative paths
    /// resolve against the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Regex on cluster names applied when no `--filter-clusters` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_filter: Option<String>,
}

impl Config {
    /// Load the config, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Database path: explicit override, then config, then the default
    /// location under `.clusterctl/`.
    pub fn database_path(&self, root: &Path, explicit: Option<&Path>) -> PathBuf {
        let configured = self
            .database
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty());
        match explicit.or(configured) {
            Some(p) => paths::resolve(root, p),
            None => paths::default_database_path(root),
        }
    }

    pub fn cluster_filter(&self) -> Result<Option<Regex>> {
        Ok(self.cluster_filter.as_deref().map(Regex::new).transpose()?)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(db) = &self.database {
            if db.as_os_str().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "database path is empty; the default location will be used"
                        .to_string(),
                });
            }
        }

        if let Some(filter) = &self.cluster_filter {
            if let Err(e) = Regex::new(filter) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("cluster_filter '{filter}' is not a valid regex: {e}"),
                });
            }
        }

        warnings
    }
}
