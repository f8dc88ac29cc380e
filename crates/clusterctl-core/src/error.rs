use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterctlError {
    /// The target rejected a command. Carries the raw message so it can be
    /// reported verbatim.
    #[error("{0}")]
    CommandExecution(String),

    #[error("audit logging failed: {0}")]
    AuditLogging(String),

    #[error("unsupported database url '{0}': expected a SQLite path or a sqlite:// or file: url")]
    UnsupportedDatabaseUrl(String),

    #[error("invalid cluster id '{0}': must not be blank")]
    InvalidClusterId(String),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("invalid cluster filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClusterctlError>;
