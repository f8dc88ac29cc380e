//! Action data model for the executor.
//!
//! An `Action` is the atomic unit of remediation: an opaque command paired
//! with the reasons it was chosen. The decision engine produces them in
//! order; the `Executor` applies them one at a time and reports each
//! attempt as an `ExecutionOutcome`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A command to run against a cluster, with its justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Command text. Never parsed or validated here.
    pub sql: String,
    /// Human-readable justification, carried through to the audit trail.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// What the decision engine expects the command to change. Shown by
    /// dry-run only.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub expected_state_delta: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            reasons: Vec::new(),
            expected_state_delta: serde_json::Map::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }
}

// ---------------------------------------------------------------------------
// CommandResult
// ---------------------------------------------------------------------------

/// What the target reported after running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    #[serde(default)]
    pub rowcount: Option<u64>,
}

impl CommandResult {
    pub fn with_rowcount(rowcount: u64) -> Self {
        Self {
            rowcount: Some(rowcount),
        }
    }

    /// Rows affected, if the target reported a positive count.
    pub fn affected_rows(&self) -> Option<u64> {
        self.rowcount.filter(|n| *n > 0)
    }
}

// ---------------------------------------------------------------------------
// ExecutionOutcome
// ---------------------------------------------------------------------------

/// Result of attempting a single action.
///
/// Transitions: `Pending → Executing → Succeeded | Failed → Audited`
///
/// Both terminal execution states are always followed by an audit attempt.
/// A `Failed` outcome stops the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded { result: CommandResult },
    Failed { error_message: String },
}

impl ExecutionOutcome {
    pub fn executed(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { error_message } => Some(error_message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_deserializes_without_optional_fields() {
        let action: Action = serde_yaml::from_str("sql: DROP CLUSTER REPLICA c.r1").unwrap();
        assert_eq!(action.sql, "DROP CLUSTER REPLICA c.r1");
        assert!(action.reasons.is_empty());
        assert!(action.expected_state_delta.is_empty());
    }

    #[test]
    fn zero_rowcount_is_not_affected_rows() {
        assert_eq!(CommandResult::with_rowcount(0).affected_rows(), None);
        assert_eq!(CommandResult::default().affected_rows(), None);
        assert_eq!(CommandResult::with_rowcount(3).affected_rows(), Some(3));
    }

    #[test]
    fn outcome_reports_error_only_on_failure() {
        let ok = ExecutionOutcome::Succeeded {
            result: CommandResult::default(),
        };
        let failed = ExecutionOutcome::Failed {
            error_message: "syntax error".into(),
        };
        assert!(ok.executed());
        assert_eq!(ok.error_message(), None);
        assert!(!failed.executed());
        assert_eq!(failed.error_message(), Some("syntax error"));
    }
}
