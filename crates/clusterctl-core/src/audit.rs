//! Audit trail data model.
//!
//! Every attempted action produces one audit record, whether or not the
//! command succeeded. The `DecisionContext` travels with the record and
//! describes why the action ran and what happened; nothing reads it back to
//! make decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::action::{CommandResult, ExecutionOutcome};

// ---------------------------------------------------------------------------
// ActionId
// ---------------------------------------------------------------------------

/// Identifier assigned by the audit store to a logged action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// DecisionContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub action_index: usize,
    pub total_actions: usize,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_result: Option<CommandResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecisionContext {
    pub fn new(action_index: usize, total_actions: usize, reasons: &[String]) -> Self {
        Self {
            action_index,
            total_actions,
            reasons: reasons.to_vec(),
            execution_result: None,
            error: None,
        }
    }

    /// Merge the outcome of the attempt into the context.
    pub fn record(&mut self, outcome: &ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Succeeded { result } => {
                self.execution_result = Some(result.clone());
                self.error = None;
            }
            ExecutionOutcome::Failed { error_message } => {
                self.execution_result = None;
                self.error = Some(error_message.clone());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// AuditRecord
// ---------------------------------------------------------------------------

/// A persisted audit row, as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action_id: ActionId,
    pub cluster_id: String,
    pub action_sql: String,
    pub decision_ctx: serde_json::Value,
    pub executed: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_context_carries_result_only() {
        let mut ctx = DecisionContext::new(1, 2, &["idle".to_string()]);
        ctx.record(&ExecutionOutcome::Succeeded {
            result: CommandResult::with_rowcount(3),
        });

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["action_index"], 1);
        assert_eq!(json["total_actions"], 2);
        assert_eq!(json["reasons"][0], "idle");
        assert_eq!(json["execution_result"]["rowcount"], 3);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_context_carries_error_only() {
        let mut ctx = DecisionContext::new(2, 2, &[]);
        ctx.record(&ExecutionOutcome::Failed {
            error_message: "syntax error".into(),
        });

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["error"], "syntax error");
        assert!(json.get("execution_result").is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ActionId::generate(), ActionId::generate());
    }
}
