use serde::{Deserialize, Serialize};

/// A failed action as recorded in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    /// 1-based position in the input list.
    pub action_index: usize,
    pub sql: String,
    pub error: String,
}

/// Outcome of one `Executor::execute` run.
///
/// `total` is fixed at the start of the run. Under fail-fast `failed` is at
/// most 1 and `errors.len() == failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub executed: usize,
    pub failed: usize,
    pub errors: Vec<ActionError>,
}

impl ExecutionSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.executed += 1;
    }

    pub fn record_failure(&mut self, action_index: usize, sql: &str, error: &str) {
        self.failed += 1;
        self.errors.push(ActionError {
            action_index,
            sql: sql.to_string(),
            error: error.to_string(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Actions that were never attempted because the run stopped early.
    pub fn not_attempted(&self) -> usize {
        self.total - self.executed - self.failed
    }
}
