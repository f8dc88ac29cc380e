//! The collaborator the executor runs commands through and audits to.

use crate::action::CommandResult;
use crate::audit::{ActionId, DecisionContext};
use crate::error::Result;

/// Command execution and audit storage for one target.
///
/// Implementations report command failures as
/// `ClusterctlError::CommandExecution` and audit failures as
/// `ClusterctlError::AuditLogging`. Both calls block; timeouts belong to the
/// implementation.
pub trait Database {
    fn execute_command(&self, sql: &str) -> Result<CommandResult>;

    fn log_action(
        &self,
        cluster_id: &str,
        action_sql: &str,
        decision_ctx: &DecisionContext,
        executed: bool,
        error_message: Option<&str>,
    ) -> Result<ActionId>;
}

impl<T: Database + ?Sized> Database for &T {
    fn execute_command(&self, sql: &str) -> Result<CommandResult> {
        (**self).execute_command(sql)
    }

    fn log_action(
        &self,
        cluster_id: &str,
        action_sql: &str,
        decision_ctx: &DecisionContext,
        executed: bool,
        error_message: Option<&str>,
    ) -> Result<ActionId> {
        (**self).log_action(cluster_id, action_sql, decision_ctx, executed, error_message)
    }
}
