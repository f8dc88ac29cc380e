//! Fail-fast, audited execution of an ordered action list.
//!
//! For each action the executor runs the command, classifies the outcome,
//! always writes an audit record, and stops at the first failure. Command
//! failures become data in the returned `ExecutionSummary`; audit failures
//! are reported as events and otherwise ignored.

use crate::action::{Action, ExecutionOutcome};
use crate::audit::{ActionId, DecisionContext};
use crate::database::Database;
use crate::error::{ClusterctlError, Result};
use crate::event::{EventSink, ExecutionEvent, TracingSink};
use crate::summary::ExecutionSummary;

pub struct Executor<D, S = TracingSink> {
    db: D,
    sink: S,
}

impl<D: Database> Executor<D> {
    /// Executor that reports through `tracing` only.
    pub fn with_tracing(db: D) -> Self {
        Self::new(db, TracingSink)
    }
}

impl<D: Database, S: EventSink> Executor<D, S> {
    pub fn new(db: D, sink: S) -> Self {
        Self { db, sink }
    }

    pub fn into_parts(self) -> (D, S) {
        (self.db, self.sink)
    }

    /// Apply `actions` to `cluster_id` in order.
    ///
    /// Returns an error only for a blank `cluster_id`; every command or audit
    /// failure is reflected in the summary or the event stream instead.
    pub fn execute(&self, cluster_id: &str, actions: &[Action]) -> Result<ExecutionSummary> {
        if actions.is_empty() {
            return Ok(ExecutionSummary::default());
        }
        if cluster_id.trim().is_empty() {
            return Err(ClusterctlError::InvalidClusterId(cluster_id.to_string()));
        }

        let total = actions.len();
        let mut summary = ExecutionSummary::new(total);
        self.sink.emit(&ExecutionEvent::RunStarted {
            cluster_id: cluster_id.to_string(),
            total_actions: total,
        });

        for (offset, action) in actions.iter().enumerate() {
            let action_index = offset + 1;
            let outcome = self.attempt(cluster_id, action, action_index, total, &mut summary);

            if !outcome.executed() {
                self.sink.emit(&ExecutionEvent::RunStopped {
                    cluster_id: cluster_id.to_string(),
                    failed_action_index: action_index,
                    remaining_actions: total - action_index,
                });
                break;
            }
        }

        self.sink.emit(&ExecutionEvent::RunCompleted {
            cluster_id: cluster_id.to_string(),
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Execute one action and audit it. The audit is issued on every exit
    /// path, including an unwind out of `execute_command` or the sink.
    fn attempt(
        &self,
        cluster_id: &str,
        action: &Action,
        action_index: usize,
        total: usize,
        summary: &mut ExecutionSummary,
    ) -> ExecutionOutcome {
        let mut context = DecisionContext::new(action_index, total, &action.reasons);
        self.sink.emit(&ExecutionEvent::ActionStarted {
            cluster_id: cluster_id.to_string(),
            action_index,
            total_actions: total,
            sql: action.sql.clone(),
        });

        let mut guard = AuditGuard::arm(self, cluster_id, action, action_index, total);

        let outcome = match self.db.execute_command(&action.sql) {
            Ok(result) => ExecutionOutcome::Succeeded { result },
            Err(e) => ExecutionOutcome::Failed {
                error_message: command_error_message(e),
            },
        };
        context.record(&outcome);
        guard.settle(&context, &outcome);

        match &outcome {
            ExecutionOutcome::Succeeded { result } => {
                summary.record_success();
                self.sink.emit(&ExecutionEvent::ActionSucceeded {
                    cluster_id: cluster_id.to_string(),
                    action_index,
                    sql: action.sql.clone(),
                    result: result.clone(),
                });
            }
            ExecutionOutcome::Failed { error_message } => {
                summary.record_failure(action_index, &action.sql, error_message);
                self.sink.emit(&ExecutionEvent::ActionFailed {
                    cluster_id: cluster_id.to_string(),
                    action_index,
                    sql: action.sql.clone(),
                    error: error_message.clone(),
                    context: context.clone(),
                });
            }
        }

        guard.complete();
        outcome
    }

    /// Persist one audit record. Failures are reported and swallowed.
    fn audit(
        &self,
        cluster_id: &str,
        action: &Action,
        action_index: usize,
        context: &DecisionContext,
        executed: bool,
        error_message: Option<&str>,
    ) -> Option<ActionId> {
        self.sink.emit(&ExecutionEvent::AuditAttempted {
            cluster_id: cluster_id.to_string(),
            action_index,
            executed,
        });

        match self
            .db
            .log_action(cluster_id, &action.sql, context, executed, error_message)
        {
            Ok(action_id) => {
                self.sink.emit(&ExecutionEvent::AuditRecorded {
                    cluster_id: cluster_id.to_string(),
                    action_index,
                    action_id: action_id.clone(),
                    executed,
                });
                Some(action_id)
            }
            Err(e) => {
                self.sink.emit(&ExecutionEvent::AuditFailed {
                    cluster_id: cluster_id.to_string(),
                    action_index,
                    sql: action.sql.clone(),
                    error: e.to_string(),
                });
                None
            }
        }
    }
}

fn command_error_message(err: ClusterctlError) -> String {
    match err {
        ClusterctlError::CommandExecution(message) => message,
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// AuditGuard
// ---------------------------------------------------------------------------

const UNWOUND_MESSAGE: &str = "command execution panicked";

/// Owns the pending audit for one attempt. `settle` records the real
/// outcome as soon as the command returns; the audit is issued by `complete`
/// or, if the attempt unwinds first, by `Drop`. An unsettled guard audits the
/// action as not executed.
struct AuditGuard<'a, D: Database, S: EventSink> {
    executor: &'a Executor<D, S>,
    cluster_id: &'a str,
    action: &'a Action,
    action_index: usize,
    total: usize,
    settled: Option<(DecisionContext, ExecutionOutcome)>,
    issued: bool,
}

impl<'a, D: Database, S: EventSink> AuditGuard<'a, D, S> {
    fn arm(
        executor: &'a Executor<D, S>,
        cluster_id: &'a str,
        action: &'a Action,
        action_index: usize,
        total: usize,
    ) -> Self {
        Self {
            executor,
            cluster_id,
            action,
            action_index,
            total,
            settled: None,
            issued: false,
        }
    }

    fn settle(&mut self, context: &DecisionContext, outcome: &ExecutionOutcome) {
        self.settled = Some((context.clone(), outcome.clone()));
    }

    fn complete(mut self) -> Option<ActionId> {
        self.issue()
    }

    fn issue(&mut self) -> Option<ActionId> {
        self.issued = true;
        match self.settled.take() {
            Some((context, outcome)) => self.executor.audit(
                self.cluster_id,
                self.action,
                self.action_index,
                &context,
                outcome.executed(),
                outcome.error_message(),
            ),
            None => {
                let mut context =
                    DecisionContext::new(self.action_index, self.total, &self.action.reasons);
                context.error = Some(UNWOUND_MESSAGE.to_string());
                self.executor.audit(
                    self.cluster_id,
                    self.action,
                    self.action_index,
                    &context,
                    false,
                    Some(UNWOUND_MESSAGE),
                )
            }
        }
    }
}

impl<D: Database, S: EventSink> Drop for AuditGuard<'_, D, S> {
    fn drop(&mut self) {
        if !self.issued {
            self.issue();
        }
    }
}
