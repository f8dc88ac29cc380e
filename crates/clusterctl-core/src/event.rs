//! Structured events emitted by the `Executor`.
//!
//! The executor never logs or prints directly. It hands every event to the
//! `EventSink` it was built with; `TracingSink` turns events into `tracing`
//! records and `report::ConsoleReporter` renders the human-readable
//! transcript. Sinks compose with a tuple: `(ConsoleReporter, TracingSink)`.

use serde::Serialize;
use std::cell::RefCell;

use crate::action::CommandResult;
use crate::audit::{ActionId, DecisionContext};
use crate::summary::ExecutionSummary;

// ---------------------------------------------------------------------------
// ExecutionEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
    RunStarted {
        cluster_id: String,
        total_actions: usize,
    },
    ActionStarted {
        cluster_id: String,
        action_index: usize,
        total_actions: usize,
        sql: String,
    },
    ActionSucceeded {
        cluster_id: String,
        action_index: usize,
        sql: String,
        result: CommandResult,
    },
    ActionFailed {
        cluster_id: String,
        action_index: usize,
        sql: String,
        error: String,
        context: DecisionContext,
    },
    AuditAttempted {
        cluster_id: String,
        action_index: usize,
        executed: bool,
    },
    AuditRecorded {
        cluster_id: String,
        action_index: usize,
        action_id: ActionId,
        executed: bool,
    },
    AuditFailed {
        cluster_id: String,
        action_index: usize,
        sql: String,
        error: String,
    },
    RunStopped {
        cluster_id: String,
        failed_action_index: usize,
        remaining_actions: usize,
    },
    RunCompleted {
        cluster_id: String,
        summary: ExecutionSummary,
    },
}

impl ExecutionEvent {
    pub fn level(&self) -> tracing::Level {
        match self {
            Self::RunStarted { .. }
            | Self::ActionStarted { .. }
            | Self::AuditAttempted { .. }
            | Self::AuditRecorded { .. } => tracing::Level::DEBUG,
            Self::ActionSucceeded { .. } | Self::RunCompleted { .. } => tracing::Level::INFO,
            Self::RunStopped { .. } => tracing::Level::WARN,
            Self::ActionFailed { .. } | Self::AuditFailed { .. } => tracing::Level::ERROR,
        }
    }

    pub fn cluster_id(&self) -> &str {
        match self {
            Self::RunStarted { cluster_id, .. }
            | Self::ActionStarted { cluster_id, .. }
            | Self::ActionSucceeded { cluster_id, .. }
            | Self::ActionFailed { cluster_id, .. }
            | Self::AuditAttempted { cluster_id, .. }
            | Self::AuditRecorded { cluster_id, .. }
            | Self::AuditFailed { cluster_id, .. }
            | Self::RunStopped { cluster_id, .. }
            | Self::RunCompleted { cluster_id, .. } => cluster_id,
        }
    }
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Receives executor events in the order they happen.
pub trait EventSink {
    fn emit(&self, event: &ExecutionEvent);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: &ExecutionEvent) {
        (**self).emit(event)
    }
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&self, event: &ExecutionEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &ExecutionEvent) {}
}

/// Keeps every event in memory, for callers that inspect a run afterwards.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<ExecutionEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.borrow().clone()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &ExecutionEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// TracingSink
// ---------------------------------------------------------------------------

/// Emit a `tracing` event at a level chosen at runtime. The level macros need
/// a constant level, so this dispatches to one of them.
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {{
        let level = $level;
        if level == tracing::Level::ERROR {
            tracing::error!($($arg)+)
        } else if level == tracing::Level::WARN {
            tracing::warn!($($arg)+)
        } else if level == tracing::Level::INFO {
            tracing::info!($($arg)+)
        } else if level == tracing::Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    }};
}

/// Forwards events to `tracing` with structured fields, at the severity
/// given by `ExecutionEvent::level`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ExecutionEvent) {
        let level = event.level();
        match event {
            ExecutionEvent::RunStarted {
                cluster_id,
                total_actions,
            } => {
                event_at!(level, %cluster_id, total_actions, "starting action execution");
            }
            ExecutionEvent::ActionStarted {
                cluster_id,
                action_index,
                total_actions,
                sql,
            } => {
                event_at!(
                    level,
                    %cluster_id,
                    action_sql = %sql,
                    "executing action {action_index}/{total_actions}"
                );
            }
            ExecutionEvent::ActionSucceeded {
                cluster_id,
                action_index,
                sql,
                result,
            } => {
                event_at!(
                    level,
                    %cluster_id,
                    action_index,
                    action_sql = %sql,
                    rowcount = result.rowcount.unwrap_or(0),
                    "action executed successfully"
                );
            }
            ExecutionEvent::ActionFailed {
                cluster_id,
                action_index,
                sql,
                error,
                context,
            } => {
                let context = serde_json::to_string(context).unwrap_or_default();
                event_at!(
                    level,
                    %cluster_id,
                    action_index,
                    action_sql = %sql,
                    %error,
                    %context,
                    "action execution failed"
                );
            }
            ExecutionEvent::AuditAttempted {
                cluster_id,
                action_index,
                executed,
            } => {
                event_at!(
                    level,
                    %cluster_id,
                    action_index,
                    executed,
                    "logging action to audit table"
                );
            }
            ExecutionEvent::AuditRecorded {
                cluster_id,
                action_index,
                action_id,
                executed,
            } => {
                event_at!(
                    level,
                    %cluster_id,
                    action_index,
                    %action_id,
                    executed,
                    "action logged to audit table"
                );
            }
            ExecutionEvent::AuditFailed {
                cluster_id,
                action_index,
                sql,
                error,
            } => {
                event_at!(
                    level,
                    %cluster_id,
                    action_index,
                    action_sql = %sql,
                    audit_error = %error,
                    "failed to log action to audit table"
                );
            }
            ExecutionEvent::RunStopped {
                cluster_id,
                failed_action_index,
                remaining_actions,
            } => {
                event_at!(
                    level,
                    %cluster_id,
                    failed_action_index,
                    remaining_actions,
                    "stopping execution due to error"
                );
            }
            ExecutionEvent::RunCompleted {
                cluster_id,
                summary,
            } => {
                let summary_json = serde_json::to_string(summary).unwrap_or_default();
                event_at!(
                    level,
                    %cluster_id,
                    executed = summary.executed,
                    failed = summary.failed,
                    total = summary.total,
                    summary = %summary_json,
                    "action execution completed"
                );
            }
        }
    }
}
