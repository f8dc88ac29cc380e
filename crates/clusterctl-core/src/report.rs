//! Console transcript for executor runs.
//!
//! `render` maps an event to the exact lines an operator sees; events with no
//! console representation render to nothing. `ConsoleReporter` writes those
//! lines to any `Write`, typically stdout.

use std::cell::RefCell;
use std::io::Write;

use crate::event::{EventSink, ExecutionEvent};
use crate::summary::ExecutionSummary;

pub fn render(event: &ExecutionEvent) -> Vec<String> {
    match event {
        ExecutionEvent::ActionSucceeded { sql, result, .. } => {
            let mut lines = vec![format!("✓ {sql}")];
            if let Some(rows) = result.affected_rows() {
                lines.push(format!("  Affected rows: {rows}"));
            }
            lines
        }
        ExecutionEvent::ActionFailed { sql, error, .. } => {
            vec![format!("✗ {sql}"), format!("  Error: {error}"), String::new()]
        }
        ExecutionEvent::RunCompleted { summary, .. } => render_summary(summary),
        _ => Vec::new(),
    }
}

pub fn render_summary(summary: &ExecutionSummary) -> Vec<String> {
    if summary.is_success() {
        return vec![format!(
            "All {} actions executed successfully",
            summary.executed
        )];
    }

    let mut lines = vec![
        format!(
            "Execution completed with errors: {}/{} actions succeeded",
            summary.executed, summary.total
        ),
        "Errors:".to_string(),
    ];
    for error in &summary.errors {
        lines.push(format!("  Action {}: {}", error.action_index, error.error));
    }
    lines
}

/// Renders events to a writer as they arrive.
pub struct ConsoleReporter<W: Write> {
    out: RefCell<W>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> EventSink for ConsoleReporter<W> {
    fn emit(&self, event: &ExecutionEvent) {
        let lines = render(event);
        if lines.is_empty() {
            return;
        }
        let mut out = self.out.borrow_mut();
        for line in lines {
            if let Err(e) = writeln!(out, "{line}") {
                tracing::warn!(error = %e, "failed to write execution report");
                return;
            }
        }
        let _ = out.flush();
    }
}
