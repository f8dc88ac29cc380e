//! SQLite-backed `Database`: runs commands against the connected database and
//! keeps the audit trail in the `mz_cluster_strategy_actions` table of the
//! same file.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::action::CommandResult;
use crate::audit::{ActionId, AuditRecord, DecisionContext};
use crate::database::Database;
use crate::error::{ClusterctlError, Result};
use crate::paths::ACTIONS_TABLE;

pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Open or create the database at `path` and ensure the audit table
    /// exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            crate::io::ensure_dir(parent)?;
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.ensure_tables()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.ensure_tables()?;
        Ok(db)
    }

    pub fn ensure_tables(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {ACTIONS_TABLE} (
                action_id     TEXT    PRIMARY KEY,
                cluster_id    TEXT    NOT NULL,
                action_sql    TEXT    NOT NULL,
                decision_ctx  TEXT    NOT NULL,
                executed      INTEGER NOT NULL,
                error_message TEXT,
                created_at    TEXT    NOT NULL
            )"
        ))?;
        tracing::debug!(table = ACTIONS_TABLE, "audit table ensured");
        Ok(())
    }

    /// Audit records, newest first. `limit` of `None` returns everything.
    pub fn list_actions(
        &self,
        cluster_id: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT action_id, cluster_id, action_sql, decision_ctx, executed, error_message, created_at
             FROM {ACTIONS_TABLE}
             WHERE (?1 IS NULL OR cluster_id = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
        ))?;
        let limit = limit.map_or(-1, i64::from);

        let rows = stmt.query_map(params![cluster_id, limit], |row| {
            Ok(RawAuditRow {
                action_id: row.get(0)?,
                cluster_id: row.get(1)?,
                action_sql: row.get(2)?,
                decision_ctx: row.get(3)?,
                executed: row.get(4)?,
                error_message: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn total_changes(&self) -> rusqlite::Result<u64> {
        self.conn
            .query_row("SELECT total_changes()", [], |row| row.get::<_, i64>(0))
            .map(|n| n.max(0) as u64)
    }

    fn run_statement(&self, sql: &str) -> rusqlite::Result<CommandResult> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() > 0 {
            let mut rows = stmt.query([])?;
            let mut count = 0u64;
            while rows.next()?.is_some() {
                count += 1;
            }
            return Ok(CommandResult::with_rowcount(count));
        }

        // `changes()` is not reset by DDL, so measure the delta instead.
        let before = self.total_changes()?;
        stmt.execute([])?;
        let after = self.total_changes()?;
        Ok(CommandResult::with_rowcount(after.saturating_sub(before)))
    }
}

impl Database for SqliteDatabase {
    fn execute_command(&self, sql: &str) -> Result<CommandResult> {
        tracing::debug!(sql, "executing command");
        self.run_statement(sql).map_err(|e| {
            tracing::debug!(sql, error = %e, "command failed");
            ClusterctlError::CommandExecution(e.to_string())
        })
    }

    fn log_action(
        &self,
        cluster_id: &str,
        action_sql: &str,
        decision_ctx: &DecisionContext,
        executed: bool,
        error_message: Option<&str>,
    ) -> Result<ActionId> {
        let action_id = ActionId::generate();
        let ctx = serde_json::to_string(decision_ctx)
            .map_err(|e| ClusterctlError::AuditLogging(e.to_string()))?;

        self.conn
            .execute(
                &format!(
                    "INSERT INTO {ACTIONS_TABLE}
                     (action_id, cluster_id, action_sql, decision_ctx, executed, error_message, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params![
                    action_id.as_str(),
                    cluster_id,
                    action_sql,
                    ctx,
                    executed,
                    error_message,
                    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                ],
            )
            .map_err(|e| ClusterctlError::AuditLogging(e.to_string()))?;

        Ok(action_id)
    }
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

struct RawAuditRow {
    action_id: String,
    cluster_id: String,
    action_sql: String,
    decision_ctx: String,
    executed: bool,
    error_message: Option<String>,
    created_at: String,
}

impl RawAuditRow {
    fn into_record(self) -> Result<AuditRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| {
                ClusterctlError::AuditLogging(format!(
                    "bad created_at '{}' for action {}: {e}",
                    self.created_at, self.action_id
                ))
            })?
            .with_timezone(&Utc);
        Ok(AuditRecord {
            action_id: ActionId(self.action_id),
            cluster_id: self.cluster_id,
            action_sql: self.action_sql,
            decision_ctx: serde_json::from_str(&self.decision_ctx)?,
            executed: self.executed,
            error_message: self.error_message,
            created_at,
        })
    }
}
