use crate::output::{print_json, print_table};
use anyhow::Context;
use clusterctl_core::{audit::AuditRecord, config::Config, sqlite::SqliteDatabase};
use std::path::Path;

pub fn run(
    root: &Path,
    database: Option<&Path>,
    cluster: Option<&str>,
    limit: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let db_path = config.database_path(root, database);
    let db = SqliteDatabase::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let records = db
        .list_actions(cluster, limit)
        .context("failed to read audit trail")?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No audited actions.");
        return Ok(());
    }

    print_table(
        &["ACTION ID", "CLUSTER", "RESULT", "CREATED", "SQL", "ERROR"],
        records.iter().map(row).collect(),
    );
    Ok(())
}

fn row(record: &AuditRecord) -> Vec<String> {
    vec![
        record.action_id.to_string(),
        record.cluster_id.clone(),
        if record.executed { "✓" } else { "✗" }.to_string(),
        record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        record.action_sql.clone(),
        record.error_message.clone().unwrap_or_default(),
    ]
}
