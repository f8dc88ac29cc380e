use crate::cmd::plan::load_filtered;
use crate::output::print_json;
use anyhow::Context;
use clusterctl_core::{
    config::Config, report::ConsoleReporter, sqlite::SqliteDatabase, ExecutionSummary, Executor,
    TracingSink,
};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ClusterRun {
    cluster_id: String,
    cluster_name: String,
    summary: ExecutionSummary,
}

/// Execute every cluster's actions in plan order. Command failures stop that
/// cluster's run and show up in its summary; they do not fail the process.
pub fn run(
    root: &Path,
    database: Option<&Path>,
    plan_path: &Path,
    filter: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let plan = load_filtered(root, plan_path, filter)?;

    let total_actions = plan.total_actions();
    if total_actions == 0 {
        tracing::info!("no actions to execute");
        if json {
            return print_json(&Vec::<ClusterRun>::new());
        }
        println!("No actions to execute.");
        return Ok(());
    }

    let config = Config::load(root).context("failed to load config")?;
    let db_path = config.database_path(root, database);
    let db = SqliteDatabase::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    if json {
        let mut runs = Vec::new();
        let executor = Executor::new(&db, TracingSink);
        for cluster in plan.clusters.iter().filter(|c| !c.actions.is_empty()) {
            let summary = executor
                .execute(&cluster.id, &cluster.actions)
                .with_context(|| format!("failed to execute actions for '{}'", cluster.name))?;
            runs.push(ClusterRun {
                cluster_id: cluster.id.clone(),
                cluster_name: cluster.name.clone(),
                summary,
            });
        }
        return print_json(&runs);
    }

    println!("Executing {total_actions} actions...");
    let executor = Executor::new(&db, (ConsoleReporter::stdout(), TracingSink));
    for cluster in plan.clusters.iter().filter(|c| !c.actions.is_empty()) {
        println!("\nProcessing cluster: {}", cluster.name);
        executor
            .execute(&cluster.id, &cluster.actions)
            .with_context(|| format!("failed to execute actions for '{}'", cluster.name))?;
        println!();
    }

    Ok(())
}
