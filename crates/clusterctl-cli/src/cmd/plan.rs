use crate::output::print_json;
use anyhow::Context;
use clusterctl_core::{config::Config, plan::Plan};
use regex::Regex;
use std::path::Path;

/// Load `plan_path` and apply the cluster filter: `--filter-clusters` first,
/// then `cluster_filter` from config.
pub fn load_filtered(root: &Path, plan_path: &Path, filter: Option<&str>) -> anyhow::Result<Plan> {
    let plan = Plan::load(plan_path)
        .with_context(|| format!("failed to load plan {}", plan_path.display()))?;

    let filter = match filter {
        Some(f) => Some(Regex::new(f).with_context(|| format!("invalid --filter-clusters '{f}'"))?),
        None => Config::load(root)
            .context("failed to load config")?
            .cluster_filter()
            .context("invalid cluster_filter in config")?,
    };

    Ok(match filter {
        Some(re) => plan.filter_clusters(&re),
        None => plan,
    })
}

// ---------------------------------------------------------------------------
// dry-run
// ---------------------------------------------------------------------------

pub fn run(root: &Path, plan_path: &Path, filter: Option<&str>, json: bool) -> anyhow::Result<()> {
    let plan = load_filtered(root, plan_path, filter)?;

    if json {
        return print_json(&plan);
    }

    if plan.total_actions() == 0 {
        println!("No actions would be taken.");
        return Ok(());
    }

    println!("Planned actions:");
    println!("{}", "=".repeat(60));

    for cluster in plan.clusters.iter().filter(|c| !c.actions.is_empty()) {
        println!("\nCluster: {} ({})", cluster.name, cluster.id);
        println!("{}", "-".repeat(40));

        for (i, action) in cluster.actions.iter().enumerate() {
            println!("{}. {}", i + 1, action.sql);
            if !action.expected_state_delta.is_empty() {
                let delta = serde_json::to_string(&action.expected_state_delta)?;
                println!("   Expected changes: {delta}");
            }
            println!();
        }
    }

    Ok(())
}
