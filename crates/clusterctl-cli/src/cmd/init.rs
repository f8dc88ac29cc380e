use anyhow::Context;
use clusterctl_core::{config::Config, io, paths, sqlite::SqliteDatabase};
use std::path::Path;

pub fn run(root: &Path, database: Option<&Path>) -> anyhow::Result<()> {
    println!("Initializing clusterctl in: {}", root.display());

    // 1. Create .clusterctl directory
    let dir = paths::clusterctl_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    // 2. Write config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 3. Open the database so the audit table exists before the first apply
    let config = Config::load(root).context("failed to load config")?;
    let db_path = config.database_path(root, database);
    SqliteDatabase::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    println!("  audit:   {} ({})", paths::ACTIONS_TABLE, db_path.display());

    Ok(())
}
