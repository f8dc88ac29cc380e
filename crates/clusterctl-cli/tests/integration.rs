use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn clusterctl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clusterctl").unwrap();
    cmd.current_dir(dir.path())
        .env("CLUSTERCTL_ROOT", dir.path())
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_plan(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("plan.yaml");
    std::fs::write(&path, body).unwrap();
    path
}

fn audit_records(dir: &TempDir) -> Vec<serde_json::Value> {
    let output = clusterctl(dir).args(["audit", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

const SUCCESS_PLAN: &str = r#"
clusters:
  - id: u1
    name: analytics
    actions:
      - sql: CREATE TABLE replicas (name TEXT)
        reasons: [cluster has no replica table]
      - sql: INSERT INTO replicas VALUES ('r1'), ('r2'), ('r3')
        reasons: [scale up to three replicas]
"#;

const FAILING_PLAN: &str = r#"
clusters:
  - id: u1
    name: analytics
    actions:
      - sql: SELEC 1
        reasons: [typo in decision engine]
      - sql: CREATE TABLE never_created (x INTEGER)
"#;

// ---------------------------------------------------------------------------
// clusterctl init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_database() {
    let dir = TempDir::new().unwrap();
    clusterctl(&dir).arg("init").assert().success();

    assert!(dir.path().join(".clusterctl").is_dir());
    assert!(dir.path().join(".clusterctl/config.yaml").exists());
    assert!(dir.path().join(".clusterctl/clusterctl.db").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    clusterctl(&dir).arg("init").assert().success();
    clusterctl(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .clusterctl/config.yaml"));
}

// ---------------------------------------------------------------------------
// clusterctl apply
// ---------------------------------------------------------------------------

#[test]
fn apply_all_success_prints_transcript() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, SUCCESS_PLAN);

    clusterctl(&dir)
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Executing 2 actions..."))
        .stdout(predicate::str::contains("\nProcessing cluster: analytics\n"))
        .stdout(predicate::str::contains(
            "✓ CREATE TABLE replicas (name TEXT)\n✓ INSERT INTO replicas VALUES ('r1'), ('r2'), ('r3')\n  Affected rows: 3\n",
        ))
        .stdout(predicate::str::contains("All 2 actions executed successfully"));

    let records = audit_records(&dir);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["executed"] == true));
    assert!(records.iter().all(|r| r["cluster_id"] == "u1"));
}

#[test]
fn apply_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, FAILING_PLAN);

    clusterctl(&dir)
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ SELEC 1\n  Error: "))
        .stdout(predicate::str::contains("syntax error"))
        .stdout(predicate::str::contains(
            "Execution completed with errors: 0/2 actions succeeded\nErrors:\n  Action 1: ",
        ))
        .stdout(predicate::str::contains("never_created").not());

    let records = audit_records(&dir);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["action_sql"], "SELEC 1");
    assert_eq!(records[0]["executed"], false);
    assert_eq!(records[0]["decision_ctx"]["action_index"], 1);
    assert_eq!(records[0]["decision_ctx"]["total_actions"], 2);
    assert_eq!(
        records[0]["decision_ctx"]["reasons"][0],
        "typo in decision engine"
    );
    assert!(records[0]["error_message"]
        .as_str()
        .unwrap()
        .contains("syntax error"));
}

#[test]
fn apply_json_reports_summary() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, FAILING_PLAN);

    let output = clusterctl(&dir)
        .args(["--json", "apply", "--plan"])
        .arg(&plan)
        .output()
        .unwrap();
    assert!(output.status.success());

    let runs: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(runs.len(), 1);
    let summary = &runs[0]["summary"];
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["executed"], 0);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["errors"][0]["action_index"], 1);
    assert_eq!(summary["errors"][0]["sql"], "SELEC 1");
}

#[test]
fn apply_with_no_actions() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, "clusters:\n  - {id: u1, name: analytics}\n");

    clusterctl(&dir)
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("No actions to execute."));
}

#[test]
fn apply_respects_cluster_filter() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        r#"
clusters:
  - id: u1
    name: analytics
    actions:
      - sql: CREATE TABLE a (x INTEGER)
  - id: u2
    name: ingest
    actions:
      - sql: CREATE TABLE b (x INTEGER)
"#,
    );

    clusterctl(&dir)
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .args(["--filter-clusters", "^ing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing cluster: ingest"))
        .stdout(predicate::str::contains("analytics").not());

    let records = audit_records(&dir);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["cluster_id"], "u2");
}

#[test]
fn apply_uses_explicit_database() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, SUCCESS_PLAN);
    let db = dir.path().join("elsewhere/target.db");

    clusterctl(&dir)
        .arg("--database")
        .arg(&db)
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success();

    assert!(db.exists());
    assert!(!dir.path().join(".clusterctl/clusterctl.db").exists());
}

#[test]
fn apply_rejects_server_database_url() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, SUCCESS_PLAN);

    clusterctl(&dir)
        .env(
            "DATABASE_URL",
            "postgresql://materialize@localhost:6875/materialize",
        )
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported database url"))
        .stdout(predicate::str::contains("executed successfully").not());

    assert!(!dir.path().join("postgresql:").exists());
    assert!(!dir.path().join(".clusterctl/clusterctl.db").exists());
}

#[test]
fn apply_reads_sqlite_database_url() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, SUCCESS_PLAN);
    let db = dir.path().join("target.db");

    clusterctl(&dir)
        .env("DATABASE_URL", format!("sqlite://{}", db.display()))
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("All 2 actions executed successfully"));

    assert!(db.exists());
}

#[test]
fn dry_run_ignores_database_url() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, SUCCESS_PLAN);
    clusterctl(&dir)
        .env("DATABASE_URL", "postgres://localhost/materialize")
        .arg("dry-run")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned actions:"));
}

#[test]
fn apply_missing_plan_fails() {
    let dir = TempDir::new().unwrap();
    clusterctl(&dir)
        .args(["apply", "--plan", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load plan"));
}

// ---------------------------------------------------------------------------
// clusterctl dry-run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_prints_plan_without_touching_database() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        &dir,
        r#"
clusters:
  - id: u1
    name: analytics
    actions:
      - sql: ALTER CLUSTER analytics SET (REPLICATION FACTOR 0)
        reasons: [idle for 45m]
        expected_state_delta:
          replication_factor: 0
"#,
    );

    clusterctl(&dir)
        .arg("dry-run")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned actions:\n"))
        .stdout(predicate::str::contains(&"=".repeat(60)))
        .stdout(predicate::str::contains("\nCluster: analytics (u1)\n"))
        .stdout(predicate::str::contains(
            "1. ALTER CLUSTER analytics SET (REPLICATION FACTOR 0)\n   Expected changes: {\"replication_factor\":0}\n",
        ));

    assert!(!dir.path().join(".clusterctl/clusterctl.db").exists());
}

#[test]
fn dry_run_with_no_actions() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, "clusters: []\n");
    clusterctl(&dir)
        .arg("dry-run")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("No actions would be taken."));
}

// ---------------------------------------------------------------------------
// clusterctl audit / config
// ---------------------------------------------------------------------------

#[test]
fn audit_table_lists_records() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(&dir, FAILING_PLAN);
    clusterctl(&dir)
        .arg("apply")
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success();

    clusterctl(&dir)
        .args(["audit", "--cluster", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACTION ID"))
        .stdout(predicate::str::contains("SELEC 1"));

    clusterctl(&dir)
        .args(["audit", "--cluster", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No audited actions."));
}

#[test]
fn config_validate_rejects_bad_filter() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".clusterctl")).unwrap();
    std::fs::write(
        dir.path().join(".clusterctl/config.yaml"),
        "cluster_filter: \"(unclosed\"\n",
    )
    .unwrap();

    clusterctl(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] cluster_filter"));
}

#[test]
fn config_show_reports_default_database() {
    let dir = TempDir::new().unwrap();
    clusterctl(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clusterctl.db"))
        .stdout(predicate::str::contains("Cluster filter: (none)"));
}
