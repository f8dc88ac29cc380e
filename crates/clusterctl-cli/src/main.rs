mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "clusterctl",
    about = "Apply cluster remediation plans with a fail-fast executor and a durable audit trail",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .clusterctl/ or .git/)
    #[arg(long, global = true, env = "CLUSTERCTL_ROOT")]
    root: Option<PathBuf>,

    /// SQLite database to execute against and audit into (path or sqlite:// url)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Enable verbose logging (-v for info, -vv for debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .clusterctl/config.yaml and the audit table
    Init,

    /// Print the actions a plan would take without executing anything
    DryRun {
        /// Plan file (YAML or JSON) produced by the decision engine
        #[arg(long)]
        plan: PathBuf,

        /// Limit to clusters whose name matches this regex
        #[arg(long)]
        filter_clusters: Option<String>,
    },

    /// Execute a plan and write the audit log
    Apply {
        /// Plan file (YAML or JSON) produced by the decision engine
        #[arg(long)]
        plan: PathBuf,

        /// Limit to clusters whose name matches this regex
        #[arg(long)]
        filter_clusters: Option<String>,
    },

    /// Show the audit trail, newest first
    Audit {
        /// Only records for this cluster id
        #[arg(long)]
        cluster: Option<String>,

        /// Maximum number of records to show
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let result = run(&root, cli.database.as_deref(), cli.command, cli.json);

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(root: &Path, database: Option<&str>, command: Commands, json: bool) -> anyhow::Result<()> {
    // Only commands that open the database parse it.
    let database = || {
        database
            .map(clusterctl_core::paths::database_path_from_url)
            .transpose()
    };

    match command {
        Commands::Init => cmd::init::run(root, database()?.as_deref()),
        Commands::DryRun {
            plan,
            filter_clusters,
        } => cmd::plan::run(root, &plan, filter_clusters.as_deref(), json),
        Commands::Apply {
            plan,
            filter_clusters,
        } => cmd::apply::run(
            root,
            database()?.as_deref(),
            &plan,
            filter_clusters.as_deref(),
            json,
        ),
        Commands::Audit { cluster, limit } => {
            cmd::audit::run(root, database()?.as_deref(), cluster.as_deref(), limit, json)
        }
        Commands::Config { subcommand } => cmd::config::run(root, subcommand, json),
    }
}
