//! ephys-ingest - array-ephys manifest ingest CLI
//!
//! Reads CSV manifests of subjects and sessions, discovers SpikeGLX /
//! OpenEphys recordings under the configured root data directory, and
//! populates the workflow database with whatever the store does not
//! already hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ephys_common::config::EphysConfig;

/// Command-line arguments for ephys-ingest
#[derive(Parser, Debug)]
#[command(name = "ephys-ingest")]
#[command(about = "Array-ephys subject and session manifest ingest")]
#[command(version)]
struct Args {
    /// Root directory containing raw recording trees
    #[arg(short, long, env = "EPHYS_ROOT_DATA_DIR")]
    root: Option<PathBuf>,

    /// Workflow database path
    #[arg(short, long, env = "EPHYS_DATABASE_PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert new subjects from a CSV manifest
    IngestSubjects {
        /// Subject manifest (header row + one row per subject)
        #[arg(long, default_value = "./user_data/subjects.csv")]
        csv: PathBuf,
    },
    /// Discover and insert new sessions from a CSV manifest
    IngestSessions {
        /// Session manifest (columns: subject, session_dir)
        #[arg(long, default_value = "./user_data/sessions.csv")]
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ephys_ingest=info,ephys_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting ephys-ingest");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = EphysConfig::resolve(args.root.as_deref(), args.database.as_deref());
    if let Some(root) = config.root_data_dir() {
        info!("Root data dir: {}", root.display());
    }

    let db_path = config.database_path();
    info!("Database: {}", db_path.display());

    let pool = ephys_common::db::init_database_pool(&db_path)
        .await
        .context("Failed to open workflow database")?;

    match args.command {
        Command::IngestSubjects { csv } => {
            let inserted = ephys_ingest::ingest::ingest_subjects(&pool, &csv)
                .await
                .context("ingest_subjects failed")?;
            info!("Completed ingest_subjects: {} subject(s) inserted", inserted);
        }
        Command::IngestSessions { csv } => {
            let report = ephys_ingest::ingest::ingest_sessions(&config, &pool, &csv)
                .await
                .context("ingest_sessions failed")?;
            info!(
                "Completed ingest_sessions: {} session(s), {} probe(s), {} insertion(s)",
                report.sessions, report.probes, report.probe_insertions
            );
        }
    }

    Ok(())
}
