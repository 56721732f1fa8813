//! custody - chain-of-custody ledger CLI
//!
//! Thin front end over the evidence store, custody ledger and integrity verifier.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use custody_core::FingerprintPolicy;
use evidence_store::{EvidenceStore, StoreConfig};
use tracing_subscriber::EnvFilter;

mod commands;
mod report;

/// Log filter for the CLI, in `tracing_subscriber` directive syntax.
const LOG_ENV: &str = "CUSTODY_LOG";

#[derive(Parser)]
#[command(name = "custody")]
#[command(version, about = "Chain-of-custody tracking for digital evidence", long_about = None)]
struct Cli {
    /// Evidence data file (overrides CUSTODY_DATA_FILE)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Require registered fingerprints to be lower-case SHA-256 hex
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new evidence item
    Intake {
        /// Display name of the item (e.g. file name)
        #[arg(long)]
        name: String,

        /// SHA-256 of the evidence content, hex encoded
        #[arg(long)]
        hash: String,

        /// Source device or location
        #[arg(long)]
        source: String,

        /// Investigator performing the intake
        #[arg(long)]
        investigator: String,

        /// First custodian; defaults to the investigator
        #[arg(long)]
        custodian: Option<String>,
    },

    /// List all evidence items
    List,

    /// Show the custody report of one item
    Show {
        /// Evidence id
        id: u64,
    },

    /// Transfer custody of an item
    Transfer {
        /// Evidence id
        id: u64,

        /// Receiving custodian
        #[arg(long)]
        to: String,

        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Edit descriptive fields of an item (recorded in the custody ledger)
    Edit {
        /// Evidence id
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        hash: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        investigator: Option<String>,

        /// Reason for the edit (required)
        #[arg(short, long)]
        notes: String,
    },

    /// Check a file against the registered fingerprint
    Verify {
        /// Evidence id
        id: u64,

        /// File holding the evidence content
        file: PathBuf,
    },

    /// Validate the custody ledger of every item
    Audit,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = StoreConfig::from_env();
    if let Some(path) = cli.data {
        config = config.with_data_file(path);
    }
    if cli.strict {
        config = config.with_fingerprint_policy(FingerprintPolicy::Sha256Hex);
    }
    tracing::debug!(data_file = %config.data_file.display(), "opening evidence store");
    let store = EvidenceStore::open(&config);

    match cli.command {
        Commands::Intake {
            name,
            hash,
            source,
            investigator,
            custodian,
        } => commands::intake::run(&store, name, hash, source, investigator, custodian),
        Commands::List => commands::list::run(&store),
        Commands::Show { id } => commands::show::run(&store, id),
        Commands::Transfer { id, to, notes } => commands::transfer::run(&store, id, to, notes),
        Commands::Edit {
            id,
            name,
            hash,
            source,
            investigator,
            notes,
        } => commands::edit::run(
            &store,
            id,
            custody_core::EvidencePatch {
                name,
                fingerprint: hash,
                source,
                investigator,
            },
            notes,
        ),
        Commands::Verify { id, file } => commands::verify::run(&store, id, &file),
        Commands::Audit => commands::audit::run(&store),
    }
}
