//! Qtally command-line interface.
//!
//! Runs the quantum counting pipeline from files:
//!
//! ```text
//! qtally count  --tree tree.json --data data.json [--config run.yaml] [--json]
//! qtally oracle --tree tree.json
//! qtally encode --data data.json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::Overrides;
use commands::{count, encode, oracle};

/// Qtally - estimate how many dataset states a decision tree marks
#[derive(Parser)]
#[command(name = "qtally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full counting pipeline on the local simulator
    Count {
        /// Tree file (JSON or YAML)
        #[arg(short, long)]
        tree: PathBuf,

        /// Dataset file (JSON array of rows)
        #[arg(short, long)]
        data: PathBuf,

        /// Pipeline configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Simulator qubit limit
        #[arg(long)]
        max_qubits: Option<u32>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract positive-class terms and synthesize the oracle
    Oracle {
        /// Tree file (JSON or YAML)
        #[arg(short, long)]
        tree: PathBuf,

        /// Pipeline configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Encode a dataset and print its non-zero amplitudes
    Encode {
        /// Dataset file (JSON array of rows)
        #[arg(short, long)]
        data: PathBuf,

        /// Pipeline configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Log to stderr so stdout carries only command output, `--json` included.
/// `RUST_LOG` wins over `-v` when set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Count {
            tree,
            data,
            config,
            overrides,
            max_qubits,
            json,
        } => count::execute(&tree, &data, config.as_deref(), &overrides, max_qubits, json).await,
        Commands::Oracle {
            tree,
            config,
            overrides,
        } => oracle::execute(&tree, config.as_deref(), &overrides),
        Commands::Encode {
            data,
            config,
            overrides,
        } => encode::execute(&data, config.as_deref(), &overrides),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
