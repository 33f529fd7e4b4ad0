mod commands;
mod config;
mod fixture;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use dotbit_address::ChainType;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// dotbit lock-args codec and signing-message compiler.
#[derive(Parser)]
#[command(
    name = "dotbit",
    version,
    about = "dotbit lock-args codec and signing-message compiler"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a transaction fixture into its signing summary
    Compile {
        /// Path to the transaction fixture JSON
        tx: PathBuf,
        /// Path to the deployment config TOML
        #[arg(long)]
        config: PathBuf,
        /// EVM chain id of the signing domain (0 = network default)
        #[arg(long)]
        chain_id: Option<u64>,
    },

    /// Decode das-lock args into owner and manager addresses
    DecodeArgs {
        /// Lock args as hex, with or without 0x
        args: String,
        /// Deployment config, needed to display ledger-native addresses
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Encode an owner and a manager into das-lock args
    EncodeArgs {
        /// Owner chain (tag number or name, e.g. 3 or eth)
        owner_chain: ChainType,
        /// Owner payload as hex
        owner: String,
        /// Manager chain (tag number or name)
        manager_chain: ChainType,
        /// Manager payload as hex
        manager: String,
        /// Deployment config, for address length overrides
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Compile {
            tx,
            config,
            chain_id,
        } => {
            commands::compile::cmd_compile(&tx, &config, chain_id, cli.output, cli.quiet);
        }
        Commands::DecodeArgs { args, config } => {
            commands::args::cmd_decode_args(&args, config.as_deref(), cli.output, cli.quiet);
        }
        Commands::EncodeArgs {
            owner_chain,
            owner,
            manager_chain,
            manager,
            config,
        } => {
            commands::args::cmd_encode_args(
                (owner_chain, &owner),
                (manager_chain, &manager),
                config.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`, `error` when quiet).
fn init_tracing(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Print an error in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
