//! Eco CLI: the main entry point.
//!
//! Commands:
//! - `assemble`: assemble a prompt for one message and print it
//! - `serve`: start the HTTP gateway
//! - `check`: validate config, catalog and content roots

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "eco",
    about = "Eco: context assembly for emotional-support prompts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.eco/config.toml)
    #[arg(short, long, global = true, env = "ECO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the prompt for a message
    Assemble(commands::assemble::AssembleArgs),

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration, catalog and content roots
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Assemble(args) => commands::assemble::run(&config, args).await?,
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Check => commands::check::run(&config).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins, then `LOG_LEVEL`, then `--verbose` (debug) or info.
/// Logs go to stderr so stdout carries only the prompt.
fn init_tracing(verbose: bool, json: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| fallback.to_string());
        tracing_subscriber::EnvFilter::try_new(&level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
