//! netlocate CLI - Command-line interface
//!
//! This binary drives the netlocate engine from the command line: one-shot
//! lookups, a long-running session fed from a scan stream, and config file
//! management.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::common::resolve_config_path;
use commands::config::ConfigCommands;
use commands::locate::LocateArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "netlocate")]
#[command(version = netlocate::VERSION)]
#[command(about = "Resolve a position from visible Wi-Fi access points and cell towers", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.netlocate/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a position once from observations given as arguments
    Locate(LocateArgs),

    /// Run a session fed with scans from a file or stdin
    Watch(WatchArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    let result = match cli.command {
        Commands::Locate(args) => commands::locate::run(args, &config_path, cli.verbose).await,
        Commands::Watch(args) => commands::watch::run(args, &config_path, cli.verbose).await,
        Commands::Config(command) => commands::config::run(command, &config_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
