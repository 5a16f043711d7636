//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path` for the INI file
//! the other commands read their settings from.

use std::path::Path;

use clap::Subcommand;
use netlocate::config::ConfigFile;

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the file at `path`.
pub fn run(command: ConfigCommands, path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { force } => run_init(path, force),
        ConfigCommands::Show => run_show(path),
        ConfigCommands::Path => run_path(path),
    }
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(path)?;
    println!("Created config file: {}", path.display());
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = load_config(path)?;

    if !path.exists() {
        println!("; {} not found, showing defaults", path.display());
        println!();
    }

    println!("[sources]");
    println!("use_wifi = {}", config.sources.use_wifi);
    println!("use_cells = {}", config.sources.use_cells);
    println!();
    println!("[lookup]");
    println!("wifi_url = {}", config.lookup.wifi_url);
    println!("cell_url = {}", config.lookup.cell_url);
    println!("min_interval_ms = {}", config.lookup.min_interval_ms);
    println!("timeout = {}", config.lookup.timeout);
    println!();
    println!("[logging]");
    println!("directory = {}", config.logging.directory.display());
    println!("file = {}", config.logging.file);

    Ok(())
}

fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}
