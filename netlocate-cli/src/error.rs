//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use netlocate::arbiter::ArbiterError;
use netlocate::config::ConfigFileError;
use netlocate::lookup::LookupError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read, parsed or written
    ConfigFile(ConfigFileError),
    /// Failed to create the HTTP client
    Client(LookupError),
    /// Failed to create or start the arbiter
    Arbiter(ArbiterError),
    /// An observation could not be parsed
    InvalidObservation { line: usize, reason: String },
    /// Failed to read observation input
    Input { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => 78,
            CliError::InvalidObservation { .. } => 65,
            CliError::Input { .. } => 66,
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file, or regenerate it with:");
                eprintln!("  netlocate config init --force");
            }
            CliError::InvalidObservation { .. } => {
                eprintln!();
                eprintln!("Expected observation lines:");
                eprintln!("  wifi <bssid> <dbm>");
                eprintln!("  cell <radio> <mcc> <mnc> <lac> <cid> <dbm>");
                eprintln!("A blank line ends a scan.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Client(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Arbiter(e) => write!(f, "Failed to start location session: {}", e),
            CliError::InvalidObservation { line, reason } => {
                write!(f, "Invalid observation on line {}: {}", line, reason)
            }
            CliError::Input { path, error } => {
                write!(f, "Failed to read '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Arbiter(e) => Some(e),
            CliError::Input { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ArbiterError> for CliError {
    fn from(e: ArbiterError) -> Self {
        CliError::Arbiter(e)
    }
}
