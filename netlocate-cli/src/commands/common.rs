//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use netlocate::arbiter::Arbiter;
use netlocate::config::{config_file_path, ConfigFile};
use netlocate::logging::{init_logging, LoggingGuard};
use netlocate::lookup::AsyncReqwestClient;
use netlocate::report::{ChannelReporter, LocationEstimate};
use netlocate::signal::{CellObservation, RadioType, WifiObservation};

use crate::error::CliError;

/// Arbiter as the CLI runs it.
pub type CliArbiter = Arbiter<AsyncReqwestClient, ChannelReporter>;

/// The config file path to use: `--config` if given, the default otherwise.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}

/// Load the config file, falling back to defaults if it doesn't exist.
pub fn load_config(path: &Path) -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load_from(path)?)
}

/// Start logging to the configured log file and stderr.
pub fn start_logging(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let filter = if verbose { "debug" } else { "info" };
    init_logging(&config.logging.directory, &config.logging.file, filter)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

/// Build a stopped arbiter from the config file.
pub fn build_arbiter(config: &ConfigFile) -> Result<CliArbiter, CliError> {
    let client = AsyncReqwestClient::with_timeout(config.lookup.timeout).map_err(CliError::Client)?;
    Ok(Arbiter::new(
        client,
        ChannelReporter::new(),
        config.arbiter_config(),
    )?)
}

/// Print an estimate on one line.
pub fn print_estimate(estimate: &LocationEstimate) {
    println!(
        "{:.6},{:.6} ±{:.0}m ({} via {})",
        estimate.latitude, estimate.longitude, estimate.accuracy, estimate.source, estimate.provider
    );
}

/// Parse `--wifi <bssid>,<dbm>`.
pub fn parse_wifi_arg(arg: &str) -> Result<WifiObservation, String> {
    let (bssid, signal) = arg
        .rsplit_once(',')
        .ok_or_else(|| format!("expected <bssid>,<dbm>, got '{}'", arg))?;
    wifi_observation(bssid, signal)
}

/// Parse `--cell <mcc>,<mnc>,<lac>,<cid>,<dbm>[,<radio>]`.
pub fn parse_cell_arg(arg: &str) -> Result<CellObservation, String> {
    let fields: Vec<&str> = arg.split(',').map(str::trim).collect();
    match fields.as_slice() {
        [mcc, mnc, lac, cid, dbm] => cell_observation("gsm", mcc, mnc, lac, cid, dbm),
        [mcc, mnc, lac, cid, dbm, radio] => cell_observation(radio, mcc, mnc, lac, cid, dbm),
        _ => Err(format!(
            "expected <mcc>,<mnc>,<lac>,<cid>,<dbm>[,<radio>], got '{}'",
            arg
        )),
    }
}

/// One line of scan input.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanLine {
    Wifi(WifiObservation),
    Cell(CellObservation),
    /// A blank line: the current scan is complete.
    EndOfScan,
    /// A `#` comment.
    Comment,
}

/// Parse one line of scan input.
///
/// ```text
/// wifi <bssid> <dbm>
/// cell <radio> <mcc> <mnc> <lac> <cid> <dbm>
/// ```
pub fn parse_scan_line(line: &str) -> Result<ScanLine, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ScanLine::EndOfScan);
    }
    if line.starts_with('#') {
        return Ok(ScanLine::Comment);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        ["wifi", bssid, dbm] => wifi_observation(bssid, dbm).map(ScanLine::Wifi),
        ["cell", radio, mcc, mnc, lac, cid, dbm] => {
            cell_observation(radio, mcc, mnc, lac, cid, dbm).map(ScanLine::Cell)
        }
        [kind, ..] if *kind != "wifi" && *kind != "cell" => {
            Err(format!("unknown observation kind '{}'", kind))
        }
        _ => Err(format!("wrong number of fields in '{}'", line)),
    }
}

fn wifi_observation(bssid: &str, signal: &str) -> Result<WifiObservation, String> {
    let bssid = bssid.trim();
    if bssid.is_empty() {
        return Err("empty BSSID".to_string());
    }
    Ok(WifiObservation::new(bssid, parse_number(signal, "signal")?))
}

fn cell_observation(
    radio: &str,
    mcc: &str,
    mnc: &str,
    lac: &str,
    cid: &str,
    signal: &str,
) -> Result<CellObservation, String> {
    let radio: RadioType = radio.parse().map_err(|e| format!("{}", e))?;
    Ok(CellObservation::new(
        radio,
        parse_number(mcc, "mcc")?,
        parse_number(mnc, "mnc")?,
        parse_number(lac, "lac")?,
        parse_number(cid, "cid")?,
        parse_number(signal, "signal")?,
    ))
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", field, value.trim()))
}
