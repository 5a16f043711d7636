//! Long-running location session.
//!
//! Reads scans from a file or stdin and feeds each completed scan to one
//! arbiter, printing estimates as they arrive. The config file is re-read
//! after every scan and source changes are pushed to the running session
//! through the registry, so toggling a source does not need a restart.

use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use netlocate::config::ConfigFile;
use netlocate::session::{Reloadable, SessionRegistry};
use netlocate::signal::{CellObservation, WifiObservation};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::common::{
    build_arbiter, load_config, parse_scan_line, print_estimate, start_logging, CliArbiter,
    ScanLine,
};
use crate::error::CliError;

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Scan input file, or '-' for stdin
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    /// Pause between scans in milliseconds
    #[arg(long, default_value_t = 0)]
    pub pace_ms: u64,
}

/// Observations collected for the scan being read.
#[derive(Debug, Default)]
struct Scan {
    wifis: Vec<WifiObservation>,
    cells: Vec<CellObservation>,
    lines: usize,
}

/// Run the watch command.
pub async fn run(args: WatchArgs, config_path: &Path, verbose: bool) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let _logging = start_logging(&config, verbose)?;

    let arbiter = Arc::new(build_arbiter(&config)?);
    let registry = SessionRegistry::new();
    let session: Arc<dyn Reloadable> = arbiter.clone();
    registry.register(Arc::clone(&session));

    let mut estimates = arbiter.reporter().subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match estimates.recv().await {
                Ok(estimate) => print_estimate(&estimate),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Estimate printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    arbiter.start()?;
    info!(input = %args.input.display(), "Watching scan input");

    let result = feed_scans(&args, &arbiter, &registry, config_path).await;

    arbiter.wait_idle().await;
    if let Some(worker) = arbiter.stop() {
        let _ = worker.await;
    }

    // Dropping the last handle closes the estimate channel and ends the printer.
    registry.unregister(&session);
    drop(session);
    drop(arbiter);
    let _ = printer.await;

    result
}

async fn feed_scans(
    args: &WatchArgs,
    arbiter: &CliArbiter,
    registry: &SessionRegistry,
    config_path: &Path,
) -> Result<(), CliError> {
    let reader = open_input(&args.input).await?;
    let mut lines = BufReader::new(reader).lines();
    let mut scan = Scan::default();
    let mut line_number = 0;
    let pace = Duration::from_millis(args.pace_ms);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|error| CliError::Input {
                path: args.input.clone(),
                error,
            })?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Ok(());
            }
        };
        let Some(line) = line else {
            break;
        };
        line_number += 1;

        let parsed = parse_scan_line(&line).map_err(|reason| CliError::InvalidObservation {
            line: line_number,
            reason,
        })?;

        match parsed {
            ScanLine::Wifi(wifi) => {
                scan.wifis.push(wifi);
                scan.lines += 1;
            }
            ScanLine::Cell(cell) => {
                scan.cells.push(cell);
                scan.lines += 1;
            }
            ScanLine::Comment => {}
            ScanLine::EndOfScan => {
                if scan.lines > 0 {
                    submit_scan(arbiter, registry, config_path, &mut scan);
                    if !pace.is_zero() {
                        tokio::time::sleep(pace).await;
                    }
                }
            }
        }
    }

    if scan.lines > 0 {
        submit_scan(arbiter, registry, config_path, &mut scan);
    }
    Ok(())
}

async fn open_input(path: &Path) -> Result<Box<dyn AsyncRead + Unpin + Send>, CliError> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|error| CliError::Input {
            path: path.to_path_buf(),
            error,
        })?;
    Ok(Box::new(file))
}

/// Pick up config changes, then hand the scan to the arbiter.
///
/// A scan is the complete set of visible transmitters, so both halves are
/// replaced even when one of them is empty. Wi-Fi goes first so a scan with
/// enough access points is looked up by Wi-Fi.
fn submit_scan(
    arbiter: &CliArbiter,
    registry: &SessionRegistry,
    config_path: &Path,
    scan: &mut Scan,
) {
    reload_sources(arbiter, registry, config_path);

    let wifi = arbiter.update_wifi(mem::take(&mut scan.wifis));
    let cells = arbiter.update_cells(mem::take(&mut scan.cells));
    scan.lines = 0;

    debug!(wifi = ?wifi, cells = ?cells, "Scan submitted");
}

fn reload_sources(arbiter: &CliArbiter, registry: &SessionRegistry, config_path: &Path) {
    match ConfigFile::load_from(config_path) {
        Ok(config) => {
            let sources = config.source_settings();
            if sources != arbiter.sources() {
                registry.reload_configuration(sources);
            }
        }
        Err(e) => warn!(error = %e, "Config reload failed, keeping current sources"),
    }
}
