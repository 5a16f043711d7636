//! One-shot location lookup.
//!
//! Feeds the observations given on the command line to a fresh arbiter,
//! triggers a single dispatch and prints the estimate, if any.

use clap::Args;
use netlocate::arbiter::TriggerOutcome;
use netlocate::signal::{CellObservation, WifiObservation};
use std::path::Path;
use tracing::debug;

use super::common::{
    build_arbiter, load_config, parse_cell_arg, parse_wifi_arg, print_estimate, start_logging,
};
use crate::error::CliError;

/// Arguments for the locate command.
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Visible access point as <bssid>,<dbm> (repeatable)
    #[arg(long = "wifi", value_name = "BSSID,DBM", value_parser = parse_wifi_arg)]
    pub wifis: Vec<WifiObservation>,

    /// Visible cell as <mcc>,<mnc>,<lac>,<cid>,<dbm>[,<radio>] (repeatable)
    #[arg(long = "cell", value_name = "MCC,MNC,LAC,CID,DBM[,RADIO]", value_parser = parse_cell_arg)]
    pub cells: Vec<CellObservation>,

    /// Ignore Wi-Fi observations
    #[arg(long)]
    pub no_wifi: bool,

    /// Ignore cell observations
    #[arg(long)]
    pub no_cells: bool,
}

/// Run the locate command.
pub async fn run(args: LocateArgs, config_path: &Path, verbose: bool) -> Result<(), CliError> {
    let mut config = load_config(config_path)?;
    if args.no_wifi {
        config.sources.use_wifi = false;
    }
    if args.no_cells {
        config.sources.use_cells = false;
    }
    if !config.sources.use_wifi && !config.sources.use_cells {
        return Err(CliError::Config(
            "both Wi-Fi and cell sources are disabled".to_string(),
        ));
    }

    let _logging = start_logging(&config, verbose)?;

    let arbiter = build_arbiter(&config)?;
    let mut estimates = arbiter.reporter().subscribe();

    // Load both halves before starting so the single dispatch sees all of them.
    arbiter.update_wifi(args.wifis);
    arbiter.update_cells(args.cells);
    arbiter.start()?;

    let outcome = arbiter.trigger();
    debug!(outcome = ?outcome, "Lookup triggered");

    if outcome == TriggerOutcome::Dispatched {
        tokio::select! {
            _ = arbiter.wait_idle() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted");
                return Ok(());
            }
        }
    }

    match estimates.try_recv() {
        Ok(estimate) => print_estimate(&estimate),
        Err(_) => println!("No position resolved: {}", describe(outcome)),
    }

    if let Some(worker) = arbiter.stop() {
        let _ = worker.await;
    }
    Ok(())
}

fn describe(outcome: TriggerOutcome) -> &'static str {
    match outcome {
        TriggerOutcome::Dispatched => "no lookup succeeded (see log for details)",
        TriggerOutcome::Ineligible => "need at least one cell or two access points",
        TriggerOutcome::NotRunning | TriggerOutcome::WorkerUnavailable => {
            "lookup worker not available"
        }
        TriggerOutcome::InFlight => "a lookup is already running",
        TriggerOutcome::RateLimited => "rate limited",
        TriggerOutcome::SourceDisabled => "source disabled",
    }
}
