//! CLI command for live refresh
//!
//! Polls the input file through the sync controller and prints the
//! dashboard after every completed fetch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::error::{ReportError, ReportResult};
use crate::reports::SessionContext;
use crate::sync::{JsonFileSource, SyncController, SyncPhase};

/// Arguments of the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between refreshes (defaults to the configured poll interval)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many refreshes
    #[arg(long, default_value = "1")]
    pub count: u64,
}

/// Handle the watch command
pub fn handle_watch_command(
    context: SessionContext,
    input: PathBuf,
    args: WatchArgs,
) -> ReportResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ReportError::Io(format!("Failed to start runtime: {}", e)))?;

    let interval = Duration::from_secs(
        args.interval
            .unwrap_or(context.settings.poll_interval_secs)
            .max(1),
    );
    let currency = context.settings.currency_symbol.clone();

    runtime.block_on(async move {
        let source = Arc::new(JsonFileSource::new(input));
        let handle = SyncController::spawn_with_interval(context, source, interval)?;
        let engine = handle.engine();
        let mut status = handle.subscribe_status();

        let mut seen = 0;
        while seen < args.count {
            let current = status
                .wait_for(|s| s.completed_fetches > seen && s.phase == SyncPhase::Idle)
                .await
                .map_err(|_| ReportError::SyncStopped)?
                .clone();
            seen = current.completed_fetches;

            if let Some(error) = &current.last_error {
                eprintln!("Refresh failed: {} (showing previous data)", error);
            }
            println!("{}", engine.dashboard().format_terminal(&currency));
        }

        handle.shutdown();
        Ok::<(), ReportError>(())
    })
}
