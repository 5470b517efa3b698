use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use ferroscan_core::{IntervalTicker, ScanReport, Scanner, SnapshotSource, WatchlistMonitor};

use crate::cli::MonitorArgs;
use crate::error::CliError;
use crate::output::Document;

use super::scan::report_result;
use super::{resolve_tickers, Context};

/// Re-scans the watchlist until `--cycles` reports were emitted or Ctrl-C.
pub async fn run(
    args: &MonitorArgs,
    ctx: &Context,
    emit: &mut dyn FnMut(Document) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let scanner = Scanner::new(args.criteria.apply(ctx.config.criteria))?;
    let interval = args
        .interval_secs
        .map_or_else(|| ctx.config.monitor.interval(), Duration::from_secs);
    let ticker = IntervalTicker::new(interval)?;
    let watchlist = resolve_tickers(&args.tickers, &ctx.config)?;

    let monitor = WatchlistMonitor::new(Arc::clone(&ctx.source), scanner).with_watchlist(watchlist);
    let mut reports = monitor.start(ticker)?;
    info!(
        tickers = monitor.watchlist().len(),
        interval_secs = interval.as_secs(),
        "monitor started"
    );

    let outcome = forward_reports(&monitor, &mut reports, args.cycles, ctx, emit).await;

    monitor.stop().await;
    info!("monitor stopped");
    outcome
}

async fn forward_reports(
    monitor: &WatchlistMonitor<Arc<dyn SnapshotSource>>,
    reports: &mut UnboundedReceiver<ScanReport>,
    cycles: Option<u64>,
    ctx: &Context,
    emit: &mut dyn FnMut(Document) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let mut completed = 0_u64;
    loop {
        if cycles.is_some_and(|cycles| completed >= cycles) {
            return Ok(());
        }
        let report = tokio::select! {
            report = reports.recv() => report,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
        };
        let Some(report) = report else {
            return Ok(());
        };

        let mut result = report_result(&report)?;
        if monitor.watchlist().is_empty() {
            result = result.with_warning("watchlist is empty; pass tickers or set monitor.tickers");
        }
        emit(result.into_document(ctx.source_id())?)?;

        completed += 1;
    }
}
