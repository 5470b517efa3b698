use std::time::Instant;

use ferroscan_core::{ScanReport, Scanner, UtcDateTime};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{elapsed_ms, resolve_tickers, skipped_warnings, snapshot_request, CommandResult, Context};

pub async fn run(args: &ScanArgs, ctx: &Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let scanner = Scanner::new(args.criteria.apply(ctx.config.criteria))?;
    let tickers = resolve_tickers(&args.tickers, &ctx.config)?;

    let batch = ctx.source.snapshots(snapshot_request(tickers)).await?;
    let report = scanner.scan(&batch.snapshots, UtcDateTime::now());

    Ok(report_result(&report)?
        .with_warnings(skipped_warnings(&batch.skipped))
        .with_latency(elapsed_ms(started)))
}

/// Envelope data and tables for one scan report; shared with `monitor`.
pub(super) fn report_result(report: &ScanReport) -> Result<CommandResult, CliError> {
    let data = serde_json::to_value(report)?;
    Ok(CommandResult::ok(data)
        .with_table(matches_table(report))
        .with_table(survivors_table(report))
        .with_table(killed_table(report))
        .with_table(summary_table(report)))
}

fn matches_table(report: &ScanReport) -> Table {
    let mut table = Table::new(
        format!("Matches ({} of {})", report.result.total_matching(), report.total_input),
        vec!["TICKER", "PRICE", "GAIN%", "VOLUME", "REL VOL", "FLOAT(M)", "7D%"],
    );
    for stock in report.result.stocks() {
        table.push(vec![
            stock.ticker.to_string(),
            format!("{:.2}", stock.price),
            format!("{:.2}", stock.total_gain()),
            stock.volume.to_string(),
            format!("{:.2}x", stock.relative_volume),
            format!("{:.2}", stock.float),
            format!("{:.2}", stock.seven_day_change),
        ]);
    }
    table
}

fn survivors_table(report: &ScanReport) -> Table {
    let mut table = Table::new("Survivors", vec!["#", "TICKER", "SCORE", "RATING"]);
    for survivor in &report.classification.survivors {
        table.push(vec![
            survivor.rank.to_string(),
            survivor.stock.ticker.to_string(),
            format!("{}/10", survivor.score),
            format!("{} {}", survivor.rating.emoji(), survivor.rating),
        ]);
    }
    table
}

fn killed_table(report: &ScanReport) -> Table {
    let mut table = Table::new("Killed", vec!["TICKER", "REASON", "DETAIL"]);
    for killed in &report.classification.killed {
        table.push(vec![
            killed.stock.ticker.to_string(),
            killed.reason.clone(),
            killed.detail.clone(),
        ]);
    }
    table
}

fn summary_table(report: &ScanReport) -> Table {
    let mut table = Table::new(
        "Summary",
        vec!["INPUT", "CRITERIA MET", "KILLED", "SURVIVORS", "SURVIVED"],
    );
    table.push(vec![
        report.total_input.to_string(),
        format!("{}%", report.criteria_met_pct),
        report.summary.total_killed.to_string(),
        report.summary.total_survivors.to_string(),
        format!("{}%", report.summary.percentage_met),
    ]);
    table
}
