use std::time::Instant;

use serde::Serialize;

use ferroscan_core::screening::{breakdown, filter};
use ferroscan_core::{classify_for_kill, KillRule, Rating, ScanCriteria, ScoreBreakdown, Stock, Symbol};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{elapsed_ms, resolve_tickers, skipped_warnings, snapshot_request, CommandResult, Context};

#[derive(Debug, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
enum Verdict {
    Killed {
        rule: KillRule,
        reason: &'static str,
        detail: String,
    },
    Scored {
        score: u8,
        rating: Rating,
        breakdown: ScoreBreakdown,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Analysis {
    ticker: Symbol,
    total_gain: f64,
    passes_baseline: bool,
    #[serde(flatten)]
    verdict: Verdict,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponseData {
    analyses: Vec<Analysis>,
}

fn analyze(stock: &Stock, criteria: &ScanCriteria) -> Analysis {
    let verdict = match classify_for_kill(stock) {
        Some(rule) => Verdict::Killed {
            rule,
            reason: rule.reason(),
            detail: rule.detail(stock),
        },
        None => {
            let breakdown = breakdown(stock);
            Verdict::Scored {
                score: breakdown.score,
                rating: Rating::from_score(breakdown.score),
                breakdown,
            }
        }
    };

    Analysis {
        ticker: stock.ticker.clone(),
        total_gain: stock.total_gain(),
        passes_baseline: filter::passes(stock, criteria),
        verdict,
    }
}

/// Kill verdict or score breakdown for every snapshot, baseline filter or not.
pub async fn run(args: &AnalyzeArgs, ctx: &Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let tickers = resolve_tickers(&args.tickers, &ctx.config)?;
    let batch = ctx.source.snapshots(snapshot_request(tickers)).await?;

    let analyses = batch
        .snapshots
        .iter()
        .map(|stock| analyze(stock, &ctx.config.criteria))
        .collect::<Vec<_>>();

    let table = analysis_table(&analyses);
    let data = serde_json::to_value(AnalyzeResponseData { analyses })?;

    Ok(CommandResult::ok(data)
        .with_table(table)
        .with_warnings(skipped_warnings(&batch.skipped))
        .with_latency(elapsed_ms(started)))
}

fn analysis_table(analyses: &[Analysis]) -> Table {
    let mut table = Table::new(
        "Analysis",
        vec!["TICKER", "GAIN%", "BASELINE", "VERDICT", "SCORE", "NOTES"],
    );
    for analysis in analyses {
        let baseline = if analysis.passes_baseline { "pass" } else { "fail" };
        let (verdict, score, notes) = match &analysis.verdict {
            Verdict::Killed { detail, .. } => ("killed", "-".to_owned(), detail.clone()),
            Verdict::Scored {
                score,
                rating,
                breakdown,
            } => (
                "scored",
                format!("{score}/10"),
                format!("{rating} ({})", fired(breakdown).join(", ")),
            ),
        };
        table.push(vec![
            analysis.ticker.to_string(),
            format!("{:.2}", analysis.total_gain),
            baseline.to_owned(),
            verdict.to_owned(),
            score,
            notes,
        ]);
    }
    table
}

fn fired(breakdown: &ScoreBreakdown) -> Vec<&'static str> {
    [
        (breakdown.extreme_gain, "gain>100%"),
        (breakdown.tight_float, "float<=5M"),
        (breakdown.high_volume, "vol>150M"),
        (breakdown.strong_relative_volume, "relvol>6.5x"),
        (breakdown.tradeable_price, "$1-10"),
        (breakdown.clean_momentum_day, "clean day"),
    ]
    .into_iter()
    .filter(|(hit, _)| *hit)
    .map(|(_, label)| label)
    .collect()
}
