//! Behavior-driven tests for the screening pipeline
//!
//! These tests exercise the baseline filter, kill cascade, scoring model and
//! aggregate report the way a scan uses them, including the reference tape.

use ferroscan_core::screening::{filter, scoring};
use ferroscan_core::{
    classify, classify_for_kill, summarize, KillRule, MockAdapter, Rating, ScanCriteria,
    ScanSummary, Scanner, Stock, Symbol, UtcDateTime,
};

fn scanned_at() -> UtcDateTime {
    UtcDateTime::parse("2025-03-14T14:05:00Z").expect("valid timestamp")
}

#[allow(clippy::too_many_arguments)]
fn snapshot(
    ticker: &str,
    price: f64,
    day_gain: f64,
    pre_market_gain: Option<f64>,
    volume: u64,
    relative_volume: f64,
    float: f64,
    seven_day_change: f64,
) -> Stock {
    let avg_volume = (volume as f64 / relative_volume.max(1.0)) as u64;
    Stock::new(
        Symbol::parse(ticker).expect("valid symbol"),
        price,
        day_gain,
        pre_market_gain,
        volume,
        avg_volume,
        relative_volume,
        float,
        seven_day_change,
        None,
        scanned_at(),
    )
    .expect("valid snapshot")
}

// =============================================================================
// End-to-end examples
// =============================================================================

#[test]
fn when_a_low_float_runner_is_scanned_it_scores_the_maximum_and_rates_a_plus() {
    // Given: a 1.9M float name up 354.73% plus 15.2% pre-market on 308.9M shares
    let vero = snapshot("VERO", 6.72, 354.73, Some(15.2), 308_900_000, 6.86, 1.9, 8.5);

    // When: the full scan runs with default criteria
    let report = Scanner::default().scan(std::slice::from_ref(&vero), scanned_at());

    // Then: it clears the baseline and the kill cascade
    assert!((vero.total_gain() - 369.93).abs() < 1e-9);
    assert_eq!(report.result.total_matching(), 1);
    assert!(report.classification.killed.is_empty());

    // And: every criterion fires, including the $1-$10 price band, so the
    // raw 12 points are capped at 10
    let survivor = &report.classification.survivors[0];
    assert!(survivor.breakdown.tradeable_price);
    assert!(survivor.breakdown.clean_momentum_day);
    assert_eq!(survivor.breakdown.raw, 12);
    assert_eq!(survivor.score, 10);
    assert_eq!(survivor.rating, Rating::APlusDaytrade);
    assert_eq!(survivor.rating.label(), "A+ Daytrade");
    assert_eq!(survivor.rank, 1);
}

#[test]
fn when_float_is_985m_the_record_is_killed_by_the_first_rule() {
    // Given: an otherwise attractive record with a 985M float
    let ibrx = snapshot("IBRX", 5.53, 30.37, Some(9.5), 182_300_000, 6.51, 985.0, -7.3);

    // When: it is classified
    let classification = classify(&[ibrx]);

    // Then: the oversized-float rule claims it and names the float
    assert!(classification.survivors.is_empty());
    let killed = &classification.killed[0];
    assert_eq!(killed.rule, KillRule::OversizedFloat);
    assert_eq!(killed.reason, "float too large, too sluggish.");
    assert!(killed.detail.contains("985"), "detail: {}", killed.detail);
}

#[tokio::test]
async fn when_the_reference_tape_is_scanned_the_report_matches_the_tape() {
    use ferroscan_core::{SnapshotRequest, SnapshotSource};

    // Given: the ten-name reference tape
    let batch = MockAdapter::at(scanned_at())
        .snapshots(SnapshotRequest::discover())
        .await
        .expect("tape");

    // When: it is scanned with default criteria
    let report = Scanner::default().scan(&batch.snapshots, scanned_at());

    // Then: only the sub-dollar NIVF misses the baseline
    assert_eq!(report.total_input, 10);
    assert_eq!(report.result.total_matching(), 9);
    assert_eq!(report.criteria_met_pct, 90);
    assert!(report
        .result
        .stocks()
        .iter()
        .all(|stock| stock.ticker.as_str() != "NIVF"));

    // And: the result is ranked by total gain
    let gains = report
        .result
        .stocks()
        .iter()
        .map(Stock::total_gain)
        .collect::<Vec<_>>();
    assert!(gains.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(report.result.stocks()[0].ticker.as_str(), "VERO");

    // And: IVF and TNMG lack volume for their float, IBRX is far too big
    let killed = report
        .classification
        .killed
        .iter()
        .map(|killed| (killed.stock.ticker.as_str(), killed.rule))
        .collect::<Vec<_>>();
    assert_eq!(
        killed,
        vec![
            ("IVF", KillRule::HeavyFloatThinVolume),
            ("TNMG", KillRule::HeavyFloatThinVolume),
            ("IBRX", KillRule::OversizedFloat),
        ]
    );

    // And: survivors are ranked by score with ties kept in tape order
    let ranked = report
        .classification
        .survivors
        .iter()
        .map(|survivor| (survivor.rank, survivor.stock.ticker.as_str(), survivor.score))
        .collect::<Vec<_>>();
    assert_eq!(
        ranked,
        vec![
            (1, "VERO", 10),
            (2, "JFBR", 10),
            (3, "JAGX", 5),
            (4, "BIYA", 3),
            (5, "LCFY", 3),
            (6, "PRFX", 3),
        ]
    );
    assert_eq!(
        report.summary,
        ScanSummary {
            total_killed: 3,
            total_survivors: 6,
            percentage_met: 67,
        }
    );
}

#[test]
fn when_custom_criteria_are_supplied_the_scan_honors_them() {
    // Given: a scanner restricted to $5-$20 names
    let criteria = ScanCriteria {
        min_price: 5.0,
        ..ScanCriteria::default()
    };
    let scanner = Scanner::new(criteria).expect("valid criteria");

    // When: the reference tape is scanned
    let report = scanner.scan(&MockAdapter::at(scanned_at()).tape(), scanned_at());

    // Then: only VERO, BIYA and IBRX remain, and the result records the criteria used
    let tickers = report
        .result
        .stocks()
        .iter()
        .map(|stock| stock.ticker.as_str())
        .collect::<Vec<_>>();
    assert_eq!(tickers, vec!["VERO", "BIYA", "IBRX"]);
    assert_eq!(report.result.criteria().min_price, 5.0);
    assert_eq!(report.criteria_met_pct, 30);
}

// =============================================================================
// Classification properties
// =============================================================================

#[test]
fn classification_partitions_input_without_loss_or_duplication() {
    // Given: the tape, NIVF included, fed straight into the cascade
    let tape = MockAdapter::at(scanned_at()).tape();

    // When: it is classified without the baseline filter
    let classification = classify(&tape);

    // Then: every ticker lands in exactly one bucket
    assert_eq!(classification.total_input(), tape.len());
    let mut seen = classification
        .killed
        .iter()
        .map(|killed| killed.stock.ticker.clone())
        .chain(
            classification
                .survivors
                .iter()
                .map(|survivor| survivor.stock.ticker.clone()),
        )
        .collect::<Vec<_>>();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), tape.len());
}

#[test]
fn when_several_kill_rules_match_only_the_first_is_reported() {
    // Given: a record with a 600M float and a 3x relative volume
    let stock = snapshot("BIGF", 4.0, 80.0, None, 50_000_000, 3.0, 600.0, 2.0);

    // When: the cascade evaluates it
    let rule = classify_for_kill(&stock);

    // Then: the float rule wins over the relative-volume rule
    assert!(KillRule::WeakRelativeVolume.matches(&stock));
    assert_eq!(rule, Some(KillRule::OversizedFloat));
    assert_eq!(classify(&[stock]).killed[0].reason, "float too large, too sluggish.");
}

#[test]
fn raising_gain_across_100_percent_adds_exactly_two_points() {
    // Given: the same record at 99% and at 101% total gain
    let below = snapshot("STEP", 5.0, 99.0, None, 50_000_000, 6.2, 8.0, 1.0);
    let above = snapshot("STEP", 5.0, 101.0, None, 50_000_000, 6.2, 8.0, 1.0);

    // When: both are scored
    let (low, high) = (scoring::score(&below), scoring::score(&above));

    // Then: the gain criterion adds two points and nothing else changes
    assert_eq!(high, low + 2);
    assert!(!scoring::breakdown(&above).clean_momentum_day);
}

#[test]
fn a_record_meeting_every_criterion_is_capped_at_ten() {
    // Given: a synthetic record satisfying all six criteria
    let stock = snapshot("FULL", 5.0, 150.0, None, 200_000_000, 7.0, 2.0, 1.0);

    // When: it is scored
    let breakdown = scoring::breakdown(&stock);

    // Then: 12 raw points collapse to 10
    assert_eq!(breakdown.raw, 12);
    assert_eq!(breakdown.score, scoring::MAX_SCORE);
}

#[test]
fn equal_scores_keep_their_input_order() {
    // Given: two survivors scoring 3 followed by a stronger one
    let first = snapshot("AAA", 6.0, 40.0, None, 20_000_000, 6.3, 1.5, 2.0);
    let second = snapshot("BBB", 6.0, 40.0, None, 30_000_000, 6.3, 2.5, 2.0);
    let strongest = snapshot("CCC", 6.0, 120.0, None, 20_000_000, 6.3, 1.5, 2.0);

    // When: they are classified
    let classification = classify(&[first, second, strongest]);

    // Then: the stronger one leads and the tie keeps AAA before BBB
    let order = classification
        .survivors
        .iter()
        .map(|survivor| (survivor.stock.ticker.as_str(), survivor.score, survivor.rank))
        .collect::<Vec<_>>();
    assert_eq!(order, vec![("CCC", 5, 1), ("AAA", 3, 2), ("BBB", 3, 3)]);
}

#[test]
fn summarizing_nothing_reports_zeroes() {
    // Given: an empty classification
    let classification = classify(&[]);

    // When: it is summarized
    let summary = summarize(&classification);

    // Then: every count is zero, including the percentage
    assert_eq!(summary, ScanSummary::default());
    assert_eq!(summary.percentage_met, 0);
}

#[test]
fn filtering_a_set_that_already_passes_is_idempotent() {
    // Given: the baseline matches of the tape
    let criteria = ScanCriteria::default();
    let matching = filter::apply(&MockAdapter::at(scanned_at()).tape(), &criteria);

    // When: the filter runs again on its own output
    let again = filter::apply(&matching, &criteria);

    // Then: nothing changes
    assert_eq!(again, matching);
    assert!(filter::apply(&[], &criteria).is_empty());
}
