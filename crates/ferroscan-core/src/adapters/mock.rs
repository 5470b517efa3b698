use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::data_source::{
    HealthState, HealthStatus, SnapshotBatch, SnapshotRequest, SnapshotSource, SourceError,
};
use crate::{ProviderId, Stock, Symbol, UtcDateTime};

/// One row of the reference tape.
///
/// `total_gain` is the headline gain shown on a momentum scanner; the regular
/// session share is derived by taking the pre-market gain back out of it.
struct TapeRow {
    ticker: &'static str,
    price: f64,
    total_gain: f64,
    volume: u64,
    avg_volume: u64,
    relative_volume: f64,
    float: f64,
    seven_day_change: f64,
    last_hod: f64,
    pre_market_gain: f64,
}

#[rustfmt::skip]
const TAPE: [TapeRow; 10] = [
    TapeRow { ticker: "VERO", price: 6.72, total_gain: 369.93, volume: 308_900_000, avg_volume: 45_000_000, relative_volume: 6.86, float: 1.9, seven_day_change: 8.5, last_hod: 7.2, pre_market_gain: 15.2 },
    TapeRow { ticker: "IVF", price: 1.64, total_gain: 102.09, volume: 61_500_000, avg_volume: 10_000_000, relative_volume: 6.15, float: 15.1, seven_day_change: -8.2, last_hod: 1.85, pre_market_gain: 8.5 },
    TapeRow { ticker: "JFBR", price: 1.12, total_gain: 100.72, volume: 235_100_000, avg_volume: 35_000_000, relative_volume: 6.72, float: 3.2, seven_day_change: 5.3, last_hod: 1.25, pre_market_gain: 12.1 },
    TapeRow { ticker: "JAGX", price: 1.23, total_gain: 60.89, volume: 160_400_000, avg_volume: 25_000_000, relative_volume: 6.42, float: 4.2, seven_day_change: 7.8, last_hod: 1.35, pre_market_gain: 10.3 },
    TapeRow { ticker: "TNMG", price: 3.68, total_gain: 55.93, volume: 27_800_000, avg_volume: 4_500_000, relative_volume: 6.18, float: 41.3, seven_day_change: -6.5, last_hod: 4.1, pre_market_gain: 9.2 },
    TapeRow { ticker: "NIVF", price: 0.73, total_gain: 42.64, volume: 18_600_000, avg_volume: 3_000_000, relative_volume: 6.2, float: 1.3, seven_day_change: 4.1, last_hod: 0.82, pre_market_gain: 7.8 },
    TapeRow { ticker: "BIYA", price: 6.41, total_gain: 42.13, volume: 20_300_000, avg_volume: 3_200_000, relative_volume: 6.34, float: 1.2, seven_day_change: 3.2, last_hod: 7.15, pre_market_gain: 8.9 },
    TapeRow { ticker: "LCFY", price: 4.43, total_gain: 41.53, volume: 42_700_000, avg_volume: 6_800_000, relative_volume: 6.28, float: 1.8, seven_day_change: 6.7, last_hod: 4.95, pre_market_gain: 11.2 },
    TapeRow { ticker: "IBRX", price: 5.53, total_gain: 39.87, volume: 182_300_000, avg_volume: 28_000_000, relative_volume: 6.51, float: 985.0, seven_day_change: -7.3, last_hod: 6.2, pre_market_gain: 9.5 },
    TapeRow { ticker: "PRFX", price: 1.15, total_gain: 39.79, volume: 64_200_000, avg_volume: 10_000_000, relative_volume: 6.42, float: 3.9, seven_day_change: 5.8, last_hod: 1.28, pre_market_gain: 10.1 },
];

/// Deterministic reference tape of ten small-cap momentum names.
///
/// Used for demos, offline development and as the default CLI source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAdapter {
    as_of: Option<UtcDateTime>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps every snapshot with `as_of` instead of the wall clock.
    pub fn at(as_of: UtcDateTime) -> Self {
        Self { as_of: Some(as_of) }
    }

    pub fn tickers() -> Vec<Symbol> {
        TAPE.iter()
            .filter_map(|row| Symbol::parse(row.ticker).ok())
            .collect()
    }

    /// The whole tape, in tape order.
    pub fn tape(&self) -> Vec<Stock> {
        let as_of = self.as_of.unwrap_or_else(UtcDateTime::now);
        TAPE.iter()
            .filter_map(|row| build_stock(row, as_of))
            .collect()
    }
}

fn build_stock(row: &TapeRow, as_of: UtcDateTime) -> Option<Stock> {
    let ticker = Symbol::parse(row.ticker).ok()?;
    // rounded to cents so the regular-session figure reads like a quote
    let day_gain = ((row.total_gain - row.pre_market_gain) * 100.0).round() / 100.0;

    Stock::new(
        ticker,
        row.price,
        day_gain,
        Some(row.pre_market_gain),
        row.volume,
        row.avg_volume,
        row.relative_volume,
        row.float,
        row.seven_day_change,
        Some(row.last_hod),
        as_of,
    )
    .ok()
}

impl SnapshotSource for MockAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Mock
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let tape = self.tape();
            if req.is_discovery() {
                return Ok(SnapshotBatch {
                    snapshots: tape,
                    skipped: Vec::new(),
                });
            }

            let mut batch = SnapshotBatch::default();
            for ticker in req.tickers {
                match tape.iter().find(|stock| stock.ticker == ticker) {
                    Some(stock) => batch.snapshots.push(stock.clone()),
                    None => {
                        warn!(ticker = %ticker, source = "mock", "ticker not on reference tape");
                        batch.skip(ticker, "not on the reference tape");
                    }
                }
            }
            Ok(batch)
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            HealthStatus::new(
                ProviderId::Mock,
                HealthState::Connected,
                "reference tape loaded",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tape_carries_ten_valid_snapshots() {
        let tape = MockAdapter::new().tape();
        assert_eq!(tape.len(), 10);
        assert_eq!(MockAdapter::tickers().len(), 10);
    }

    #[test]
    fn regular_session_gain_excludes_pre_market() {
        let as_of = UtcDateTime::parse("2025-03-14T13:30:00Z").expect("ts");
        let tape = MockAdapter::at(as_of).tape();
        let vero = &tape[0];

        assert_eq!(vero.day_gain, 354.73);
        assert_eq!(vero.pre_market_gain, Some(15.2));
        assert!((vero.total_gain() - 369.93).abs() < 1e-9);
        assert_eq!(vero.timestamp, as_of);
    }

    #[tokio::test]
    async fn unknown_tickers_are_skipped() {
        let request = SnapshotRequest::new(vec![
            Symbol::parse("IBRX").expect("symbol"),
            Symbol::parse("AAPL").expect("symbol"),
        ])
        .expect("request");

        let batch = MockAdapter::new().snapshots(request).await.expect("batch");

        assert_eq!(batch.snapshots.len(), 1);
        assert_eq!(batch.snapshots[0].ticker.as_str(), "IBRX");
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].ticker.as_str(), "AAPL");
    }
}
