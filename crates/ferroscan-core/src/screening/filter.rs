//! Baseline threshold filter.

use crate::{ScanCriteria, Stock};

/// Whether a snapshot clears every baseline threshold.
pub fn passes(stock: &Stock, criteria: &ScanCriteria) -> bool {
    let in_price_band = stock.price >= criteria.min_price && stock.price <= criteria.max_price;

    in_price_band
        && stock.total_gain() >= criteria.min_day_gain
        && stock.seven_day_change.abs() <= criteria.max_seven_day_change
        && stock.relative_volume >= criteria.min_relative_volume
        && stock.volume >= criteria.min_day_volume
}

/// Order-preserving subsequence of `stocks` that clears the baseline.
pub fn apply(stocks: &[Stock], criteria: &ScanCriteria) -> Vec<Stock> {
    stocks
        .iter()
        .filter(|stock| passes(stock, criteria))
        .cloned()
        .collect()
}
