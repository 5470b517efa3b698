//! Scan results and aggregate statistics.

use serde::{Deserialize, Serialize};

use super::pipeline::Classification;
use crate::{ScanCriteria, Stock, UtcDateTime};

/// Kill/survivor counts for one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total_killed: usize,
    pub total_survivors: usize,
    /// Survivors as a rounded percentage of all classified records, `0..=100`.
    pub percentage_met: u8,
}

pub fn summarize(classification: &Classification) -> ScanSummary {
    let total_killed = classification.killed.len();
    let total_survivors = classification.survivors.len();

    ScanSummary {
        total_killed,
        total_survivors,
        percentage_met: rounded_percentage(total_survivors, total_killed + total_survivors),
    }
}

/// Share of `total` snapshots that cleared the baseline filter; backs the
/// "criteria met" gauge.
pub fn criteria_met_percentage(total: usize, passed: usize) -> u8 {
    rounded_percentage(passed, total)
}

// Integer round-half-up of 100 * part / whole; an empty whole is 0%.
fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    ((200 * part + whole) / (2 * whole)) as u8
}

/// Baseline-filter matches for one scan, ranked by total gain.
///
/// Built once per scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    stocks: Vec<Stock>,
    total_matching: usize,
    timestamp: UtcDateTime,
    criteria: ScanCriteria,
}

impl ScanResult {
    pub fn new(mut stocks: Vec<Stock>, criteria: ScanCriteria, scanned_at: UtcDateTime) -> Self {
        stocks.sort_by(|left, right| right.total_gain().total_cmp(&left.total_gain()));
        Self {
            total_matching: stocks.len(),
            stocks,
            timestamp: scanned_at,
            criteria,
        }
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub fn total_matching(&self) -> usize {
        self.total_matching
    }

    pub fn timestamp(&self) -> UtcDateTime {
        self.timestamp
    }

    pub fn criteria(&self) -> &ScanCriteria {
        &self.criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(rounded_percentage(1, 8), 13); // 12.5
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(3, 3), 100);
        assert_eq!(rounded_percentage(0, 0), 0);
    }

    #[test]
    fn empty_classification_summarizes_to_zero() {
        let summary = summarize(&Classification::default());
        assert_eq!(summary, ScanSummary::default());
    }
}
