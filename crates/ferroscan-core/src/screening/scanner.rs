use serde::{Deserialize, Serialize};
use tracing::info;

use super::filter;
use super::pipeline::{classify, Classification};
use super::report::{criteria_met_percentage, summarize, ScanResult, ScanSummary};
use crate::{ScanCriteria, Stock, UtcDateTime, ValidationError};

/// Everything one scan produces: baseline matches, the kill/score partition of
/// those matches, and the aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub result: ScanResult,
    pub classification: Classification,
    pub summary: ScanSummary,
    /// Snapshots handed to the scan, before the baseline filter.
    pub total_input: usize,
    /// Share of the input that cleared the baseline filter.
    pub criteria_met_pct: u8,
}

/// Full screening chain bound to one set of criteria.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scanner {
    criteria: ScanCriteria,
}

impl Scanner {
    pub fn new(criteria: ScanCriteria) -> Result<Self, ValidationError> {
        criteria.validate()?;
        Ok(Self { criteria })
    }

    pub fn criteria(&self) -> &ScanCriteria {
        &self.criteria
    }

    /// Baseline filter → kill cascade → scoring → summary.
    pub fn scan(&self, snapshots: &[Stock], scanned_at: UtcDateTime) -> ScanReport {
        let matching = filter::apply(snapshots, &self.criteria);
        let classification = classify(&matching);
        let summary = summarize(&classification);
        let criteria_met_pct = criteria_met_percentage(snapshots.len(), matching.len());

        info!(
            input = snapshots.len(),
            matching = matching.len(),
            killed = summary.total_killed,
            survivors = summary.total_survivors,
            "scan complete"
        );

        ScanReport {
            result: ScanResult::new(matching, self.criteria, scanned_at),
            classification,
            summary,
            total_input: snapshots.len(),
            criteria_met_pct,
        }
    }
}
