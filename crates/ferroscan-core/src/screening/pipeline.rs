//! Kill cascade + scoring orchestration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::kill::{classify_for_kill, KillRule};
use super::scoring::{breakdown, Rating, ScoreBreakdown};
use crate::Stock;

/// A snapshot removed by the kill cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KilledStock {
    pub stock: Stock,
    pub rule: KillRule,
    pub reason: String,
    pub detail: String,
}

/// A kill-cascade survivor with its score, rating and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredStock {
    pub stock: Stock,
    pub score: u8,
    pub rating: Rating,
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
}

/// Partition of one input sequence into killed records and ranked survivors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub killed: Vec<KilledStock>,
    pub survivors: Vec<ScoredStock>,
}

impl Classification {
    pub fn total_input(&self) -> usize {
        self.killed.len() + self.survivors.len()
    }
}

/// Runs every snapshot through the kill cascade and scores the survivors.
///
/// Survivors are ordered by score descending. The sort is stable, so equal
/// scores keep their input order.
pub fn classify(stocks: &[Stock]) -> Classification {
    let mut classification = Classification::default();

    for stock in stocks {
        if let Some(rule) = classify_for_kill(stock) {
            debug!(ticker = %stock.ticker, reason = rule.reason(), "killed");
            classification.killed.push(KilledStock {
                stock: stock.clone(),
                rule,
                reason: rule.reason().to_owned(),
                detail: rule.detail(stock),
            });
            continue;
        }

        let breakdown = breakdown(stock);
        debug!(ticker = %stock.ticker, score = breakdown.score, "scored");
        classification.survivors.push(ScoredStock {
            stock: stock.clone(),
            score: breakdown.score,
            rating: Rating::from_score(breakdown.score),
            rank: 0,
            breakdown,
        });
    }

    classification
        .survivors
        .sort_by(|left, right| right.score.cmp(&left.score));
    for (index, survivor) in classification.survivors.iter_mut().enumerate() {
        survivor.rank = index + 1;
    }

    classification
}
