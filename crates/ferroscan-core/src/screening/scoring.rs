//! Weighted 10-point scoring model for kill-cascade survivors.
//!
//! | Criterion | Condition | Points |
//! |-----------|-----------|--------|
//! | Extreme gain | total gain > 100% | +2 |
//! | Tight float | float ≤ 5M | +2 |
//! | High volume | volume > 150M | +2 |
//! | Strong relative volume | relative volume > 6.5x | +1 |
//! | Tradeable price | 1 ≤ price ≤ 10 | +1 |
//! | Clean momentum day | all of the first four | +2 |
//!
//! The clean-day bonus re-rewards conditions that already scored on their own.
//! The raw sum can therefore reach 12 and is capped at [`MAX_SCORE`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Stock;

pub const MAX_SCORE: u8 = 10;

const EXTREME_GAIN_PCT: f64 = 100.0;
const TIGHT_FLOAT_M: f64 = 5.0;
const HIGH_VOLUME: u64 = 150_000_000;
const STRONG_RELATIVE_VOLUME: f64 = 6.5;
const MIN_TRADEABLE_PRICE: f64 = 1.0;
const MAX_TRADEABLE_PRICE: f64 = 10.0;

/// Which criteria fired for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub extreme_gain: bool,
    pub tight_float: bool,
    pub high_volume: bool,
    pub strong_relative_volume: bool,
    pub tradeable_price: bool,
    pub clean_momentum_day: bool,
    /// Sum before the cap.
    pub raw: u8,
    pub score: u8,
}

pub fn breakdown(stock: &Stock) -> ScoreBreakdown {
    let extreme_gain = stock.total_gain() > EXTREME_GAIN_PCT;
    let tight_float = stock.float <= TIGHT_FLOAT_M;
    let high_volume = stock.volume > HIGH_VOLUME;
    let strong_relative_volume = stock.relative_volume > STRONG_RELATIVE_VOLUME;
    let tradeable_price =
        stock.price >= MIN_TRADEABLE_PRICE && stock.price <= MAX_TRADEABLE_PRICE;
    let clean_momentum_day = extreme_gain && high_volume && tight_float && strong_relative_volume;

    let raw = [
        (extreme_gain, 2),
        (tight_float, 2),
        (high_volume, 2),
        (strong_relative_volume, 1),
        (tradeable_price, 1),
        (clean_momentum_day, 2),
    ]
    .into_iter()
    .filter(|(fired, _)| *fired)
    .map(|(_, points)| points)
    .sum::<u8>();

    ScoreBreakdown {
        extreme_gain,
        tight_float,
        high_volume,
        strong_relative_volume,
        tradeable_price,
        clean_momentum_day,
        raw,
        score: raw.min(MAX_SCORE),
    }
}

/// Capped score in `0..=10`.
pub fn score(stock: &Stock) -> u8 {
    breakdown(stock).score
}

/// Qualitative rating derived from a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "A+ Daytrade")]
    APlusDaytrade,
    #[serde(rename = "Very Strong")]
    VeryStrong,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Only with Setup")]
    OnlyWithSetup,
    #[serde(rename = "Not Suitable")]
    NotSuitable,
}

impl Rating {
    pub const fn from_score(score: u8) -> Self {
        match score {
            9.. => Self::APlusDaytrade,
            8 => Self::VeryStrong,
            7 => Self::Good,
            6 => Self::OnlyWithSetup,
            _ => Self::NotSuitable,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::APlusDaytrade => "A+ Daytrade",
            Self::VeryStrong => "Very Strong",
            Self::Good => "Good",
            Self::OnlyWithSetup => "Only with Setup",
            Self::NotSuitable => "Not Suitable",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::APlusDaytrade => "🚀🚀🚀",
            Self::VeryStrong => "🚀🚀",
            Self::Good => "🚀",
            Self::OnlyWithSetup => "⚠️",
            Self::NotSuitable => "❌",
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, UtcDateTime};

    fn stock(price: f64, gain: f64, volume: u64, float: f64, relative_volume: f64) -> Stock {
        Stock {
            ticker: Symbol::parse("SCORE").expect("symbol"),
            price,
            day_gain: gain,
            pre_market_gain: None,
            volume,
            avg_volume: 1,
            relative_volume,
            float,
            seven_day_change: 0.0,
            last_hod: None,
            timestamp: UtcDateTime::parse("2025-03-14T13:30:00Z").expect("ts"),
        }
    }

    #[test]
    fn all_six_criteria_cap_at_ten() {
        let perfect = breakdown(&stock(5.0, 150.0, 200_000_000, 2.0, 8.0));
        assert!(perfect.clean_momentum_day);
        assert_eq!(perfect.raw, 12);
        assert_eq!(perfect.score, MAX_SCORE);
    }

    #[test]
    fn clean_day_needs_every_component() {
        // relative volume 6.5 is not strictly above the threshold
        let almost = breakdown(&stock(5.0, 150.0, 200_000_000, 2.0, 6.5));
        assert!(!almost.strong_relative_volume);
        assert!(!almost.clean_momentum_day);
        assert_eq!(almost.score, 7);
    }

    #[test]
    fn nothing_fires_for_a_plain_record() {
        let plain = breakdown(&stock(15.0, 20.0, 1_000_000, 30.0, 2.0));
        assert_eq!(plain.raw, 0);
        assert_eq!(Rating::from_score(plain.score), Rating::NotSuitable);
    }

    #[test]
    fn rating_thresholds_evaluate_highest_first() {
        assert_eq!(Rating::from_score(10), Rating::APlusDaytrade);
        assert_eq!(Rating::from_score(9), Rating::APlusDaytrade);
        assert_eq!(Rating::from_score(8), Rating::VeryStrong);
        assert_eq!(Rating::from_score(7), Rating::Good);
        assert_eq!(Rating::from_score(6), Rating::OnlyWithSetup);
        assert_eq!(Rating::from_score(5), Rating::NotSuitable);
        assert_eq!(Rating::from_score(0).emoji(), "❌");
    }

    #[test]
    fn rating_serializes_as_label() {
        let json = serde_json::to_string(&Rating::OnlyWithSetup).expect("serialize");
        assert_eq!(json, "\"Only with Setup\"");
    }
}
