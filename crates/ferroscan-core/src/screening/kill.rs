//! Kill-filter cascade.
//!
//! Coarse disqualifiers that run before scoring. Rules are evaluated in
//! [`KillRule::CASCADE`] order and the first match wins, so a record never
//! carries more than one reason.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Stock;

const MAX_FLOAT_M: f64 = 500.0;
const HEAVY_FLOAT_M: f64 = 15.0;
const HEAVY_FLOAT_MIN_VOLUME: u64 = 100_000_000;
const MOMENTUM_MIN_GAIN_PCT: f64 = 50.0;
const MOMENTUM_FLOAT_M: f64 = 10.0;
const MIN_RELATIVE_VOLUME: f64 = 6.0;

/// Disqualification rule, in cascade priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillRule {
    /// Float above 500M shares.
    OversizedFloat,
    /// Float of 15M or more without 100M shares traded.
    HeavyFloatThinVolume,
    /// Total gain under 50% on a float above 10M.
    WeakMomentumForFloat,
    /// Relative volume under 6x.
    WeakRelativeVolume,
}

impl KillRule {
    pub const CASCADE: [Self; 4] = [
        Self::OversizedFloat,
        Self::HeavyFloatThinVolume,
        Self::WeakMomentumForFloat,
        Self::WeakRelativeVolume,
    ];

    pub fn matches(self, stock: &Stock) -> bool {
        match self {
            Self::OversizedFloat => stock.float > MAX_FLOAT_M,
            Self::HeavyFloatThinVolume => {
                stock.float >= HEAVY_FLOAT_M && stock.volume < HEAVY_FLOAT_MIN_VOLUME
            }
            Self::WeakMomentumForFloat => {
                stock.total_gain() < MOMENTUM_MIN_GAIN_PCT && stock.float > MOMENTUM_FLOAT_M
            }
            Self::WeakRelativeVolume => stock.relative_volume < MIN_RELATIVE_VOLUME,
        }
    }

    /// Stable, human-readable rejection reason.
    pub const fn reason(self) -> &'static str {
        match self {
            Self::OversizedFloat => "float too large, too sluggish.",
            Self::HeavyFloatThinVolume => "large float with insufficient volume.",
            Self::WeakMomentumForFloat => "insufficient momentum for float size.",
            Self::WeakRelativeVolume => "relative volume spike too weak.",
        }
    }

    /// Reason annotated with the offending figures of `stock`.
    pub fn detail(self, stock: &Stock) -> String {
        match self {
            Self::OversizedFloat => format!("float ~{}M → too sluggish", stock.float),
            Self::HeavyFloatThinVolume => format!(
                "float {}M with only {} shares traded",
                stock.float, stock.volume
            ),
            Self::WeakMomentumForFloat => format!(
                "gain {:.2}% is not explosive enough for a {}M float",
                stock.total_gain(),
                stock.float
            ),
            Self::WeakRelativeVolume => {
                format!("relative volume {:.2}x < 6x", stock.relative_volume)
            }
        }
    }
}

impl Display for KillRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// First rule in the cascade that disqualifies `stock`, or `None` if it survives.
pub fn classify_for_kill(stock: &Stock) -> Option<KillRule> {
    KillRule::CASCADE
        .into_iter()
        .find(|rule| rule.matches(stock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, UtcDateTime};

    fn stock(float: f64, volume: u64, day_gain: f64, relative_volume: f64) -> Stock {
        Stock {
            ticker: Symbol::parse("KILL").expect("symbol"),
            price: 4.0,
            day_gain,
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
    fn boundaries_follow_strict_and_inclusive_comparisons() {
        // float exactly 500 is not "too large"
        assert_ne!(
            classify_for_kill(&stock(500.0, 200_000_000, 120.0, 8.0)),
            Some(KillRule::OversizedFloat)
        );
        // float exactly 15 counts as heavy
        assert_eq!(
            classify_for_kill(&stock(15.0, 99_999_999, 120.0, 8.0)),
            Some(KillRule::HeavyFloatThinVolume)
        );
        // exactly 100M volume is enough
        assert_eq!(classify_for_kill(&stock(15.0, 100_000_000, 120.0, 8.0)), None);
        // relative volume exactly 6 survives
        assert_eq!(classify_for_kill(&stock(3.0, 1_000, 10.0, 6.0)), None);
    }

    #[test]
    fn momentum_rule_uses_total_gain() {
        let mut candidate = stock(12.0, 150_000_000, 45.0, 7.0);
        assert_eq!(
            classify_for_kill(&candidate),
            Some(KillRule::WeakMomentumForFloat)
        );

        candidate.pre_market_gain = Some(5.0);
        assert_eq!(classify_for_kill(&candidate), None);
    }

    #[test]
    fn zero_sentinels_fall_through_to_relative_volume() {
        let missing_data = stock(0.0, 0, 0.0, 0.0);
        assert_eq!(
            classify_for_kill(&missing_data),
            Some(KillRule::WeakRelativeVolume)
        );
    }

    #[test]
    fn detail_mentions_offending_figures() {
        let sluggish = stock(985.0, 182_300_000, 39.87, 6.51);
        assert_eq!(
            KillRule::OversizedFloat.detail(&sluggish),
            "float ~985M → too sluggish"
        );
        assert_eq!(
            KillRule::WeakRelativeVolume.detail(&stock(1.0, 1, 1.0, 5.2)),
            "relative volume 5.20x < 6x"
        );
    }
}
