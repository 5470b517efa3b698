use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Baseline thresholds every snapshot must clear before kill rules and scoring.
///
/// Every field has a default, so partial JSON or TOML payloads merge with the
/// stock small-cap momentum profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanCriteria {
    pub min_price: f64,
    pub max_price: f64,
    /// Floor on total gain (day + pre-market), in percent.
    pub min_day_gain: f64,
    /// Symmetric bound on the absolute seven-day change, in percent.
    pub max_seven_day_change: f64,
    pub min_relative_volume: f64,
    pub min_day_volume: u64,
}

impl Default for ScanCriteria {
    fn default() -> Self {
        Self {
            min_price: 1.0,
            max_price: 20.0,
            min_day_gain: 10.0,
            max_seven_day_change: 10.0,
            min_relative_volume: 5.0,
            min_day_volume: 100_000,
        }
    }
}

impl ScanCriteria {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("minPrice", self.min_price),
            ("maxPrice", self.max_price),
            ("maxSevenDayChange", self.max_seven_day_change),
            ("minRelativeVolume", self.min_relative_volume),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteValue { field });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeValue { field });
            }
        }

        // A negative gain floor is legitimate (screen for dips), it only has to be a number.
        if !self.min_day_gain.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "minDayGain",
            });
        }

        if self.min_price > self.max_price {
            return Err(ValidationError::InvertedPriceBand {
                min_price: self.min_price,
                max_price: self.max_price,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let criteria = ScanCriteria::default();
        assert!(criteria.validate().is_ok());
        assert_eq!(criteria.min_day_volume, 100_000);
    }

    #[test]
    fn partial_payload_merges_with_defaults() {
        let criteria: ScanCriteria =
            serde_json::from_str(r#"{"maxPrice": 10.0, "minRelativeVolume": 6}"#).expect("valid");
        assert_eq!(criteria.max_price, 10.0);
        assert_eq!(criteria.min_relative_volume, 6.0);
        assert_eq!(criteria.min_price, 1.0);
        assert_eq!(criteria.min_day_gain, 10.0);
    }

    #[test]
    fn rejects_inverted_band_and_negative_thresholds() {
        let inverted = ScanCriteria {
            min_price: 25.0,
            ..ScanCriteria::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ValidationError::InvertedPriceBand { .. })
        ));

        let negative = ScanCriteria {
            min_relative_volume: -1.0,
            ..ScanCriteria::default()
        };
        assert_eq!(
            negative.validate(),
            Err(ValidationError::NegativeValue {
                field: "minRelativeVolume"
            })
        );
    }
}
