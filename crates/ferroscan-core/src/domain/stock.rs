use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Point-in-time quote snapshot for one ticker.
///
/// Numeric fields that a provider could not fill are carried as `0.0` / `0`
/// rather than rejected; the screening rules treat them as ordinary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StockRecord")]
pub struct Stock {
    pub ticker: Symbol,
    pub price: f64,
    /// Regular-session gain in percent.
    pub day_gain: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_market_gain: Option<f64>,
    pub volume: u64,
    pub avg_volume: u64,
    pub relative_volume: f64,
    /// Tradeable float in millions of shares.
    pub float: f64,
    pub seven_day_change: f64,
    #[serde(rename = "lastHOD")]
    pub last_hod: Option<f64>,
    pub timestamp: UtcDateTime,
}

impl Stock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: Symbol,
        price: f64,
        day_gain: f64,
        pre_market_gain: Option<f64>,
        volume: u64,
        avg_volume: u64,
        relative_volume: f64,
        float: f64,
        seven_day_change: f64,
        last_hod: Option<f64>,
        timestamp: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        let stock = Self {
            ticker,
            price,
            day_gain,
            pre_market_gain,
            volume,
            avg_volume,
            relative_volume,
            float,
            seven_day_change,
            last_hod,
            timestamp,
        };
        stock.validate()?;
        Ok(stock)
    }

    /// Builds a snapshot whose relative volume is derived from `volume / avg_volume`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw_volume(
        ticker: Symbol,
        price: f64,
        day_gain: f64,
        pre_market_gain: Option<f64>,
        volume: u64,
        avg_volume: u64,
        float: f64,
        seven_day_change: f64,
        last_hod: Option<f64>,
        timestamp: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        Self::new(
            ticker,
            price,
            day_gain,
            pre_market_gain,
            volume,
            avg_volume,
            relative_volume(volume, avg_volume),
            float,
            seven_day_change,
            last_hod,
            timestamp,
        )
    }

    /// Regular-session plus pre-market gain. Every screening rule reads this
    /// figure, never `day_gain` alone.
    pub fn total_gain(&self) -> f64 {
        self.day_gain + self.pre_market_gain.unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_positive("price", self.price)?;
        validate_finite("dayGain", self.day_gain)?;
        if let Some(pre_market_gain) = self.pre_market_gain {
            validate_finite("preMarketGain", pre_market_gain)?;
        }
        validate_non_negative("relativeVolume", self.relative_volume)?;
        validate_non_negative("float", self.float)?;
        validate_finite("sevenDayChange", self.seven_day_change)?;
        if let Some(last_hod) = self.last_hod {
            validate_positive("lastHOD", last_hod)?;
        }
        Ok(())
    }
}

/// `volume / avg_volume`, or `0.0` when there is no baseline to compare against.
pub fn relative_volume(volume: u64, avg_volume: u64) -> f64 {
    if avg_volume == 0 {
        return 0.0;
    }
    volume as f64 / avg_volume as f64
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockRecord {
    ticker: Symbol,
    price: f64,
    day_gain: f64,
    #[serde(default)]
    pre_market_gain: Option<f64>,
    volume: u64,
    avg_volume: u64,
    relative_volume: f64,
    float: f64,
    seven_day_change: f64,
    #[serde(default, rename = "lastHOD")]
    last_hod: Option<f64>,
    timestamp: UtcDateTime,
}

impl TryFrom<StockRecord> for Stock {
    type Error = ValidationError;

    fn try_from(record: StockRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.ticker,
            record.price,
            record.day_gain,
            record.pre_market_gain,
            record.volume,
            record.avg_volume,
            record.relative_volume,
            record.float,
            record.seven_day_change,
            record.last_hod,
            record.timestamp,
        )
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
