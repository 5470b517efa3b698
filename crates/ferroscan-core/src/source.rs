use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Snapshot provider identifiers used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Built-in reference tape.
    Mock,
    Finnhub,
    /// Interactive Brokers gateway bridge.
    Ibkr,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Mock, Self::Finnhub, Self::Ibkr];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Finnhub => "finnhub",
            Self::Ibkr => "ibkr",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "finnhub" => Ok(Self::Finnhub),
            "ibkr" | "ib" => Ok(Self::Ibkr),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
