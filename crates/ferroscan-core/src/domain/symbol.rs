use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;

/// Upper-cased exchange ticker, e.g. `VERO` or `BRK.B`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker. A leading `$` (cashtag) is stripped.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        let mut chars = normalized.chars().enumerate();
        if let Some((_, first)) = chars.next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        if let Some((index, ch)) =
            chars.find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-'))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(normalized))
    }

    /// Parse a list of raw tickers, splitting comma-separated entries.
    ///
    /// Duplicates are kept in first-seen order only once.
    pub fn parse_list<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>, ValidationError> {
        let mut symbols: Vec<Self> = Vec::with_capacity(raw.len());
        for entry in raw {
            for part in entry.as_ref().split(',').filter(|part| !part.trim().is_empty()) {
                let symbol = Self::parse(part)?;
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        Ok(symbols)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_whitespace_and_cashtag() {
        assert_eq!(Symbol::parse(" vero ").expect("valid").as_str(), "VERO");
        assert_eq!(Symbol::parse("$jfbr").expect("valid").as_str(), "JFBR");
    }

    #[test]
    fn rejects_leading_digit_and_bad_chars() {
        assert!(matches!(
            Symbol::parse("1ABC"),
            Err(ValidationError::SymbolInvalidStart { ch: '1' })
        ));
        assert!(matches!(
            Symbol::parse("AB$C"),
            Err(ValidationError::SymbolInvalidChar { ch: '$', index: 2 })
        ));
        assert!(matches!(Symbol::parse("$"), Err(ValidationError::EmptySymbol)));
    }

    #[test]
    fn parse_list_splits_commas_and_drops_duplicates() {
        let parsed = Symbol::parse_list(&["vero,ivf", "VERO", " jagx "]).expect("valid list");
        let tickers = parsed.iter().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(tickers, vec!["VERO", "IVF", "JAGX"]);
    }
}
