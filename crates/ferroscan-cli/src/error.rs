use ferroscan_core::{ConfigError, MonitorError, SourceError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(ConfigError::Io { .. }) => 10,
            Self::Config(_) => 2,
            Self::Source(_) => 3,
            Self::Monitor(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_categories_to_exit_codes() {
        assert_eq!(CliError::from(ValidationError::EmptySymbol).exit_code(), 2);
        assert_eq!(
            CliError::from(SourceError::unauthorized("no key")).exit_code(),
            3
        );
        assert_eq!(
            CliError::from(ConfigError::Invalid(ValidationError::InvalidInterval)).exit_code(),
            2
        );
        assert_eq!(
            CliError::from(std::io::Error::other("broken pipe")).exit_code(),
            10
        );
    }
}
