//! Snapshot source contract.
//!
//! A [`SnapshotSource`] turns a list of tickers into normalized [`Stock`]
//! snapshots. Provider-specific payloads never leave the adapter.
//!
//! Failures come in two sizes:
//!
//! | Scope | Reported as |
//! |-------|-------------|
//! | One ticker (missing quote, bad payload) | [`SkippedTicker`] in the batch |
//! | Whole source (no key, rate limited, down) | [`SourceError`] |
//!
//! Skipped tickers never reach the screening pipeline.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, Stock, Symbol, UtcDateTime};

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Unauthorized,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unauthorized,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Tickers to fetch snapshots for.
///
/// Some sources can discover candidates on their own (a top-gainers list);
/// those accept [`SnapshotRequest::discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub tickers: Vec<Symbol>,
}

impl SnapshotRequest {
    pub fn new(tickers: Vec<Symbol>) -> Result<Self, SourceError> {
        if tickers.is_empty() {
            return Err(SourceError::invalid_request(
                "snapshot request must include at least one ticker",
            ));
        }
        Ok(Self { tickers })
    }

    /// Ask the source for its own candidate list.
    pub fn discover() -> Self {
        Self {
            tickers: Vec::new(),
        }
    }

    pub fn is_discovery(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// A ticker the source could not turn into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: Symbol,
    pub reason: String,
}

/// Normalized snapshot batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBatch {
    pub snapshots: Vec<Stock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedTicker>,
}

impl SnapshotBatch {
    pub fn skip(&mut self, ticker: Symbol, reason: impl Into<String>) {
        self.skipped.push(SkippedTicker {
            ticker,
            reason: reason.into(),
        });
    }
}

/// Connection state reported by `health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Connected,
    Degraded,
    Disconnected,
}

impl HealthState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Degraded => "degraded",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub source: ProviderId,
    pub state: HealthState,
    pub message: String,
    pub checked_at: UtcDateTime,
}

impl HealthStatus {
    pub fn new(source: ProviderId, state: HealthState, message: impl Into<String>) -> Self {
        Self {
            source,
            state,
            message: message.into(),
            checked_at: UtcDateTime::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == HealthState::Connected
    }
}

/// Snapshot adapter contract.
///
/// Implementations must be `Send + Sync`; the watchlist monitor shares one
/// source with its background task.
pub trait SnapshotSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches one snapshot per requested ticker.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] only when the source as a whole is unusable.
    /// Per-ticker failures are reported in [`SnapshotBatch::skipped`].
    fn snapshots<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotBatch, SourceError>> + Send + 'a>>;

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Arc<S> {
    fn id(&self) -> ProviderId {
        (**self).id()
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotBatch, SourceError>> + Send + 'a>> {
        (**self).snapshots(req)
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        (**self).health()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_requests_need_tickers() {
        let err = SnapshotRequest::new(Vec::new()).expect_err("empty list");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert!(!err.retryable());
        assert!(SnapshotRequest::discover().is_discovery());
    }

    #[test]
    fn display_includes_code() {
        let err = SourceError::rate_limited("finnhub budget exhausted");
        assert_eq!(
            err.to_string(),
            "finnhub budget exhausted (source.rate_limited)"
        );
        assert!(err.retryable());
    }
}
