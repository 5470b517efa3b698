//! # Ferroscan Core
//!
//! Screening engine and snapshot sources for the Ferroscan small-cap momentum
//! scanner.
//!
//! ## Overview
//!
//! - **Domain models** for tickers, timestamps, stock snapshots and scan criteria
//! - **Screening pipeline**: baseline filter, kill-filter cascade, 10-point
//!   scoring model and aggregate report
//! - **Snapshot sources** behind one trait (reference tape, Finnhub, IB gateway)
//! - **Watchlist monitor** that re-runs the scan on a schedule
//! - **Response envelope** with metadata and structured errors
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Snapshot sources (mock tape, Finnhub, IB gateway) |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`data_source`] | Snapshot source trait and request/response types |
//! | [`domain`] | Symbol, timestamp, stock snapshot, scan criteria |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`monitor`] | Periodic watchlist monitor |
//! | [`screening`] | Filter, kill cascade, scoring and reporting |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Upstream call budgets |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferroscan_core::{MockAdapter, Scanner, SnapshotRequest, SnapshotSource, UtcDateTime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let batch = MockAdapter::new().snapshots(SnapshotRequest::discover()).await?;
//!     let report = Scanner::default().scan(&batch.snapshots, UtcDateTime::now());
//!
//!     for survivor in &report.classification.survivors {
//!         println!(
//!             "#{} {} {}/10 {}",
//!             survivor.rank, survivor.stock.ticker, survivor.score, survivor.rating
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Snapshot Source │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │ Vec<Stock>
//!          ▼
//! ┌─────────────────┐
//! │ Baseline Filter │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Kill Cascade    │────▶│ killed + reason  │
//! └────────┬────────┘     └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Scoring / Rank  │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ ScanReport      │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Source failures are structured:
//!
//! ```rust
//! use ferroscan_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited => {
//!             // wait for the call budget to refill
//!         }
//!         SourceErrorKind::Unauthorized => {
//!             // configure an api key
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! API keys are read from configuration or the environment and are masked
//! in request logs.

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod monitor;
pub mod screening;
pub mod source;
pub mod throttling;

// Adapters
pub use adapters::{FinnhubAdapter, IbkrGatewayAdapter, MockAdapter};

// Configuration
pub use config::{ConfigError, FinnhubConfig, IbkrConfig, MonitorConfig, ScannerConfig};

// Source contract
pub use data_source::{
    HealthState, HealthStatus, SkippedTicker, SnapshotBatch, SnapshotRequest, SnapshotSource,
    SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{relative_volume, ScanCriteria, Stock, Symbol, UtcDateTime};

pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Monitor
pub use monitor::{Clock, IntervalTicker, MonitorError, ScanTicker, SystemClock, WatchlistMonitor};

// Screening
pub use screening::{
    classify, classify_for_kill, criteria_met_percentage, summarize, Classification, KillRule,
    KilledStock, Rating, ScanReport, ScanResult, ScanSummary, Scanner, ScoreBreakdown,
    ScoredStock,
};

pub use source::ProviderId;
pub use throttling::{BudgetDenial, RequestBudget};
