//! # Screening Pipeline
//!
//! ```text
//! snapshots ──▶ filter (ScanCriteria) ──▶ kill cascade ──┬─▶ killed (reason)
//!                                                         └─▶ scoring ──▶ ranked survivors
//!                                                                   │
//!                                                                   ▼
//!                                                               summarize
//! ```
//!
//! Every stage is a pure function of its input. Nothing here fails at runtime;
//! malformed snapshots are rejected earlier, when a [`Stock`](crate::Stock) is built.

pub mod filter;
pub mod kill;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod scoring;

pub use kill::{classify_for_kill, KillRule};
pub use pipeline::{classify, Classification, KilledStock, ScoredStock};
pub use report::{criteria_met_percentage, summarize, ScanResult, ScanSummary};
pub use scanner::{ScanReport, Scanner};
pub use scoring::{breakdown, score, Rating, ScoreBreakdown, MAX_SCORE};
