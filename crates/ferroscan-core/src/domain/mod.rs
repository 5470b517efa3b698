//! # Domain Models
//!
//! Record types shared by the screening pipeline, the snapshot sources and the
//! watchlist monitor.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Stock`] | Quote snapshot with gain, volume and float figures |
//! | [`ScanCriteria`] | Baseline thresholds for one scan |
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`UtcDateTime`] | RFC3339 UTC timestamp |
//!
//! Snapshots are immutable once built. Screening stages decorate copies
//! (`KilledStock`, `ScoredStock`) instead of mutating them.

mod criteria;
mod stock;
mod symbol;
mod timestamp;

pub use criteria::ScanCriteria;
pub use stock::{relative_volume, Stock};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
