//! Periodic watchlist monitor.
//!
//! The monitor owns a watchlist and re-runs the full scan on every tick of an
//! injected [`ScanTicker`], pushing one [`ScanReport`] per completed cycle into
//! an unbounded channel.
//!
//! ```text
//!  ticker.tick() ──▶ watchlist snapshot ──▶ source.snapshots ──▶ Scanner::scan ──▶ tx
//!        ▲                                                                        │
//!        └────────────────────────────── next cycle ◀─────────────────────────────┘
//! ```
//!
//! Cycles never overlap: a tick that fires while a scan is still running is
//! skipped. [`WatchlistMonitor::stop`] cancels an in-flight scan, so no report
//! is delivered after it returns.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::data_source::{SnapshotRequest, SnapshotSource};
use crate::screening::{ScanReport, Scanner};
use crate::{Symbol, UtcDateTime, ValidationError};

/// Default cycle length: five minutes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("monitor is already running")]
    AlreadyRunning,
}

/// Time source for report timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// Drives monitor cycles.
pub trait ScanTicker: Send + 'static {
    /// Resolves when the next cycle is due. `false` ends the monitor loop.
    fn tick<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

    /// Drops ticks that came due while a scan was running, so they are not
    /// replayed as back-to-back cycles. Tickers that buffer ticks must override.
    fn discard_pending(&mut self) {}
}

/// Fixed-period ticker over `tokio::time::interval`.
///
/// The first tick completes immediately, which gives the initial scan on
/// start. Ticks that fall inside a scan are skipped and the schedule restarts
/// from the end of that scan.
#[derive(Debug)]
pub struct IntervalTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Result<Self, ValidationError> {
        if period < Duration::from_secs(1) {
            return Err(ValidationError::InvalidInterval);
        }
        Ok(Self {
            period,
            interval: None,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl ScanTicker for IntervalTicker {
    fn tick<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            let period = self.period;
            // created lazily, tokio timers need a running runtime
            let interval = self.interval.get_or_insert_with(|| {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                interval
            });
            interval.tick().await;
            true
        })
    }

    fn discard_pending(&mut self) {
        // next tick one full period after the scan finished
        if let Some(interval) = self.interval.as_mut() {
            interval.reset();
        }
    }
}

struct Shared<S> {
    source: S,
    scanner: Scanner,
    clock: Arc<dyn Clock>,
    watchlist: RwLock<BTreeSet<Symbol>>,
    latest: RwLock<Option<ScanReport>>,
}

impl<S: SnapshotSource> Shared<S> {
    fn watchlist(&self) -> Vec<Symbol> {
        self.watchlist
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// One cycle. `None` when the source failed as a whole.
    async fn scan_once(&self) -> Option<ScanReport> {
        let tickers = self.watchlist();
        let snapshots = match SnapshotRequest::new(tickers) {
            Ok(request) => match self.source.snapshots(request).await {
                Ok(batch) => {
                    if !batch.skipped.is_empty() {
                        debug!(skipped = batch.skipped.len(), "watchlist tickers skipped");
                    }
                    batch.snapshots
                }
                Err(error) => {
                    warn!(
                        source = %self.source.id(),
                        code = error.code(),
                        error = %error,
                        "monitor cycle failed"
                    );
                    return None;
                }
            },
            // empty watchlist, nothing to fetch
            Err(_) => Vec::new(),
        };

        Some(self.scanner.scan(&snapshots, self.clock.now()))
    }
}

struct RunningTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Re-scans a watchlist on every tick of a [`ScanTicker`].
pub struct WatchlistMonitor<S> {
    shared: Arc<Shared<S>>,
    task: Mutex<Option<RunningTask>>,
}

impl<S: SnapshotSource + 'static> WatchlistMonitor<S> {
    pub fn new(source: S, scanner: Scanner) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                scanner,
                clock: Arc::new(SystemClock),
                watchlist: RwLock::new(BTreeSet::new()),
                latest: RwLock::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    /// Replaces the clock. Only takes effect before [`start`](Self::start).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.clock = clock;
        }
        self
    }

    pub fn with_watchlist(self, tickers: impl IntoIterator<Item = Symbol>) -> Self {
        for ticker in tickers {
            self.add(ticker);
        }
        self
    }

    /// Spawns the monitor loop on the current tokio runtime.
    ///
    /// Reports arrive on the returned receiver. Dropping the receiver ends the
    /// loop after the next completed cycle.
    pub fn start<T: ScanTicker>(
        &self,
        ticker: T,
    ) -> Result<mpsc::UnboundedReceiver<ScanReport>, MonitorError> {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return Err(MonitorError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run(shared, ticker, tx, shutdown_rx));

        info!(
            source = %self.shared.source.id(),
            tickers = self.shared.watchlist().len(),
            "watchlist monitor started"
        );
        *task = Some(RunningTask { shutdown, handle });
        Ok(rx)
    }

    /// Stops the loop and waits for it to exit. Idempotent.
    pub async fn stop(&self) {
        let running = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(running) = running else {
            return;
        };

        // the loop may already be gone, in which case there is nobody to tell
        let _ = running.shutdown.send(());
        if let Err(error) = running.handle.await {
            warn!(error = %error, "watchlist monitor task ended abnormally");
        }
        info!("watchlist monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Returns `true` when the ticker was not already watched.
    pub fn add(&self, ticker: Symbol) -> bool {
        self.shared
            .watchlist
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ticker)
    }

    /// Returns `true` when the ticker was watched.
    pub fn remove(&self, ticker: &Symbol) -> bool {
        self.shared
            .watchlist
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(ticker)
    }

    /// Watched tickers in sorted order.
    pub fn watchlist(&self) -> Vec<Symbol> {
        self.shared.watchlist()
    }

    /// Report from the most recent completed cycle.
    pub fn latest(&self) -> Option<ScanReport> {
        self.shared
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

async fn run<S, T>(
    shared: Arc<Shared<S>>,
    mut ticker: T,
    tx: mpsc::UnboundedSender<ScanReport>,
    mut shutdown: oneshot::Receiver<()>,
) where
    S: SnapshotSource + 'static,
    T: ScanTicker,
{
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            more = ticker.tick() => {
                if !more {
                    debug!("monitor ticker exhausted");
                    break;
                }
            }
        }

        cycle += 1;
        let report = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            report = shared.scan_once() => report,
        };
        ticker.discard_pending();
        let Some(report) = report else {
            continue;
        };

        info!(
            cycle,
            matching = report.result.total_matching(),
            survivors = report.summary.total_survivors,
            "monitor cycle complete"
        );
        *shared.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
        if tx.send(report).is_err() {
            debug!("monitor receiver dropped");
            break;
        }
    }
}
