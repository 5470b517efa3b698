use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Why a budget refused to hand out calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDenial {
    /// Out of calls for now; retry after the wait.
    Exhausted(Duration),
    /// The request is larger than the whole budget and can never be granted.
    ExceedsLimit { requested: u32, limit: u32 },
}

/// Shared upstream call budget, e.g. Finnhub's free tier of 60 calls per minute.
///
/// Clones share the same budget.
#[derive(Clone)]
pub struct RequestBudget {
    limiter: Arc<DirectRateLimiter>,
    limit: NonZeroU32,
    replenish_every: Duration,
}

impl std::fmt::Debug for RequestBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBudget")
            .field("limit", &self.limit)
            .field("replenish_every", &self.replenish_every)
            .finish_non_exhaustive()
    }
}

impl RequestBudget {
    /// `limit` calls per `window`, all of which may be spent in a burst.
    pub fn new(window: Duration, limit: u32) -> Self {
        let limit = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
        let seconds_per_cell = (window.as_secs_f64() / f64::from(limit.get())).max(0.001);
        let replenish_every = Duration::from_secs_f64(seconds_per_cell);

        let quota = Quota::with_period(replenish_every)
            .unwrap_or_else(|| Quota::per_second(limit))
            .allow_burst(limit);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            limit,
            replenish_every,
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(Duration::from_secs(60), limit)
    }

    /// Spends one call. When the budget is exhausted, returns how long until
    /// the next call is allowed.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|_| self.replenish_every)
    }

    pub fn limit(&self) -> u32 {
        self.limit.get()
    }

    /// Spends `calls` calls at once, or none of them.
    pub fn try_acquire_n(&self, calls: u32) -> Result<(), BudgetDenial> {
        let Some(calls) = NonZeroU32::new(calls) else {
            return Ok(());
        };

        match self.limiter.check_n(calls) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(BudgetDenial::Exhausted(self.replenish_every * calls.get())),
            Err(_) => Err(BudgetDenial::ExceedsLimit {
                requested: calls.get(),
                limit: self.limit.get(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_after_burst_and_reports_wait() {
        let budget = RequestBudget::per_minute(2);

        assert!(budget.try_acquire().is_ok());
        assert!(budget.try_acquire().is_ok());
        assert_eq!(budget.try_acquire(), Err(Duration::from_secs(30)));
    }

    #[test]
    fn batch_acquire_is_all_or_nothing() {
        let budget = RequestBudget::per_minute(3);

        assert!(budget.try_acquire_n(3).is_ok());
        assert_eq!(
            budget.try_acquire_n(1),
            Err(BudgetDenial::Exhausted(Duration::from_secs(20)))
        );
        assert_eq!(budget.try_acquire_n(0), Ok(()));
    }

    #[test]
    fn requests_larger_than_the_budget_are_never_granted() {
        let budget = RequestBudget::per_minute(2);

        assert_eq!(
            budget.try_acquire_n(3),
            Err(BudgetDenial::ExceedsLimit {
                requested: 3,
                limit: 2
            })
        );
        // nothing was spent
        assert!(budget.try_acquire_n(2).is_ok());
    }

    #[test]
    fn clones_share_the_budget() {
        let budget = RequestBudget::per_minute(1);
        let clone = budget.clone();

        assert!(budget.try_acquire().is_ok());
        assert!(clone.try_acquire().is_err());
    }
}
