//! Minimum-interval gate for outgoing description requests.
//!
//! Viewport changes can fire far faster than an LLM should be called. The
//! throttle admits one request per interval and rejects the rest.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

/// Default minimum interval between requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(5);

type Limiter<C> = RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Admits at most one request per interval.
pub struct RequestThrottle<C: Clock = DefaultClock> {
    limiter: Limiter<C>,
    interval: Duration,
}

impl RequestThrottle {
    /// A throttle on the system clock.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, &DefaultClock::default())
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl<C: Clock> RequestThrottle<C> {
    /// A throttle on a custom clock. A zero interval admits everything.
    #[must_use]
    pub fn with_clock(interval: Duration, clock: &C) -> Self {
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX));
        Self {
            limiter: RateLimiter::direct_with_clock(quota, clock),
            interval,
        }
    }

    /// The configured minimum interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` and consumes the slot if a request may go out now.
    pub fn try_acquire(&self) -> bool {
        if self.limiter.check().is_ok() {
            true
        } else {
            log::info!(
                "Skipping request: less than {:?} since the previous one",
                self.interval
            );
            false
        }
    }
}
