//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Max inbound WebSocket messages per second per connection
pub const INBOUND_RATE_LIMIT: u32 = 30;

/// Per-connection rate limiter state
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    inbound: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new() -> Self {
        Self::with_limit(INBOUND_RATE_LIMIT)
    }

    pub fn with_limit(per_second: u32) -> Self {
        Self {
            inbound: create_limiter(per_second),
        }
    }

    /// Check if an inbound message is allowed (returns true if allowed)
    pub fn check(&self) -> bool {
        self.inbound.check().is_ok()
    }
}

impl Default for ConnectionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
