//! Time utilities for the game loop

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Default tick rate of the authoritative loop
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Duration of a single tick at the given rate
pub fn tick_duration(tick_rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / tick_rate.max(1) as u64)
}

/// Whole seconds left until `deadline`, rounded up so a fresh 10s countdown reads 10
pub fn seconds_until(now: Duration, deadline: Duration) -> u32 {
    let remaining = deadline.saturating_sub(now);
    let millis = remaining.as_millis() as u64;
    millis.div_ceil(1000) as u32
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
