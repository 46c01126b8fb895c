use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Millisecond clock in the shape of the firmware's `millis()`: a
/// `u32` counter that wraps after ~49.7 days. All consumers must
/// compare timestamps through [`elapsed_ms`], never by subtracting
/// the other way around.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Wraparound-safe elapsed time between two clock readings.
pub fn elapsed_ms(now: u32, start: u32) -> u32 {
    now.wrapping_sub(start)
}

/// Monotonic wall clock for the binary.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Hand-advanced clock for tests. Clones share the same underlying
/// counter, so a test can hold one handle while the state machine
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU32>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: u32) -> Self {
        let clock = Self::default();
        clock.set(ms);
        clock
    }

    pub fn set(&self, ms: u32) {
        self.0.store(ms, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u32) {
        self.0.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_wraparound() {
        let start = u32::MAX - 5;
        let now = 10u32;
        assert_eq!(elapsed_ms(now, start), 16);
    }

    #[test]
    fn manual_clock_clones_share_state() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now_ms(), 250);
        clock.set(1_000);
        assert_eq!(handle.now_ms(), 1_000);
    }
}
