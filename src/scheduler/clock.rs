// Clock - Monotonic time sources
// SystemClock follows the wall clock; ManualClock is moved by its owner
// (offline rendering and tests).

use super::{micros_to_seconds, seconds_to_micros};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time source, in seconds since an arbitrary origin
pub trait Clock: Send {
    fn now(&self) -> f64;
}

/// Wall clock anchored at creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Clock sharing an origin with another time base (e.g. a render thread)
    pub fn with_origin(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock advanced explicitly. Clones share the same time.
///
/// Time is stored in whole microseconds so that values read back from the
/// timer queue land exactly on their deadlines.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::Relaxed)
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set_seconds(&self, seconds: f64) {
        self.micros
            .fetch_max(seconds_to_micros(seconds), Ordering::Relaxed);
    }

    pub fn advance_seconds(&self, seconds: f64) {
        self.micros
            .fetch_add(seconds_to_micros(seconds), Ordering::Relaxed);
    }

    pub fn advance_ms(&self, ms: f64) {
        self.advance_seconds(ms / 1000.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        micros_to_seconds(self.now_micros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let observer = clock.clone();

        clock.advance_ms(250.0);
        assert_eq!(observer.now(), 0.25);

        clock.set_seconds(2.0);
        assert_eq!(observer.now(), 2.0);
    }

    #[test]
    fn test_manual_clock_is_monotonic() {
        let clock = ManualClock::new();
        clock.set_seconds(3.0);
        clock.set_seconds(1.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now() > first);
    }
}
