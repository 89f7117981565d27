// Scheduler module - Cooperative single-threaded runtime
// A monotonic clock plus a queue of cancellable one-shot timers. Callbacks are
// plain task values drained by the owner in (due time, registration) order.

pub mod clock;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::{TimerHandle, TimerQueue};

/// Convert seconds to whole microseconds (negative times clamp to zero)
pub(crate) fn seconds_to_micros(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1_000_000.0).round() as u64
    } else {
        0
    }
}

pub(crate) fn micros_to_seconds(micros: u64) -> f64 {
    micros as f64 / 1_000_000.0
}
