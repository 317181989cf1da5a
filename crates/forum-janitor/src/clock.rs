//! Clock abstraction so sweeps can be run against a fixed "now" in tests.
//!
//! - `SystemClock`: wall-clock UTC time
//! - `MockClock`: returns a controllable time that only moves on `advance()`

use chrono::{DateTime, Utc};

/// Abstraction over the wall clock.
pub trait Clock: Send + Sync + 'static {
    /// Return the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Live implementation: delegates to `Utc::now()`.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use mock::MockClock;
