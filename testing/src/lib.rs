//! # Guestdesk Testing
//!
//! Testing utilities for reducers:
//! - [`ReducerTest`]: Given/When/Then runner
//! - [`FixedClock`] and [`test_clock`]: deterministic time
//! - [`assertions`]: effect assertions
//!
//! ## Example
//!
//! ```ignore
//! use guestdesk_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(ScannerReducer::new())
//!     .with_env(test_environment())
//!     .given_state(ScannerState::default())
//!     .when_action(ScannerAction::Reset)
//!     .then_state(|state| assert!(state.phase.is_accepting_input()))
//!     .run();
//! ```

use chrono::{DateTime, Duration, Utc};
use guestdesk_core::environment::Clock;
use std::sync::Mutex;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Duration, Mutex, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until explicitly advanced.
    ///
    /// # Example
    ///
    /// ```
    /// use guestdesk_testing::mocks::FixedClock;
    /// use guestdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug)]
    pub struct FixedClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            if let Ok(mut time) = self.time.lock() {
                *time += by;
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
                .lock()
                .map_or_else(|poisoned| *poisoned.into_inner(), |time| *time)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_089))
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = test_clock();
        let before = clock.now();
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now() - before, Duration::minutes(5));
    }
}
