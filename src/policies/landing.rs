//! # Landing policy: bounded retries for landing checks.
//!
//! A subsystem's `land_check` answers "is it safe to stop me now" and may
//! legitimately say no-go while a queue drains or an in-flight request
//! finishes. [`LandingPolicy`] bounds how long the shutdown sweep waits for a
//! go before escalating, so one reluctant subsystem can never stall teardown
//! indefinitely.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use flightdeck::{LandingEscalation, LandingPolicy};
//!
//! let landing = LandingPolicy {
//!     max_attempts: 5,
//!     retry_delay: Duration::from_millis(500),
//!     escalation: LandingEscalation::ForceStop,
//! };
//! assert_eq!(landing.attempts_clamped(), 5);
//! ```

use std::time::Duration;

/// What happens when every landing-check attempt returned no-go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LandingEscalation {
    /// Stop the subsystem anyway (default).
    ///
    /// Teardown is resource reclamation; a subsystem that never agrees to
    /// land is stopped over its objection and the override is recorded.
    #[default]
    ForceStop,

    /// Record `LandingRejected` and skip `stop()` for this subsystem.
    ///
    /// The worker token is still cancelled so the worker dies with the
    /// process. Use for subsystems where a forced stop would corrupt state
    /// (e.g. a mid-write storage engine).
    Abandon,
}

/// Retry policy for landing checks during the shutdown sweep.
#[derive(Clone, Copy, Debug)]
pub struct LandingPolicy {
    /// Total number of `land_check` attempts per subsystem (minimum 1).
    pub max_attempts: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
    /// What to do once attempts are exhausted.
    pub escalation: LandingEscalation,
}

impl LandingPolicy {
    /// Returns `max_attempts` clamped to a minimum of 1.
    ///
    /// A zero-attempt policy would skip the check entirely; every subsystem
    /// is asked at least once.
    #[inline]
    pub fn attempts_clamped(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for LandingPolicy {
    /// Defaults: 3 attempts, 250ms apart, then [`LandingEscalation::ForceStop`].
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(250),
            escalation: LandingEscalation::ForceStop,
        }
    }
}
