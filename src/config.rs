//! # Global orchestrator configuration.
//!
//! Provides [`Config`], centralized settings for a whole run.
//!
//! ## Sentinel values
//! - `check_timeout = 0s` → launch/landing checks are unbounded
//! - `start_timeout = 0s` → `start()` is unbounded
//! - `stop_timeout = 0s` → worker joins are unbounded (not recommended)
//!
//! Prefer the `*_bound()` accessors over testing the sentinels inline.

use std::time::Duration;

use crate::policies::{LandingPolicy, RepeatSignalPolicy};

/// Global configuration for the orchestrator.
///
/// Defines:
/// - **Bounds**: how long each lifecycle callback may block
/// - **Landing behavior**: retry/escalation policy for landing checks
/// - **Signal behavior**: what a repeated interrupt does mid-shutdown
/// - **Event system**: bus capacity for event delivery
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items. Minimum value is 1
    /// (clamped by the bus).
    pub bus_capacity: usize,

    /// Upper bound on a single `launch_check` / `land_check` call.
    ///
    /// Checks are specified side-effect free and must never block
    /// indefinitely; a check that exceeds this bound is treated as `NoGo`.
    /// `Duration::ZERO` = unbounded.
    pub check_timeout: Duration,

    /// Upper bound on a single `start()` call.
    ///
    /// `start` may block until the subsystem's own service loop is ready,
    /// but not past this bound; exceeding it is a `StartFailed`.
    /// `Duration::ZERO` = unbounded.
    pub start_timeout: Duration,

    /// Upper bound applied separately to a subsystem's `stop()` call and to
    /// its worker join (a subsystem may consume up to twice this value).
    ///
    /// A `stop()` past the bound records `StopFailed`; a join past it records
    /// `ShutdownTimeout`. The shutdown sweep continues regardless.
    /// `Duration::ZERO` = unbounded.
    pub stop_timeout: Duration,

    /// Retry/escalation policy for landing checks.
    pub landing: LandingPolicy,

    /// What a second shutdown trigger does while the sweep is in progress.
    pub on_repeat_signal: RepeatSignalPolicy,
}

impl Config {
    /// Returns the check bound as an `Option` (`None` = unbounded).
    #[inline]
    pub fn check_bound(&self) -> Option<Duration> {
        non_zero(self.check_timeout)
    }

    /// Returns the start bound as an `Option` (`None` = unbounded).
    #[inline]
    pub fn start_bound(&self) -> Option<Duration> {
        non_zero(self.start_timeout)
    }

    /// Returns the stop bound as an `Option` (`None` = unbounded).
    #[inline]
    pub fn stop_bound(&self) -> Option<Duration> {
        non_zero(self.stop_timeout)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

#[inline]
fn non_zero(d: Duration) -> Option<Duration> {
    if d == Duration::ZERO { None } else { Some(d) }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    /// - `check_timeout = 5s` (checks are supposed to be cheap)
    /// - `start_timeout = 30s` (service loops can be slow to come up)
    /// - `stop_timeout = 10s` (bounded join per subsystem)
    /// - `landing = LandingPolicy::default()` (3 attempts, then force-stop)
    /// - `on_repeat_signal = RepeatSignalPolicy::Ignore`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            check_timeout: Duration::from_secs(5),
            start_timeout: Duration::from_secs(30),
            stop_timeout: Duration::from_secs(10),
            landing: LandingPolicy::default(),
            on_repeat_signal: RepeatSignalPolicy::default(),
        }
    }
}
