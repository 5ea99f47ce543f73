//! # Lifecycle events emitted by the orchestrator.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Launch events**: the startup sweep (checks, starts, abort/complete)
//! - **Landing events**: the shutdown sweep (checks, stops, timeouts)
//! - **Run events**: whole-run markers (shutdown requested/complete)
//! - **Subscriber events**: fan-out diagnostics (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! subsystem name, reasons, and attempt counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically per process. Use `seq` to restore the exact order when
//! events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use flightdeck::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::LaunchRejected)
//!     .with_subsystem("database")
//!     .with_reason("config missing");
//!
//! assert_eq!(ev.kind, EventKind::LaunchRejected);
//! assert_eq!(ev.subsystem.as_deref(), Some("database"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Launch events (startup sweep) ===
    /// A subsystem's launch check returned go.
    ///
    /// Sets: `subsystem`, `at`, `seq`.
    LaunchCheckPassed,

    /// A subsystem's launch check returned no-go (or exceeded its bound).
    ///
    /// Sets: `subsystem`, `reason`, `at`, `seq`.
    LaunchRejected,

    /// A subsystem's `start` was invoked.
    ///
    /// Sets: `subsystem`, `at`, `seq`.
    SubsystemStarting,

    /// A subsystem reached `Running`.
    ///
    /// Sets: `subsystem`, `at`, `seq`.
    SubsystemRunning,

    /// A subsystem entered `Failed` (launch guard, check, start, or stop).
    ///
    /// Sets: `subsystem`, `reason`, `at`, `seq`.
    SubsystemFailed,

    /// The startup sweep stopped early (critical failure or shutdown
    /// trigger); remaining subsystems were never started.
    ///
    /// Sets: `reason`, `at`, `seq`.
    StartupAborted,

    /// The startup sweep finished; every critical subsystem is `Running`.
    ///
    /// Sets: `at`, `seq`.
    StartupComplete,

    // === Run events ===
    /// Shutdown was triggered (signal, explicit request, or fatal failure).
    ///
    /// Sets: `reason` (trigger source), `at`, `seq`.
    ShutdownRequested,

    /// The shutdown sweep finished; all records are terminal.
    ///
    /// Sets: `at`, `seq`.
    ShutdownComplete,

    // === Landing events (shutdown sweep) ===
    /// A subsystem's landing check returned go.
    ///
    /// Sets: `subsystem`, `attempt`, `at`, `seq`.
    LandingCheckPassed,

    /// A landing check returned no-go; a retry is scheduled (or attempts ran
    /// out and escalation follows).
    ///
    /// Sets: `subsystem`, `attempt`, `reason`, `delay_ms` (when a retry is
    /// scheduled), `at`, `seq`.
    LandingDeferred,

    /// Landing attempts were exhausted and policy forced the stop anyway.
    ///
    /// Sets: `subsystem`, `reason` (last no-go reason), `at`, `seq`.
    LandingOverridden,

    /// A subsystem's `stop` was invoked.
    ///
    /// Sets: `subsystem`, `at`, `seq`.
    SubsystemStopping,

    /// A subsystem reached `Stopped`.
    ///
    /// Sets: `subsystem`, `at`, `seq`.
    SubsystemStopped,

    /// A subsystem's worker did not finish within the stop bound; the sweep
    /// continued without it.
    ///
    /// Sets: `subsystem`, `timeout_ms`, `at`, `seq`.
    ShutdownTimeout,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subsystem` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subsystem` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the subsystem (or subscriber), if applicable.
    pub subsystem: Option<Arc<str>>,
    /// Human-readable reason (no-go reasons, errors, trigger sources).
    pub reason: Option<Arc<str>>,
    /// Landing-check attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Retry delay before the next landing check, in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Exceeded stop bound in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subsystem: None,
            reason: None,
            attempt: None,
            delay_ms: None,
            timeout_ms: None,
        }
    }

    /// Attaches a subsystem (or subscriber) name.
    #[inline]
    pub fn with_subsystem(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subsystem = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an exceeded bound (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subsystem(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subsystem(subscriber)
            .with_reason(info)
    }
}

#[inline]
fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
