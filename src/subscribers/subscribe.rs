//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into
//! the orchestrator. Each subscriber is driven by a dedicated worker loop fed
//! by a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries) – they do **not**
//!   block the sweeps nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** (warn).

use async_trait::async_trait;

use crate::events::Event;

/// Asynchronous handler for lifecycle events.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use flightdeck::{Event, EventKind, Subscribe};
///
/// struct FailureCounter;
///
/// #[async_trait]
/// impl Subscribe for FailureCounter {
///     async fn on_event(&self, ev: &Event) {
///         if ev.kind == EventKind::SubsystemFailed {
///             // increment a metric
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "failure-counter"
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Panics are caught and reported by the set.
    async fn on_event(&self, ev: &Event);

    /// Stable subscriber name, used in overflow/panic diagnostics.
    fn name(&self) -> &'static str {
        "subscriber"
    }

    /// Capacity of this subscriber's event queue (minimum 1).
    fn queue_capacity(&self) -> usize {
        256
    }
}
