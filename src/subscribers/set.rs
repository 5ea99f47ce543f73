//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::events::Event) to
//! multiple subscribers **without awaiting** their processing, so a slow
//! subscriber can never stall a sweep.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and reported (isolation): a
//!   [`SubscriberPanicked`](crate::events::EventKind::SubscriberPanicked)
//!   event is published on the bus the set serves.
//! - Dropped events (queue full or worker closed) are reported as
//!   [`SubscriberOverflow`](crate::events::EventKind::SubscriberOverflow).
//!   Drops of the diagnostic events themselves are not re-reported, so a
//!   saturated subscriber cannot start a feedback loop.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers (use `Event::seq`).
//! - No retries on per-subscriber queue overflow (events are dropped for
//!   that subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//!             │ full/closed                   │ panic
//!             ▼                               ▼
//!        Bus ◄── SubscriberOverflow      SubscriberPanicked ──► Bus
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Diagnostics about subscribers are never themselves re-reported.
fn is_diagnostic(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
    )
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// `bus` is where overflow/panic diagnostics for these subscribers are
    /// published.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let s = Arc::clone(&sub);
            let worker_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = panic_message(panic_err.as_ref());
                        eprintln!(
                            "[flightdeck] subscriber '{}' panicked: {info}",
                            s.name()
                        );
                        if !is_diagnostic(ev.kind) {
                            worker_bus.publish(Event::subscriber_panicked(s.name(), info));
                        }
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the event is
    /// dropped for it and a [`EventKind::SubscriberOverflow`] is published
    /// with the subscriber's name.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            let dropped = match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => None,
                Err(mpsc::error::TrySendError::Full(_)) => Some("queue full"),
                Err(mpsc::error::TrySendError::Closed(_)) => Some("worker closed"),
            };
            if let Some(reason) = dropped {
                eprintln!(
                    "[flightdeck] subscriber '{}' dropped event: {reason}",
                    channel.name
                );
                if !is_diagnostic(ev.kind) {
                    self.bus
                        .publish(Event::subscriber_overflow(channel.name, reason));
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    struct Counter(Arc<AtomicU32>);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _ev: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    struct Slow;

    #[async_trait]
    impl Subscribe for Slow {
        async fn on_event(&self, _ev: &Event) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }

        fn name(&self) -> &'static str {
            "slow"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    async fn wait_for_kind(
        rx: &mut tokio::sync::broadcast::Receiver<Event>,
        kind: EventKind,
    ) -> Event {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) => continue,
                Err(e) => panic!("bus closed before {kind:?}: {e}"),
            }
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_all_subscribers() {
        let seen = Arc::new(AtomicU32::new(0));
        let set = SubscriberSet::new(
            vec![
                Arc::new(Counter(seen.clone())) as Arc<dyn Subscribe>,
                Arc::new(Counter(seen.clone())),
            ],
            Bus::new(16),
        );

        set.emit(&Event::new(EventKind::StartupComplete));
        set.shutdown().await;

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_poison_others() {
        let seen = Arc::new(AtomicU32::new(0));
        let set = SubscriberSet::new(
            vec![
                Arc::new(Panicker) as Arc<dyn Subscribe>,
                Arc::new(Counter(seen.clone())),
            ],
            Bus::new(16),
        );

        set.emit(&Event::new(EventKind::ShutdownRequested));
        set.emit(&Event::new(EventKind::ShutdownComplete));
        set.shutdown().await;

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panic_is_published_on_the_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicker) as Arc<dyn Subscribe>], bus);

        set.emit(&Event::new(EventKind::StartupComplete));

        let ev = wait_for_kind(&mut rx, EventKind::SubscriberPanicked).await;
        assert_eq!(ev.subsystem.as_deref(), Some("panicker"));
        assert!(ev.reason.as_deref().unwrap_or("").contains("subscriber bug"));
        set.shutdown().await;
    }

    #[tokio::test]
    async fn test_overflow_is_published_on_the_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Slow) as Arc<dyn Subscribe>], bus);

        // The worker parks on the first event; with a queue of one, further
        // emits must overflow without blocking.
        for _ in 0..4 {
            set.emit(&Event::new(EventKind::StartupComplete));
        }

        let ev = wait_for_kind(&mut rx, EventKind::SubscriberOverflow).await;
        assert_eq!(ev.subsystem.as_deref(), Some("slow"));
        assert_eq!(ev.reason.as_deref(), Some("queue full"));
    }

    #[tokio::test]
    async fn test_dropped_diagnostic_is_not_re_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Slow) as Arc<dyn Subscribe>], bus);

        for _ in 0..4 {
            set.emit(&Event::subscriber_overflow("other", "queue full"));
        }

        // Only non-diagnostic drops may produce overflow events.
        assert!(
            rx.try_recv().is_err(),
            "dropping a diagnostic event must not publish another one"
        );
        assert_eq!(set.len(), 1);
    }
}
