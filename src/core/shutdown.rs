//! # Shutdown coordination: one-shot latch and OS signal handling.
//!
//! Every shutdown trigger path — OS signal, explicit
//! [`ShutdownHandle::request`](crate::ShutdownHandle::request), critical
//! startup failure — goes through the same [`ShutdownLatch`]. Only the first
//! trigger is honored; the sweep can therefore never run twice or run
//! concurrently with itself.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for hard stop)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use tokio_util::sync::CancellationToken;

/// One-shot latch shared by every shutdown trigger path.
pub(crate) struct ShutdownLatch {
    fired: AtomicBool,
    token: CancellationToken,
    reason: Mutex<Option<&'static str>>,
}

impl ShutdownLatch {
    pub fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            token: CancellationToken::new(),
            reason: Mutex::new(None),
        }
    }

    /// Fires the latch. Returns true for the first caller only.
    pub fn trigger(&self, reason: &'static str) -> bool {
        if self
            .fired
            .compare_exchange(false, true, AtomicOrdering::SeqCst, AtomicOrdering::SeqCst)
            .is_err()
        {
            return false;
        }
        *self.reason.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason);
        self.token.cancel();
        true
    }

    /// True once any trigger has fired.
    pub fn is_triggered(&self) -> bool {
        self.fired.load(AtomicOrdering::SeqCst)
    }

    /// Completes when the latch fires (immediately if it already has).
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }

    /// The first trigger's source, once fired.
    pub fn reason(&self) -> Option<&'static str> {
        *self.reason.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners. Returns `Ok(())` when any
/// signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners. Returns `Ok(())` when any
/// signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_trigger_wins() {
        let latch = ShutdownLatch::new();
        assert!(!latch.is_triggered());
        assert!(latch.trigger("signal"));
        assert!(!latch.trigger("request"));
        assert!(latch.is_triggered());
        assert_eq!(latch.reason(), Some("signal"));
    }

    #[tokio::test]
    async fn test_triggered_completes_after_fire() {
        let latch = ShutdownLatch::new();
        latch.trigger("request");
        // must complete immediately
        latch.triggered().await;
    }
}
