//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [launch-go] subsystem=network
//! [launch-rejected] subsystem=mdns reason="no multicast route"
//! [starting] subsystem=web
//! [running] subsystem=web
//! [shutdown-requested] reason="signal"
//! [landing-deferred] subsystem=mail attempt=1 reason="queue not drained" retry_in=250ms
//! [landing-overridden] subsystem=mail reason="queue not drained"
//! [stopped] subsystem=web
//! [shutdown-complete]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let name = e.subsystem.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::LaunchCheckPassed => {
                println!("[launch-go] subsystem={name}");
            }
            EventKind::LaunchRejected => {
                println!(
                    "[launch-rejected] subsystem={name} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::SubsystemStarting => {
                println!("[starting] subsystem={name}");
            }
            EventKind::SubsystemRunning => {
                println!("[running] subsystem={name}");
            }
            EventKind::SubsystemFailed => {
                println!(
                    "[failed] subsystem={name} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::StartupAborted => {
                println!(
                    "[startup-aborted] reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::StartupComplete => {
                println!("[startup-complete]");
            }
            EventKind::ShutdownRequested => {
                println!(
                    "[shutdown-requested] reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::ShutdownComplete => {
                println!("[shutdown-complete]");
            }
            EventKind::LandingCheckPassed => {
                println!("[landing-go] subsystem={name}");
            }
            EventKind::LandingDeferred => {
                let attempt = e.attempt.unwrap_or(0);
                match e.delay_ms {
                    Some(ms) => println!(
                        "[landing-deferred] subsystem={name} attempt={attempt} reason={:?} retry_in={ms}ms",
                        e.reason.as_deref().unwrap_or("")
                    ),
                    None => println!(
                        "[landing-deferred] subsystem={name} attempt={attempt} reason={:?}",
                        e.reason.as_deref().unwrap_or("")
                    ),
                }
            }
            EventKind::LandingOverridden => {
                println!(
                    "[landing-overridden] subsystem={name} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::SubsystemStopping => {
                println!("[stopping] subsystem={name}");
            }
            EventKind::SubsystemStopped => {
                println!("[stopped] subsystem={name}");
            }
            EventKind::ShutdownTimeout => {
                println!(
                    "[shutdown-timeout] subsystem={name} timeout={}ms",
                    e.timeout_ms.unwrap_or(0)
                );
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={name} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={name} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
