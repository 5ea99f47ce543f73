//! # Subsystem capability trait.
//!
//! A [`Subsystem`] is an independently startable/stoppable unit of a server
//! (web server, database layer, mDNS client, …). It presents exactly four
//! lifecycle operations to the orchestrator:
//!
//! ```text
//! launch_check() → Go | NoGo(reason)    no side effects, repeatable
//! start(ctx)     → Ok(worker?) | Err    may spawn background work
//! land_check()   → Go | NoGo(reason)    no side effects, repeatable
//! stop()         → Ok | Err             safe once start succeeded
//! ```
//!
//! plus identity: `name`, `dependencies`, `is_critical`.
//!
//! The two checks are deliberate two-step gates: only a positive
//! `launch_check` permits the (possibly expensive, side-effecting) `start`,
//! and only a positive `land_check` permits `stop`. Checks must be safely
//! repeatable — the orchestrator may call them any number of times.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SubsystemError;

/// Go/no-go answer for launch and landing checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// The subsystem is ready (to start, or to stop).
    Go,
    /// The subsystem is not ready; the reason is recorded and logged.
    NoGo(String),
}

impl Gate {
    /// Shorthand for `NoGo` with a formatted reason.
    pub fn no_go(reason: impl Into<String>) -> Self {
        Gate::NoGo(reason.into())
    }

    /// True if this is [`Gate::Go`].
    #[inline]
    pub fn is_go(&self) -> bool {
        matches!(self, Gate::Go)
    }
}

/// Shared handle to a subsystem.
pub type SubsystemRef = Arc<dyn Subsystem>;

/// # The contract every subsystem presents to the orchestrator.
///
/// Only [`name`](Subsystem::name) and [`start`](Subsystem::start) are
/// required; the defaults give a dependency-free, non-critical subsystem
/// whose checks always pass and whose stop is a no-op.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio::task::JoinHandle;
/// use tokio_util::sync::CancellationToken;
/// use flightdeck::{Gate, Subsystem, SubsystemError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Subsystem for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn start(
///         &self,
///         ctx: CancellationToken,
///     ) -> Result<Option<JoinHandle<()>>, SubsystemError> {
///         let worker = tokio::spawn(async move {
///             // beat until the orchestrator cancels us
///             ctx.cancelled().await;
///         });
///         Ok(Some(worker))
///     }
/// }
/// ```
#[async_trait]
pub trait Subsystem: Send + Sync + 'static {
    /// Returns the stable, unique subsystem name.
    fn name(&self) -> &str;

    /// Names of subsystems that must be `Running` before this one starts.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// True if this subsystem's startup failure aborts the entire run.
    fn is_critical(&self) -> bool {
        false
    }

    /// Non-destructive readiness evaluation performed before `start`.
    ///
    /// Must be side-effect free and safely repeatable: config present,
    /// prerequisites reachable, resources available. A `NoGo` records the
    /// subsystem as `Failed` without touching any resource.
    async fn launch_check(&self) -> Gate {
        Gate::Go
    }

    /// Starts the subsystem.
    ///
    /// May block until the subsystem's own service loop is ready (the
    /// orchestrator bounds the wait by `Config::start_timeout`). A returned
    /// [`JoinHandle`] is adopted by the worker pool and joined during
    /// shutdown; `ctx` is that worker's cooperative cancellation signal and
    /// is cancelled right before `stop` is invoked.
    async fn start(
        &self,
        ctx: CancellationToken,
    ) -> Result<Option<JoinHandle<()>>, SubsystemError>;

    /// Non-destructive safety evaluation performed before `stop`.
    ///
    /// "Is it safe to stop me now" — queue drained, no in-flight request.
    /// Must not block indefinitely; the orchestrator bounds each call and
    /// retries per its landing policy. A `NoGo` never crashes the run.
    async fn land_check(&self) -> Gate {
        Gate::Go
    }

    /// Stops the subsystem.
    ///
    /// Called only after `start` succeeded (and after the worker token was
    /// cancelled). Errors are recorded and the shutdown sweep continues.
    async fn stop(&self) -> Result<(), SubsystemError> {
        Ok(())
    }
}
