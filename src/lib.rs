//! # flightdeck
//!
//! **Flightdeck** is a subsystem lifecycle orchestration library for Rust.
//!
//! It provides primitives to register the independently startable parts of a
//! server process (network layer, database, web frontend, …), resolve the
//! order their dependencies impose, and drive every one of them through a
//! checked five-phase lifecycle. The crate is the coordination skeleton of a
//! long-running binary; the subsystems themselves stay entirely yours.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Subsystem   │   │  Subsystem   │   │  Subsystem   │
//!     │  ("network") │   │ ("database") │   │   ("web")    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator (one run, no global state)                          │
//! │  - Registry (records: state, dependencies, last_error)            │
//! │  - resolver (start order = topological, stop order = reverse)     │
//! │  - PhaseController (startup sweep / shutdown sweep)               │
//! │  - WorkerPool (adopted background workers, join-with-timeout)     │
//! │  - ShutdownLatch (one-shot; signals, handle, critical failure)    │
//! │  - Bus (broadcast events) ──► SubscriberSet (per-sub queues)      │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! register(...)* ──► run()
//!
//! Startup sweep, in dependency order, one subsystem at a time:
//!   ├─► dependency guard: every dependency must be Running
//!   ├─► launch_check()  ─ go ──► start(ctx) ──► Running (worker adopted)
//!   │        └─ no-go ──► Failed (critical? whole run aborts, teardown runs)
//!   └─► next subsystem
//!
//! Steady state: wait for the shutdown latch
//!   (SIGINT/SIGTERM/SIGQUIT, ShutdownHandle::request, critical failure)
//!
//! Shutdown sweep, in exact reverse start order, error-tolerant:
//!   ├─► land_check() ─ go ──► stop() ──► join worker (bounded) ──► Stopped
//!   │        └─ no-go ──► retry per LandingPolicy
//!   │                └─ exhausted ──► ForceStop (default) or Abandon
//!   └─► next subsystem ──► RunReport
//! ```
//!
//! ## Features
//! | Area               | Description                                                         | Key types / traits                          |
//! |--------------------|---------------------------------------------------------------------|---------------------------------------------|
//! | **Subsystem API**  | Define lifecycle-managed units from types or closures.              | [`Subsystem`], [`SubsystemFn`], [`Gate`]    |
//! | **Orchestration**  | Register, resolve dependencies, run, shut down.                     | [`Orchestrator`], [`ShutdownHandle`]        |
//! | **Policies**       | Landing retries/escalation, repeat-signal behavior.                 | [`LandingPolicy`], [`RepeatSignalPolicy`]   |
//! | **Subscriber API** | Hook into lifecycle events (logging, metrics, custom subscribers).  | [`Subscribe`], [`Event`]                    |
//! | **Errors**         | Typed errors for configuration, subsystems, and whole runs.         | [`RegistryError`], [`RunError`]             |
//! | **Reporting**      | Per-subsystem teardown summary of every run.                        | [`RunReport`], [`StopOutcome`]              |
//! | **Configuration**  | Centralize run settings and bounds.                                 | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use flightdeck::{Config, Gate, Orchestrator, SubsystemFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orch = Orchestrator::builder(Config::default()).build();
//!
//!     orch.register(SubsystemFn::new("network").critical().arc())?;
//!     orch.register(
//!         SubsystemFn::new("web")
//!             .depends_on(["network"])
//!             .on_launch_check(|| async { Gate::Go })
//!             .on_start(|ctx| async move {
//!                 let worker = tokio::spawn(async move {
//!                     // serve until the orchestrator cancels us
//!                     ctx.cancelled().await;
//!                 });
//!                 Ok(Some(worker))
//!             })
//!             .arc(),
//!     )?;
//!
//!     // Shut down from anywhere (an OS signal works too).
//!     let handle = orch.handle();
//!     let orch2 = Arc::clone(&orch);
//!     let run = tokio::spawn(async move { orch2.run().await });
//!     handle.request();
//!
//!     let report = run.await??;
//!     assert!(report.all_clean());
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod report;
mod subscribers;
mod subsystems;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Orchestrator, OrchestratorBuilder, ShutdownHandle, SubsystemState};
pub use error::{RegistryError, RunError, SubsystemError};
pub use events::{Bus, Event, EventKind};
pub use policies::{LandingEscalation, LandingPolicy, RepeatSignalPolicy};
pub use report::{RunReport, StopOutcome};
pub use subscribers::{Subscribe, SubscriberSet};
pub use subsystems::{Gate, Subsystem, SubsystemFn, SubsystemRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
