//! # Core: registry, resolver, phase controller, workers, shutdown, orchestrator.
//!
//! ```text
//!   Orchestrator ──► Registry        (records, states)
//!        │     └───► resolver        (start/stop order)
//!        ├─────────► PhaseController (startup / shutdown sweeps)
//!        │               └─► WorkerPool (spawned subsystem workers)
//!        └─────────► ShutdownLatch   (one-shot trigger; signals feed it)
//! ```

mod controller;
mod registry;
mod resolver;
mod shutdown;
mod workers;

pub mod orchestrator;

pub use orchestrator::{Orchestrator, OrchestratorBuilder, ShutdownHandle};
pub use registry::{Registry, SubsystemState};
