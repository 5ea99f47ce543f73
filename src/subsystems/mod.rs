//! Subsystem abstraction and closure-backed implementation.
//!
//! This module defines the capability contract every subsystem presents to
//! the orchestrator — and nothing else. The orchestrator does not know or
//! care what happens inside a subsystem; it only ever calls the four
//! lifecycle operations plus the three identity accessors.
//!
//! ## Contents
//! - [`Gate`] go/no-go answer for the two checks
//! - [`Subsystem`] the capability trait (async, cancelable)
//! - [`SubsystemRef`] shared handle (`Arc<dyn Subsystem>`)
//! - [`SubsystemFn`] closure-backed implementation for tests and demos

mod subsystem;
mod subsystem_fn;

pub use subsystem::{Gate, Subsystem, SubsystemRef};
pub use subsystem_fn::SubsystemFn;
